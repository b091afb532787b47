//! # Page Break Decisions
//!
//! How a block of equal-pitch lines falls across pages. The decision is
//! always made against the space left below the cursor *right now*; nothing
//! here assumes where the block starts.

use std::ops::Range;

/// Slack for comparisons between sums of millimetre offsets.
pub const EPSILON: f64 = 1e-9;

/// What to do with a block of lines at the current cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Every line fits on the current page.
    Place,
    /// Not even one line fits; the whole block goes to the next page.
    MoveToNextPage,
    /// Place some lines here, continue on the next page.
    Split { lines_on_current_page: usize },
}

/// How many whole lines of `pitch` fit in `available`.
pub fn lines_that_fit(available: f64, pitch: f64) -> usize {
    if available <= 0.0 {
        return 0;
    }
    ((available + EPSILON) / pitch).floor() as usize
}

/// Decide how `line_count` lines at `pitch` fit into `available` height.
///
/// The boundary is inclusive: a block exactly as tall as the available
/// space is placed without a break.
pub fn decide_break(available: f64, line_count: usize, pitch: f64) -> BreakDecision {
    let estimated = line_count as f64 * pitch;
    if line_count == 0 || estimated <= available + EPSILON {
        return BreakDecision::Place;
    }
    match lines_that_fit(available, pitch) {
        0 => BreakDecision::MoveToNextPage,
        n => BreakDecision::Split {
            lines_on_current_page: n,
        },
    }
}

/// Vertical geometry the note planner works against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteGeometry {
    pub page_height: f64,
    /// Reserved below the note on every page.
    pub bottom_margin: f64,
    pub line_pitch: f64,
    /// y of the first line on a continuation page.
    pub continuation_start: f64,
    /// Added below the last line when computing where the cursor ends.
    pub trailing_gap: f64,
}

impl NoteGeometry {
    pub fn available_from(&self, y: f64) -> f64 {
        self.page_height - y - self.bottom_margin
    }
}

/// A run of consecutive note lines drawn on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteChunk {
    /// Pages after the page the note started on (0 = same page).
    pub page_offset: usize,
    /// Baseline of the first line in this chunk.
    pub start_y: f64,
    /// Indices into the wrapped line sequence.
    pub lines: Range<usize>,
    /// True when the chunk opens a page the note itself started.
    pub fresh_page: bool,
}

/// Where every wrapped note line goes, and where the cursor ends up.
#[derive(Debug, Clone, PartialEq)]
pub struct NotePlan {
    pub chunks: Vec<NoteChunk>,
    /// Cursor y after the note (last line + trailing gap) on the last page.
    pub end_y: f64,
    /// Number of pages the note starts beyond its first one.
    pub pages_added: usize,
}

/// Lay `line_count` lines out from `start_y`, splitting onto as many
/// continuation pages as needed.
///
/// Every index in `0..line_count` appears in exactly one chunk, in order.
/// `starts_fresh` marks the first page as one the note opened itself (so
/// its chunk carries a label above the lines).
pub fn plan_note(
    line_count: usize,
    start_y: f64,
    geometry: &NoteGeometry,
    starts_fresh: bool,
) -> NotePlan {
    let pitch = geometry.line_pitch;
    let mut chunks = Vec::new();
    if line_count == 0 {
        return NotePlan {
            chunks,
            end_y: start_y,
            pages_added: 0,
        };
    }

    let mut next = 0;
    let mut y = start_y;
    let mut page_offset = 0;
    let mut fresh = starts_fresh;

    loop {
        let remaining = line_count - next;
        let decision = decide_break(geometry.available_from(y), remaining, pitch);
        let take = match decision {
            BreakDecision::Place => remaining,
            BreakDecision::Split {
                lines_on_current_page,
            } => lines_on_current_page,
            // A fresh page that cannot hold a single line still takes one,
            // so the loop always terminates.
            BreakDecision::MoveToNextPage if fresh => 1,
            BreakDecision::MoveToNextPage => 0,
        };

        if take > 0 {
            chunks.push(NoteChunk {
                page_offset,
                start_y: y,
                lines: next..next + take,
                fresh_page: fresh,
            });
            next += take;
        }

        if next == line_count {
            return NotePlan {
                chunks,
                end_y: y + take as f64 * pitch + geometry.trailing_gap,
                pages_added: page_offset,
            };
        }

        page_offset += 1;
        y = geometry.continuation_start;
        fresh = true;
    }
}
