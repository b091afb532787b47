//! # Paginated Invoice Layout
//!
//! The engine drives a [`DrawingSurface`] through one export:
//!
//! ```text
//! Header -> Table -> Note { fits | overflows -> NoteContinuation } -> Totals -> Footer -> Done
//! ```
//!
//! (with the note placed after the totals instead when the policy says so).
//!
//! The rule everything here follows: a block's vertical position is the sum
//! of the heights of everything already placed, recomputed from the cursor
//! at the moment the block is reached. The table can end anywhere, the note
//! can be any length, the rounding row may or may not exist, so no y below
//! the header is ever a constant.
//!
//! State lives in an explicit [`PageCursor`] threaded through each
//! placement; nothing is shared between exports.

pub mod blocks;
pub mod page_break;

use log::{debug, info};

use crate::config::{LayoutConfig, NoteBreak, NotePosition};
use crate::error::FolioError;
use crate::image_loader::LoadedImage;
use crate::model::InvoiceDocument;
use crate::surface::{Align, DrawingSurface, FontStyle, TextOptions};
use page_break::{plan_note, NoteGeometry, EPSILON};

/// Where the next block goes: a page index and a y on that page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    pub page: usize,
    pub y: f64,
}

impl PageCursor {
    pub fn at(page: usize, y: f64) -> Self {
        Self { page, y }
    }

    pub fn advance(&mut self, dy: f64) {
        self.y += dy;
    }

    /// Start a new page on `surface` and move to `top` on it.
    pub fn break_page<S: DrawingSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        top: f64,
    ) -> Result<(), FolioError> {
        surface.start_new_page()?;
        self.page = surface.current_page();
        self.y = top;
        Ok(())
    }
}

/// Stage of an export. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Header,
    Table,
    Note,
    NoteContinuation,
    Totals,
    Footer,
    Done,
}

impl Phase {
    fn can_enter(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Header, Table)
                | (Table, Note)
                | (Table, Totals)
                | (Note, NoteContinuation)
                | (Note, Totals)
                | (Note, Footer)
                | (NoteContinuation, Totals)
                | (NoteContinuation, Footer)
                | (Totals, Note)
                | (Totals, Footer)
                | (Footer, Done)
        )
    }
}

/// What the engine did, for callers and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutReport {
    /// Every phase entered, in order.
    pub phases: Vec<Phase>,
    pub page_count: usize,
    /// Wrapped note lines drawn (0 when the note was empty).
    pub note_lines: usize,
    /// Distinct pages the note was drawn on.
    pub note_pages: usize,
    pub totals_page: usize,
    /// Baseline of the TOTAL row.
    pub total_line_y: f64,
    pub footer_page: usize,
}

/// Per-export bookkeeping: the phase trace.
struct Run {
    phases: Vec<Phase>,
}

impl Run {
    fn new() -> Self {
        Self {
            phases: vec![Phase::Header],
        }
    }

    fn enter(&mut self, next: Phase) -> Result<(), FolioError> {
        let current = *self.phases.last().unwrap_or(&Phase::Header);
        if !current.can_enter(next) {
            return Err(FolioError::Render(format!(
                "layout cannot move from {:?} to {:?}",
                current, next
            )));
        }
        self.phases.push(next);
        Ok(())
    }
}

struct NoteOutcome {
    lines: usize,
    pages: usize,
}

pub struct LayoutEngine {
    config: LayoutConfig,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Lay the invoice out and save it as `Invoice-<number>.pdf`.
    pub fn export<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        doc: &InvoiceDocument,
        logo: Option<&LoadedImage>,
    ) -> Result<LayoutReport, FolioError> {
        let report = self.layout(surface, doc, logo)?;
        let file_name = doc.file_name();
        surface.save(&file_name)?;
        info!(
            "exported {} ({} page(s), note on {} page(s))",
            file_name, report.page_count, report.note_pages
        );
        Ok(report)
    }

    /// Draw the whole invoice onto `surface` without saving it.
    pub fn layout<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        doc: &InvoiceDocument,
        logo: Option<&LoadedImage>,
    ) -> Result<LayoutReport, FolioError> {
        let config = &self.config;
        config.validate()?;
        let mut run = Run::new();

        blocks::place_header(surface, doc, logo, config)?;

        run.enter(Phase::Table)?;
        let table = blocks::line_item_table(&doc.items);
        let style = blocks::line_item_table_style(config);
        let table_end = surface.place_table(&table, config.table_start_y, &style)?;
        let mut cursor = PageCursor::at(surface.current_page(), table_end + config.table_gap);
        debug!(
            "table of {} row(s) ended on page {} at y={:.2}",
            doc.items.len(),
            cursor.page,
            table_end
        );

        // The service line and the note label must start above the note's
        // reserved bottom margin.
        if cursor.y > surface.page_height() - config.note.bottom_margin + EPSILON {
            debug!("no room below the table on page {}, breaking", cursor.page);
            cursor.break_page(surface, config.margin_top)?;
        }

        let normal = TextOptions::new(10.0);
        surface.place_text(
            &format!("Next Service Date: {}", doc.invoice_info.next_service_date),
            config.margin_left,
            cursor.y,
            &normal,
        )?;
        cursor.advance(config.note_gap);

        let note_options = self.note_options();
        let lines = surface.wrap_text(&doc.sale_note, config.note.max_width, &note_options);

        let (note, total_line_y, totals_page) = match config.note.policy.position {
            NotePosition::BeforeTotals => {
                run.enter(Phase::Note)?;
                let note = self.place_note(surface, &mut cursor, &lines, &mut run)?;
                run.enter(Phase::Totals)?;
                let total_y = self.place_totals(surface, &mut cursor, doc)?;
                (note, total_y, cursor.page)
            }
            NotePosition::AfterTotals => {
                run.enter(Phase::Totals)?;
                let total_y = self.place_totals(surface, &mut cursor, doc)?;
                let totals_page = cursor.page;
                cursor.y = total_y + config.note.trailing_gap;
                run.enter(Phase::Note)?;
                let note = self.place_note(surface, &mut cursor, &lines, &mut run)?;
                (note, total_y, totals_page)
            }
        };

        run.enter(Phase::Footer)?;
        let footer_page = self.place_footer(surface)?;
        run.enter(Phase::Done)?;

        Ok(LayoutReport {
            phases: run.phases,
            page_count: surface.page_count(),
            note_lines: note.lines,
            note_pages: note.pages,
            totals_page,
            total_line_y,
            footer_page,
        })
    }

    fn note_options(&self) -> TextOptions {
        TextOptions::new(self.config.note.font_size).style(FontStyle::Italic)
    }

    fn note_geometry(&self, page_height: f64) -> NoteGeometry {
        let note = &self.config.note;
        NoteGeometry {
            page_height,
            bottom_margin: note.bottom_margin,
            line_pitch: note.line_pitch,
            continuation_start: self.config.continuation_start(),
            trailing_gap: note.trailing_gap,
        }
    }

    /// Draw the wrapped note from the cursor, splitting across pages.
    ///
    /// On the page the note starts on, the "Note:" label shares the first
    /// line's baseline. On every page the note opens itself, the label sits
    /// at the top margin and the lines start one pitch below it.
    fn place_note<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        cursor: &mut PageCursor,
        lines: &[String],
        run: &mut Run,
    ) -> Result<NoteOutcome, FolioError> {
        let config = &self.config;
        if lines.is_empty() {
            debug!("note is empty, skipping block");
            return Ok(NoteOutcome { lines: 0, pages: 0 });
        }

        let starts_fresh = config.note.policy.page_break == NoteBreak::AlwaysNewPage;
        if starts_fresh {
            cursor.break_page(surface, config.continuation_start())?;
        }

        let geometry = self.note_geometry(surface.page_height());
        let available = geometry.available_from(cursor.y);
        let plan = plan_note(lines.len(), cursor.y, &geometry, starts_fresh);
        debug!(
            "note: {} line(s), {:.2}mm available from y={:.2}, {} chunk(s) over {} extra page(s)",
            lines.len(),
            available,
            cursor.y,
            plan.chunks.len(),
            plan.pages_added
        );

        let options = self.note_options();
        let pitch = config.note.line_pitch;
        let mut offset = 0;
        let mut labelled = false;
        let mut continued = false;

        for chunk in &plan.chunks {
            while offset < chunk.page_offset {
                cursor.break_page(surface, geometry.continuation_start)?;
                offset += 1;
            }
            // A note moved whole to a fresh page has not continued anywhere.
            if labelled && !continued {
                run.enter(Phase::NoteContinuation)?;
                continued = true;
            }

            let label = if labelled { "Note (continued):" } else { "Note:" };
            labelled = true;
            let label_y = if chunk.fresh_page {
                config.margin_top
            } else {
                chunk.start_y
            };
            surface.place_text(label, config.margin_left, label_y, &options)?;

            for (i, idx) in chunk.lines.clone().enumerate() {
                let y = chunk.start_y + pitch * i as f64;
                surface.place_text(&lines[idx], config.note.indent, y, &options)?;
            }
        }

        cursor.y = plan.end_y;
        Ok(NoteOutcome {
            lines: lines.len(),
            pages: plan.chunks.len(),
        })
    }

    /// Draw the totals block at the cursor, moving it whole to a new page
    /// when the TOTAL row would crowd the footer. Returns TOTAL's baseline.
    fn place_totals<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        cursor: &mut PageCursor,
        doc: &InvoiceDocument,
    ) -> Result<f64, FolioError> {
        let config = &self.config;
        let rows = blocks::totals_rows(&doc.calculation);
        let block_height = config.totals_pitch * (rows.len() - 1) as f64;
        let limit = surface.page_height() - config.footer_clearance;

        if cursor.y + block_height > limit + EPSILON {
            debug!(
                "totals need {:.2}mm from y={:.2}, past {:.2}; moving to a new page",
                block_height, cursor.y, limit
            );
            cursor.break_page(surface, config.margin_top)?;
        }

        let total_y = blocks::place_totals(surface, &rows, cursor.y, config)?;
        cursor.y = total_y + config.totals_pitch;
        Ok(total_y)
    }

    /// Centre the footer near the bottom of whichever page is last now.
    fn place_footer<S: DrawingSurface + ?Sized>(&self, surface: &mut S) -> Result<usize, FolioError> {
        let config = &self.config;
        let options = TextOptions::new(config.footer_font_size).align(Align::Center);
        let x = surface.page_width() / 2.0;
        let y = surface.page_height() - config.footer_offset;
        surface.place_text(&config.footer_text, x, y, &options)?;
        Ok(surface.current_page())
    }
}
