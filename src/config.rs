//! # Layout Configuration
//!
//! Page geometry and the note placement policy. Every field has a default
//! that reproduces the stock A4 invoice, so a config file only needs to name
//! what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// Physical page size. All lengths in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// (width, height) in millimetres.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Where the note goes relative to the totals block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum NotePosition {
    #[default]
    BeforeTotals,
    AfterTotals,
}

/// When the note starts a new page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum NoteBreak {
    /// Stay on the current page and split only when the note overflows.
    #[default]
    OnOverflow,
    /// A non-empty note always begins on a fresh page.
    AlwaysNewPage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotePolicy {
    pub position: NotePosition,
    pub page_break: NoteBreak,
}

/// Geometry of the note block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteConfig {
    pub policy: NotePolicy,
    /// Space kept free below the note on every page (totals + footer).
    pub bottom_margin: f64,
    pub line_pitch: f64,
    pub max_width: f64,
    /// x of the wrapped note lines; the label sits at the left margin.
    pub indent: f64,
    /// Gap between the last note line and whatever follows.
    pub trailing_gap: f64,
    pub font_size: f64,
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            policy: NotePolicy::default(),
            bottom_margin: 50.0,
            line_pitch: 5.0,
            max_width: 150.0,
            indent: 25.0,
            trailing_gap: 10.0,
            font_size: 10.0,
        }
    }
}

/// Everything the layout engine needs besides the document itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub page_size: PageSize,
    pub margin_left: f64,
    /// Distance from the right page edge to right-aligned header text and
    /// totals values.
    pub margin_right: f64,
    /// Where content resumes on pages the engine starts itself.
    pub margin_top: f64,
    pub table_start_y: f64,
    /// Gap between the end of the table and the "Next Service Date" line.
    pub table_gap: f64,
    /// Gap between the "Next Service Date" line and the note.
    pub note_gap: f64,
    pub note: NoteConfig,
    pub totals_pitch: f64,
    /// Right edge of the totals labels.
    pub totals_label_x: f64,
    /// The TOTAL line never sits lower than `page height - footer_clearance`.
    pub footer_clearance: f64,
    pub footer_text: String,
    /// Footer baseline distance from the bottom page edge.
    pub footer_offset: f64,
    pub footer_font_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin_left: 10.0,
            margin_right: 20.0,
            margin_top: 20.0,
            table_start_y: 120.0,
            table_gap: 10.0,
            note_gap: 7.0,
            note: NoteConfig::default(),
            totals_pitch: 5.0,
            totals_label_x: 150.0,
            footer_clearance: 20.0,
            footer_text: "Thank you for your business!".to_string(),
            footer_offset: 17.0,
            footer_font_size: 8.0,
        }
    }
}

impl LayoutConfig {
    /// Read a config from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, FolioError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(json: &str) -> Result<Self, FolioError> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject geometry the pagination loop cannot make progress with.
    pub fn validate(&self) -> Result<(), FolioError> {
        let (width, height) = self.page_size.dimensions();
        if !(width > 0.0 && height > 0.0) {
            return Err(FolioError::Config(format!(
                "page size must be positive, got {}x{}",
                width, height
            )));
        }
        if !(self.note.line_pitch > 0.0) || !(self.totals_pitch > 0.0) {
            return Err(FolioError::Config("line pitch must be positive".to_string()));
        }
        if !(self.note.max_width > 0.0) {
            return Err(FolioError::Config("note width must be positive".to_string()));
        }
        if self.note.bottom_margin < self.footer_offset {
            return Err(FolioError::Config(format!(
                "note bottom margin {:.1}mm must clear the footer offset {:.1}mm",
                self.note.bottom_margin, self.footer_offset
            )));
        }
        let continuation_room = self.continuation_available();
        if continuation_room < self.note.line_pitch {
            return Err(FolioError::Config(format!(
                "a continuation page leaves {:.1}mm for the note, less than one line",
                continuation_room
            )));
        }
        Ok(())
    }

    pub fn page_width(&self) -> f64 {
        self.page_size.dimensions().0
    }

    pub fn page_height(&self) -> f64 {
        self.page_size.dimensions().1
    }

    /// x of right-aligned header text and totals values.
    pub fn right_edge(&self) -> f64 {
        self.page_width() - self.margin_right
    }

    /// First note-line y on a continuation page (one pitch below the label).
    pub fn continuation_start(&self) -> f64 {
        self.margin_top + self.note.line_pitch
    }

    /// Note space on a fresh continuation page.
    pub fn continuation_available(&self) -> f64 {
        self.page_height() - self.continuation_start() - self.note.bottom_margin
    }
}
