//! # Folio
//!
//! A paginated tax-invoice PDF layout engine.
//!
//! An invoice is a fixed header, a line-item table of any length, a
//! free-text note of any length and a totals block. Folio lays them out
//! top to bottom on fixed A4 pages and makes every placement decision
//! against the space left on the current page: the table repeats its
//! header when it breaks, the note splits across as many continuation
//! pages as it needs, and the totals block never straddles a page.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON)
//!       ↓
//!   [model]     Invoice snapshot: items, parties, totals, note
//!       ↓
//!   [layout]    Phase machine: header → table → note → totals → footer
//!       ↓
//!   [surface]   DrawingSurface trait (mm, y grows downward)
//!       ↓
//!   [canvas]    Positioned elements per page
//!       ↓
//!   [pdf]       Serialize to PDF bytes
//! ```

pub mod canvas;
pub mod config;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod surface;
pub mod text;
pub mod totals;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::path::Path;

use canvas::PdfCanvas;
use config::LayoutConfig;
use error::FolioError;
use image_loader::{load_image, LoadedImage};
use layout::{LayoutEngine, LayoutReport};
use model::InvoiceDocument;
use pdf::Metadata;

/// What a successful export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub file_name: String,
    pub page_count: usize,
    /// Pages the note was drawn on (0 for an empty note).
    pub note_pages: usize,
}

impl ExportReport {
    fn new(doc: &InvoiceDocument, report: &LayoutReport) -> Self {
        Self {
            file_name: doc.file_name(),
            page_count: report.page_count,
            note_pages: report.note_pages,
        }
    }
}

/// Parse an invoice document from JSON.
pub fn parse_document(json: &str) -> Result<InvoiceDocument, FolioError> {
    Ok(serde_json::from_str(json)?)
}

/// Lay out `doc` and write `Invoice-<number>.pdf` into `output_dir`.
///
/// `logo_src` is a file path, a data URI or raw base64. Nothing is written
/// unless the whole document renders.
pub fn export_invoice(
    doc: &InvoiceDocument,
    logo_src: Option<&str>,
    config: &LayoutConfig,
    output_dir: &Path,
) -> Result<ExportReport, FolioError> {
    let logo = logo_src.map(load_image).transpose()?;
    let mut canvas = canvas_for(doc, config).with_output_dir(output_dir);
    let report = LayoutEngine::new(config.clone()).export(&mut canvas, doc, logo.as_ref())?;
    Ok(ExportReport::new(doc, &report))
}

/// Render `doc` to PDF bytes without touching the filesystem.
pub fn render_invoice_pdf(
    doc: &InvoiceDocument,
    logo: Option<&LoadedImage>,
    config: &LayoutConfig,
) -> Result<Vec<u8>, FolioError> {
    let mut canvas = canvas_for(doc, config);
    LayoutEngine::new(config.clone()).export(&mut canvas, doc, logo)?;
    canvas
        .into_bytes()
        .ok_or_else(|| FolioError::Render("document was never saved".to_string()))
}

fn canvas_for(doc: &InvoiceDocument, config: &LayoutConfig) -> PdfCanvas {
    let author = Some(doc.company_info.name.clone()).filter(|name| !name.is_empty());
    PdfCanvas::from_config(config).with_metadata(Metadata {
        title: Some(format!("Tax Invoice {}", doc.invoice_info.number)),
        author,
        subject: None,
    })
}
