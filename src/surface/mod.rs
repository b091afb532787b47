//! # Drawing Surface
//!
//! The capability interface the layout engine draws through. A surface is a
//! stateful stack of fixed-size pages with a "current page"; every call
//! draws on the current page. Coordinates are millimetres from the top-left
//! corner, text `y` is the baseline.
//!
//! Two implementations ship with the crate: [`crate::canvas::PdfCanvas`]
//! produces the real document, [`recording::RecordingSurface`] records the
//! calls so layout decisions can be asserted without rendering anything.

pub mod recording;

use crate::error::FolioError;
use crate::image_loader::LoadedImage;

/// Millimetres per PDF point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;
/// PDF points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Horizontal anchoring of a text run relative to its `x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }
}

/// Font and alignment for a single text placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    pub align: Align,
    pub font_style: FontStyle,
    /// Size in points.
    pub font_size: f64,
}

impl TextOptions {
    pub fn new(font_size: f64) -> Self {
        Self {
            align: Align::Left,
            font_style: FontStyle::Normal,
            font_size,
        }
    }

    pub fn style(mut self, font_style: FontStyle) -> Self {
        self.font_style = font_style;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// A ruled table: one header row and any number of body rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
}

/// Visual style and page margins for [`DrawingSurface::place_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    /// Body and header font size in points.
    pub font_size: f64,
    pub header_fill: Color,
    pub header_text: Color,
    pub header_font_style: FontStyle,
    pub grid_color: Color,
    /// Grid stroke width in millimetres.
    pub grid_width: f64,
    pub cell_padding: f64,
    /// Relative column widths; normalized against their sum.
    pub column_weights: Vec<f64>,
    pub column_align: Vec<Align>,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Where rows resume after the table breaks onto a new page.
    pub margin_top: f64,
    /// Rows never extend below `page_height - margin_bottom`.
    pub margin_bottom: f64,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size: 9.0,
            header_fill: Color::rgb8(245, 166, 35),
            header_text: Color::BLACK,
            header_font_style: FontStyle::Bold,
            grid_color: Color::rgb8(200, 200, 200),
            grid_width: 0.1,
            cell_padding: 1.76,
            column_weights: Vec::new(),
            column_align: Vec::new(),
            margin_left: 14.0,
            margin_right: 14.0,
            margin_top: 20.0,
            margin_bottom: 14.0,
        }
    }
}

/// A fixed-size, multi-page canvas the layout engine draws onto.
pub trait DrawingSurface {
    /// Width of every page in millimetres.
    fn page_width(&self) -> f64;

    /// Height of every page in millimetres.
    fn page_height(&self) -> f64;

    /// Zero-based index of the page currently being drawn on.
    fn current_page(&self) -> usize;

    /// Number of pages started so far (at least one).
    fn page_count(&self) -> usize {
        self.current_page() + 1
    }

    /// Draw a single line of text with its baseline at `y`.
    fn place_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        options: &TextOptions,
    ) -> Result<(), FolioError>;

    /// Draw an image stretched into the given box.
    fn place_image(
        &mut self,
        image: &LoadedImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), FolioError>;

    /// Draw a ruled table starting at `start_y`, breaking onto new pages as
    /// needed. Returns the y just below the last row, on the page the table
    /// finished on.
    fn place_table(
        &mut self,
        table: &Table,
        start_y: f64,
        style: &TableStyle,
    ) -> Result<f64, FolioError>;

    /// Append a page and make it current.
    fn start_new_page(&mut self) -> Result<(), FolioError>;

    /// Wrap `text` into lines no wider than `max_width` in the given style.
    fn wrap_text(&self, text: &str, max_width: f64, options: &TextOptions) -> Vec<String> {
        crate::text::wrap(text, max_width, options)
    }

    /// Finish the document and persist it under `file_name`.
    fn save(&mut self, file_name: &str) -> Result<(), FolioError>;
}
