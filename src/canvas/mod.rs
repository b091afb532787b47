//! # PDF Canvas
//!
//! The production [`DrawingSurface`]. Every call becomes a positioned
//! [`LayoutElement`] on the current [`LayoutPage`]; nothing is serialized
//! until [`DrawingSurface::save`], which hands the pages to the
//! [`PdfWriter`](crate::pdf::PdfWriter).
//!
//! The surface speaks millimetres from the top-left corner. Elements are
//! stored in PDF points (still top-down); the writer flips the y axis.

mod table;

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::LayoutConfig;
use crate::error::FolioError;
use crate::font::{self, StandardFont};
use crate::image_loader::LoadedImage;
use crate::pdf::{Metadata, PdfWriter};
use crate::surface::{
    Align, Color, DrawingSurface, Table, TableStyle, TextOptions, MM_PER_PT, PT_PER_MM,
};

/// A single page after layout, in points.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

/// A positioned element. `x`/`y` are the top-left corner for boxes and the
/// baseline origin for text.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    Rect {
        background: Option<Color>,
        border: Option<(Color, f64)>,
    },
    Text {
        text: String,
        font: StandardFont,
        font_size: f64,
        color: Color,
    },
    Image {
        image_data: LoadedImage,
    },
}

pub struct PdfCanvas {
    /// Page size in millimetres.
    width: f64,
    height: f64,
    pages: Vec<LayoutPage>,
    metadata: Metadata,
    output_dir: Option<PathBuf>,
    bytes: Option<Vec<u8>>,
}

impl PdfCanvas {
    /// A canvas with one empty page of the given size (millimetres).
    pub fn new(width: f64, height: f64) -> Self {
        let mut canvas = Self {
            width,
            height,
            pages: Vec::new(),
            metadata: Metadata::default(),
            output_dir: None,
            bytes: None,
        };
        canvas.push_page();
        canvas
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        let (width, height) = config.page_size.dimensions();
        Self::new(width, height)
    }

    /// Write saved documents into `dir`. Without one, `save` only keeps
    /// the bytes in memory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn pages(&self) -> &[LayoutPage] {
        &self.pages
    }

    /// The serialized document, once `save` has run.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        self.bytes
    }

    fn push_page(&mut self) {
        self.pages.push(LayoutPage {
            width: self.width * PT_PER_MM,
            height: self.height * PT_PER_MM,
            elements: Vec::new(),
        });
    }

    fn push(&mut self, element: LayoutElement) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    /// Place one line of text in the given colour. Coordinates in mm.
    pub(crate) fn push_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        options: &TextOptions,
        color: Color,
    ) -> Result<(), FolioError> {
        ensure_finite(&[x, y, options.font_size])?;
        let width = font::measure(text, options.font_style, options.font_size) * MM_PER_PT;
        let left = match options.align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        self.push(LayoutElement {
            x: left * PT_PER_MM,
            y: y * PT_PER_MM,
            width: width * PT_PER_MM,
            height: options.font_size,
            draw: DrawCommand::Text {
                text: text.to_string(),
                font: StandardFont::for_style(options.font_style),
                font_size: options.font_size,
                color,
            },
        });
        Ok(())
    }

    /// Place a filled and/or stroked rectangle. Coordinates in mm, border
    /// width in mm.
    pub(crate) fn push_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        background: Option<Color>,
        border: Option<(Color, f64)>,
    ) -> Result<(), FolioError> {
        ensure_finite(&[x, y, width, height])?;
        self.push(LayoutElement {
            x: x * PT_PER_MM,
            y: y * PT_PER_MM,
            width: width * PT_PER_MM,
            height: height * PT_PER_MM,
            draw: DrawCommand::Rect {
                background,
                border: border.map(|(color, w)| (color, w * PT_PER_MM)),
            },
        });
        Ok(())
    }

    fn write_atomically(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, FolioError> {
        let target = dir.join(file_name);
        let partial = dir.join(format!(".{}.partial", file_name));
        if let Err(e) = fs::write(&partial, bytes).and_then(|_| fs::rename(&partial, &target)) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }
        Ok(target)
    }
}

fn ensure_finite(values: &[f64]) -> Result<(), FolioError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(FolioError::Render(format!("non-finite coordinate in {:?}", values)))
    }
}

impl DrawingSurface for PdfCanvas {
    fn page_width(&self) -> f64 {
        self.width
    }

    fn page_height(&self) -> f64 {
        self.height
    }

    fn current_page(&self) -> usize {
        self.pages.len() - 1
    }

    fn place_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        options: &TextOptions,
    ) -> Result<(), FolioError> {
        self.push_text(text, x, y, options, Color::BLACK)
    }

    fn place_image(
        &mut self,
        image: &LoadedImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), FolioError> {
        ensure_finite(&[x, y, width, height])?;
        if image.width_px == 0 || image.height_px == 0 {
            return Err(FolioError::Image("image has no pixels".to_string()));
        }
        self.push(LayoutElement {
            x: x * PT_PER_MM,
            y: y * PT_PER_MM,
            width: width * PT_PER_MM,
            height: height * PT_PER_MM,
            draw: DrawCommand::Image {
                image_data: image.clone(),
            },
        });
        Ok(())
    }

    fn place_table(
        &mut self,
        table: &Table,
        start_y: f64,
        style: &TableStyle,
    ) -> Result<f64, FolioError> {
        table::render(self, table, start_y, style)
    }

    fn start_new_page(&mut self) -> Result<(), FolioError> {
        self.push_page();
        debug!("canvas: started page {}", self.pages.len());
        Ok(())
    }

    fn save(&mut self, file_name: &str) -> Result<(), FolioError> {
        let bytes = PdfWriter::new().write(&self.pages, &self.metadata)?;
        if let Some(dir) = &self.output_dir {
            let path = Self::write_atomically(dir, file_name, &bytes)?;
            debug!("canvas: wrote {} bytes to {}", bytes.len(), path.display());
        }
        self.bytes = Some(bytes);
        Ok(())
    }
}
