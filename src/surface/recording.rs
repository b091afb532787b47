//! A drawing surface that renders nothing and remembers everything.
//!
//! Used by the test suites to assert layout decisions (which line landed on
//! which page, at which y) without parsing PDF output.

use super::{DrawingSurface, Table, TableStyle, TextOptions};
use crate::error::FolioError;
use crate::image_loader::LoadedImage;

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Text {
        page: usize,
        text: String,
        x: f64,
        y: f64,
        options: TextOptions,
    },
    Image {
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Table {
        page: usize,
        start_y: f64,
        rows: usize,
        end_page: usize,
        end_y: f64,
    },
    NewPage {
        page: usize,
    },
    Save {
        file_name: String,
    },
}

/// Which call should fail, for exercising error propagation.
#[derive(Debug, Clone, PartialEq)]
pub enum FailPoint {
    Image,
    Table,
    Save,
    /// Fail when placing text that contains this needle.
    Text(String),
}

/// Records every call; the table is modelled as fixed-height rows.
pub struct RecordingSurface {
    width: f64,
    height: f64,
    page: usize,
    calls: Vec<DrawCall>,
    /// Height of every table row (header included), in millimetres.
    pub row_height: f64,
    /// When set, text is wrapped as if every character were this wide.
    pub char_width: Option<f64>,
    fail_at: Option<FailPoint>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            page: 0,
            calls: Vec::new(),
            row_height: 8.0,
            char_width: None,
            fail_at: None,
        }
    }

    /// An A4 surface (210 × 297 mm).
    pub fn a4() -> Self {
        Self::new(210.0, 297.0)
    }

    pub fn with_char_width(mut self, width: f64) -> Self {
        self.char_width = Some(width);
        self
    }

    pub fn with_row_height(mut self, height: f64) -> Self {
        self.row_height = height;
        self
    }

    pub fn failing_at(mut self, point: FailPoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Every text call as `(page, text, x, y)`, in draw order.
    pub fn texts(&self) -> Vec<(usize, &str, f64, f64)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { page, text, x, y, .. } => Some((*page, text.as_str(), *x, *y)),
                _ => None,
            })
            .collect()
    }

    /// The first text call whose content starts with `prefix`.
    pub fn find_text(&self, prefix: &str) -> Option<(usize, &str, f64, f64)> {
        self.texts().into_iter().find(|(_, t, _, _)| t.starts_with(prefix))
    }

    /// The options of the first text call whose content starts with `prefix`.
    pub fn options_of(&self, prefix: &str) -> Option<TextOptions> {
        self.calls.iter().find_map(|c| match c {
            DrawCall::Text { text, options, .. } if text.starts_with(prefix) => Some(*options),
            _ => None,
        })
    }

    /// Number of `start_new_page` calls made.
    pub fn new_page_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::NewPage { .. }))
            .count()
    }

    fn check(&self, point: &FailPoint) -> Result<(), FolioError> {
        if self.fail_at.as_ref() == Some(point) {
            return Err(FolioError::Render(format!("injected failure at {:?}", point)));
        }
        Ok(())
    }
}

impl DrawingSurface for RecordingSurface {
    fn page_width(&self) -> f64 {
        self.width
    }

    fn page_height(&self) -> f64 {
        self.height
    }

    fn current_page(&self) -> usize {
        self.page
    }

    fn place_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        options: &TextOptions,
    ) -> Result<(), FolioError> {
        if let Some(FailPoint::Text(needle)) = &self.fail_at {
            if text.contains(needle.as_str()) {
                return Err(FolioError::Render(format!("injected failure drawing '{}'", text)));
            }
        }
        self.calls.push(DrawCall::Text {
            page: self.page,
            text: text.to_string(),
            x,
            y,
            options: *options,
        });
        Ok(())
    }

    fn place_image(
        &mut self,
        _image: &LoadedImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), FolioError> {
        self.check(&FailPoint::Image)?;
        self.calls.push(DrawCall::Image {
            page: self.page,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn place_table(
        &mut self,
        table: &Table,
        start_y: f64,
        style: &TableStyle,
    ) -> Result<f64, FolioError> {
        self.check(&FailPoint::Table)?;
        let start_page = self.page;
        let limit = self.height - style.margin_bottom;
        let mut y = start_y + self.row_height;
        let mut new_pages = 0;

        for _ in &table.body {
            if y + self.row_height > limit {
                self.page += 1;
                new_pages += 1;
                // header repeats at the top of the new page
                y = style.margin_top + self.row_height;
            }
            y += self.row_height;
        }

        for i in 0..new_pages {
            self.calls.push(DrawCall::NewPage {
                page: start_page + i + 1,
            });
        }
        self.calls.push(DrawCall::Table {
            page: start_page,
            start_y,
            rows: table.body.len(),
            end_page: self.page,
            end_y: y,
        });
        Ok(y)
    }

    fn start_new_page(&mut self) -> Result<(), FolioError> {
        self.page += 1;
        self.calls.push(DrawCall::NewPage { page: self.page });
        Ok(())
    }

    fn wrap_text(&self, text: &str, max_width: f64, options: &TextOptions) -> Vec<String> {
        match self.char_width {
            Some(w) => crate::text::wrap_with(text, max_width, |s| s.chars().count() as f64 * w),
            None => crate::text::wrap(text, max_width, options),
        }
    }

    fn save(&mut self, file_name: &str) -> Result<(), FolioError> {
        self.check(&FailPoint::Save)?;
        self.calls.push(DrawCall::Save {
            file_name: file_name.to_string(),
        });
        Ok(())
    }
}
