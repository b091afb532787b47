//! Grid-theme table rendering with row-level page breaks.
//!
//! Rows never split. A row that would cross the bottom margin moves to a
//! new page, and the header row is repeated above it.

use log::debug;

use super::PdfCanvas;
use crate::error::FolioError;
use crate::layout::page_break::EPSILON;
use crate::surface::{Align, Color, DrawingSurface, FontStyle, Table, TableStyle, TextOptions, MM_PER_PT};

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.15;
/// Baseline offset below the top of a line box, as a multiple of font size.
const ASCENT_FACTOR: f64 = 0.8;

/// A row with its cell text already wrapped to the column widths.
struct WrappedRow {
    cells: Vec<Vec<String>>,
    height: f64,
}

struct Grid<'a> {
    style: &'a TableStyle,
    widths: Vec<f64>,
    line_height: f64,
    font_mm: f64,
}

impl Grid<'_> {
    fn wrap_row(&self, canvas: &PdfCanvas, cells: &[String], font_style: FontStyle) -> WrappedRow {
        let options = TextOptions::new(self.style.font_size).style(font_style);
        let pad = self.style.cell_padding;
        let wrapped: Vec<Vec<String>> = self
            .widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let text = cells.get(i).map(String::as_str).unwrap_or("");
                canvas.wrap_text(text, (width - 2.0 * pad).max(1.0), &options)
            })
            .collect();
        let lines = wrapped.iter().map(|c| c.len()).max().unwrap_or(0).max(1);
        WrappedRow {
            cells: wrapped,
            height: lines as f64 * self.line_height + 2.0 * pad,
        }
    }

    fn draw_row(
        &self,
        canvas: &mut PdfCanvas,
        row: &WrappedRow,
        y: f64,
        header: bool,
    ) -> Result<(), FolioError> {
        let style = self.style;
        let pad = style.cell_padding;
        let (fill, text_color, font_style) = if header {
            (Some(style.header_fill), style.header_text, style.header_font_style)
        } else {
            (None, Color::BLACK, FontStyle::Normal)
        };

        let mut x = style.margin_left;
        for (i, width) in self.widths.iter().enumerate() {
            canvas.push_rect(x, y, *width, row.height, fill, Some((style.grid_color, style.grid_width)))?;

            let align = style.column_align.get(i).copied().unwrap_or_default();
            let text_x = match align {
                Align::Left => x + pad,
                Align::Center => x + width / 2.0,
                Align::Right => x + width - pad,
            };
            let options = TextOptions::new(style.font_size).style(font_style).align(align);
            let first_baseline = y + pad + (self.line_height - self.font_mm) / 2.0 + self.font_mm * ASCENT_FACTOR;
            for (j, line) in row.cells[i].iter().enumerate() {
                let baseline = first_baseline + j as f64 * self.line_height;
                canvas.push_text(line, text_x, baseline, &options, text_color)?;
            }
            x += width;
        }
        Ok(())
    }
}

/// Draw `table` from `start_y` and return the y below its last row.
pub(super) fn render(
    canvas: &mut PdfCanvas,
    table: &Table,
    start_y: f64,
    style: &TableStyle,
) -> Result<f64, FolioError> {
    let columns = table
        .body
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.header.len()))
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return Ok(start_y);
    }

    let table_width = canvas.page_width() - style.margin_left - style.margin_right;
    if table_width <= 0.0 {
        return Err(FolioError::Render("table margins leave no width".to_string()));
    }
    let weights: Vec<f64> = if style.column_weights.len() == columns {
        style.column_weights.clone()
    } else {
        vec![1.0; columns]
    };
    let weight_sum: f64 = weights.iter().sum();
    let font_mm = style.font_size * MM_PER_PT;
    let grid = Grid {
        style,
        widths: weights.iter().map(|w| table_width * w / weight_sum).collect(),
        line_height: font_mm * LINE_HEIGHT_FACTOR,
        font_mm,
    };

    let header = grid.wrap_row(canvas, &table.header, style.header_font_style);
    let body: Vec<WrappedRow> = table
        .body
        .iter()
        .map(|cells| grid.wrap_row(canvas, cells, FontStyle::Normal))
        .collect();
    let limit = canvas.page_height() - style.margin_bottom;

    // Keep the header with at least the first row.
    let first_row = body.first().map(|r| r.height).unwrap_or(0.0);
    let mut y = start_y;
    if y + header.height + first_row > limit + EPSILON && y > style.margin_top {
        debug!("table: header would be orphaned at y={:.2}, starting on a new page", y);
        canvas.start_new_page()?;
        y = style.margin_top;
    }

    grid.draw_row(canvas, &header, y, true)?;
    y += header.height;
    let mut rows_on_page = 0;

    for row in &body {
        if rows_on_page > 0 && y + row.height > limit + EPSILON {
            canvas.start_new_page()?;
            y = style.margin_top;
            grid.draw_row(canvas, &header, y, true)?;
            y += header.height;
            rows_on_page = 0;
        }
        grid.draw_row(canvas, row, y, false)?;
        y += row.height;
        rows_on_page += 1;
    }

    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawCommand;

    fn table(rows: usize) -> Table {
        Table {
            header: vec!["Item".into(), "Qty".into()],
            body: (0..rows).map(|i| vec![format!("row {}", i), "1".into()]).collect(),
        }
    }

    fn texts_on(canvas: &PdfCanvas, page: usize) -> Vec<String> {
        canvas.pages()[page]
            .elements
            .iter()
            .filter_map(|e| match &e.draw {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_short_table_stays_on_page() {
        let mut canvas = PdfCanvas::new(210.0, 297.0);
        let end = render(&mut canvas, &table(3), 120.0, &TableStyle::default()).unwrap();
        assert_eq!(canvas.page_count(), 1);
        assert!(end > 120.0);
        assert!(texts_on(&canvas, 0).contains(&"row 2".to_string()));
    }

    #[test]
    fn test_long_table_repeats_header() {
        let mut canvas = PdfCanvas::new(210.0, 297.0);
        let style = TableStyle::default();
        let end = render(&mut canvas, &table(60), 120.0, &style).unwrap();
        assert!(canvas.page_count() >= 2);
        assert!(end <= 297.0 - style.margin_bottom + 1e-6);
        for page in 0..canvas.page_count() {
            assert_eq!(texts_on(&canvas, page)[0], "Item");
        }
        let all: Vec<String> = (0..canvas.page_count()).flat_map(|p| texts_on(&canvas, p)).collect();
        for i in 0..60 {
            assert_eq!(all.iter().filter(|t| **t == format!("row {}", i)).count(), 1);
        }
    }

    #[test]
    fn test_long_cell_text_grows_row() {
        let mut canvas = PdfCanvas::new(210.0, 297.0);
        let short = render(&mut canvas, &table(1), 20.0, &TableStyle::default()).unwrap() - 20.0;

        let mut canvas = PdfCanvas::new(210.0, 297.0);
        let tall = Table {
            header: vec!["Item".into(), "Qty".into()],
            body: vec![vec!["word ".repeat(80), "1".into()]],
        };
        let grown = render(&mut canvas, &tall, 20.0, &TableStyle::default()).unwrap() - 20.0;
        assert!(grown > short);
    }

    #[test]
    fn test_empty_table_draws_nothing() {
        let mut canvas = PdfCanvas::new(210.0, 297.0);
        let end = render(&mut canvas, &Table::default(), 120.0, &TableStyle::default()).unwrap();
        assert_eq!(end, 120.0);
        assert!(canvas.pages()[0].elements.is_empty());
    }
}
