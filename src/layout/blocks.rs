//! Fixed-position blocks: the invoice header, the line-item table and the
//! totals rows.
//!
//! The header sits at literal page-1 coordinates. The table and totals are
//! placed relative to wherever the cursor is when they are reached.

use crate::config::LayoutConfig;
use crate::error::FolioError;
use crate::image_loader::LoadedImage;
use crate::model::{DiscountType, InvoiceDocument, LineItem, Totals};
use crate::surface::{Align, DrawingSurface, FontStyle, Table, TableStyle, TextOptions};
use crate::totals::format_money;

/// Logo box: x, y, width, height.
const LOGO_BOX: (f64, f64, f64, f64) = (10.0, 10.0, 50.0, 25.0);
const TITLE_Y: f64 = 20.0;
const COMPANY_Y: f64 = 45.0;
const META_PITCH: f64 = 5.0;
/// Address lines reserved before the company phone line.
const MIN_ADDRESS_LINES: usize = 3;
const PARTIES_Y: f64 = 80.0;
const SECOND_COLUMN_X: f64 = 140.0;
const SERVICE_Y: f64 = 105.0;

/// Rounding below this is floating-point noise, not a cash adjustment.
const ROUNDING_EPSILON: f64 = 1e-9;

/// Draw everything above the line-item table on page 1.
pub fn place_header<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    doc: &InvoiceDocument,
    logo: Option<&LoadedImage>,
    config: &LayoutConfig,
) -> Result<(), FolioError> {
    let left = config.margin_left;
    let right = config.right_edge();

    if let Some(image) = logo {
        let (x, y, w, h) = LOGO_BOX;
        surface.place_image(image, x, y, w, h)?;
    }

    let title = TextOptions::new(18.0).style(FontStyle::Bold).align(Align::Right);
    surface.place_text("TAX INVOICE", right, TITLE_Y, &title)?;

    // Company identity, left column
    let bold = TextOptions::new(10.0).style(FontStyle::Bold);
    let company = &doc.company_info;
    surface.place_text(&company.name, left, COMPANY_Y, &bold)?;
    for (i, line) in company.address.iter().enumerate() {
        let y = COMPANY_Y + META_PITCH * (i + 1) as f64;
        surface.place_text(line, left, y, &bold)?;
    }
    let address_lines = company.address.len().max(MIN_ADDRESS_LINES);
    let phone_y = COMPANY_Y + META_PITCH * (address_lines + 1) as f64;
    surface.place_text(&format!("Phone: {}", company.phone), left, phone_y, &bold)?;

    // Invoice metadata, right-aligned
    let meta = bold.align(Align::Right);
    let info = &doc.invoice_info;
    let rows = [
        format!("Invoice #: {}", info.number),
        format!("Date: {}", info.date),
        format!("GST #: {}", info.gst_number),
    ];
    for (i, row) in rows.iter().enumerate() {
        surface.place_text(row, right, COMPANY_Y + META_PITCH * i as f64, &meta)?;
    }

    // Parties
    let heading = TextOptions::new(12.0).style(FontStyle::Bold);
    let normal = TextOptions::new(10.0);
    let customer = &doc.customer_info;
    let vehicle = &doc.vehicle_info;
    surface.place_text("BILL TO:", left, PARTIES_Y, &heading)?;
    surface.place_text("VEHICLE DETAILS:", SECOND_COLUMN_X, PARTIES_Y, &heading)?;

    let columns = [
        (
            left,
            [
                format!("Name: {}", customer.name),
                format!("Phone: {}", customer.phone),
                format!("Email: {}", customer.email),
            ],
        ),
        (
            SECOND_COLUMN_X,
            [
                format!("Registration: {}", vehicle.registration),
                format!("Odometer: {}", vehicle.odometer),
                format!("Make/Model: {}", vehicle.make_model),
            ],
        ),
    ];
    for (x, lines) in &columns {
        for (i, line) in lines.iter().enumerate() {
            let y = PARTIES_Y + META_PITCH * (i + 1) as f64;
            surface.place_text(line, *x, y, &normal)?;
        }
    }

    // Service metadata
    surface.place_text(&format!("Service Date: {}", info.service_date), left, SERVICE_Y, &normal)?;
    surface.place_text(&format!("CRIM #: {}", info.crim_number), SECOND_COLUMN_X, SERVICE_Y, &normal)?;
    let second = SERVICE_Y + META_PITCH;
    surface.place_text(&format!("Salesperson: {}", info.salesperson), left, second, &normal)?;
    surface.place_text(&format!("Entered by: {}", info.entered_by), SECOND_COLUMN_X, second, &normal)?;

    Ok(())
}

/// The line-item table: fixed header, one body row per item.
pub fn line_item_table(items: &[LineItem]) -> Table {
    Table {
        header: ["Item/Service", "Description", "Qty", "Unit Price", "Total"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        body: items
            .iter()
            .map(|item| {
                vec![
                    item.name.clone(),
                    item.description.clone(),
                    item.quantity.to_string(),
                    format_money(item.unit_price),
                    format_money(item.total),
                ]
            })
            .collect(),
    }
}

/// Grid-theme style for the line-item table.
pub fn line_item_table_style(config: &LayoutConfig) -> TableStyle {
    TableStyle {
        column_weights: vec![0.22, 0.38, 0.1, 0.15, 0.15],
        column_align: vec![Align::Left, Align::Left, Align::Right, Align::Right, Align::Right],
        margin_top: config.margin_top,
        ..TableStyle::default()
    }
}

/// One label/value pair of the totals block.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsRow {
    pub label: String,
    pub value: String,
    pub emphasis: bool,
}

/// The rows to draw, top to bottom. Rounding appears only when non-zero,
/// so TOTAL is the fourth or fifth row.
pub fn totals_rows(totals: &Totals) -> Vec<TotalsRow> {
    let row = |label: String, amount: f64| TotalsRow {
        label,
        value: format_money(amount),
        emphasis: false,
    };

    let discount_label = match totals.discount_type {
        DiscountType::Percentage => format!("Discount ({}%):", totals.discount),
        DiscountType::Fixed => "Discount:".to_string(),
    };

    let mut rows = vec![
        row("Subtotal:".to_string(), totals.subtotal),
        row(discount_label, totals.discount_amount()),
        row("GST (15%):".to_string(), totals.gst),
    ];
    if totals.rounding.abs() > ROUNDING_EPSILON {
        rows.push(row("Rounding:".to_string(), totals.rounding));
    }
    rows.push(TotalsRow {
        label: "TOTAL:".to_string(),
        value: format_money(totals.total),
        emphasis: true,
    });
    rows
}

/// Draw the totals rows from `base_y` at the configured pitch. Returns the
/// baseline of the TOTAL row.
pub fn place_totals<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    rows: &[TotalsRow],
    base_y: f64,
    config: &LayoutConfig,
) -> Result<f64, FolioError> {
    let mut y = base_y;
    for (i, row) in rows.iter().enumerate() {
        y = base_y + config.totals_pitch * i as f64;
        let style = if row.emphasis {
            FontStyle::Bold
        } else {
            FontStyle::Normal
        };
        let options = TextOptions::new(10.0).style(style).align(Align::Right);
        surface.place_text(&row.label, config.totals_label_x, y, &options)?;
        surface.place_text(&row.value, config.right_edge(), y, &options)?;
    }
    Ok(y)
}
