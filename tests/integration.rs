//! Integration tests for the Folio export pipeline.
//!
//! These tests exercise the full path from an invoice document to pages.
//! They verify:
//! - Note lines are never lost or duplicated across page breaks
//! - The fit boundary is inclusive
//! - Totals and footer follow whatever content precedes them
//! - Both note placement policies
//! - Failures abort the export
//! - The PDF canvas writes a structurally valid file

use folio::config::{LayoutConfig, NoteBreak, NotePosition};
use folio::layout::{LayoutEngine, Phase};
use folio::model::*;
use folio::surface::recording::{DrawCall, FailPoint, RecordingSurface};
use folio::surface::{Align, FontStyle};

// ─── Helpers ────────────────────────────────────────────────────

/// A note of `n` short lines, one per explicit newline.
fn numbered_note(n: usize) -> String {
    (0..n).map(|i| format!("ln-{:03}", i)).collect::<Vec<_>>().join("\n")
}

fn make_doc(items: usize, note: &str) -> InvoiceDocument {
    InvoiceDocument {
        items: (0..items)
            .map(|i| LineItem::new(&format!("Part {}", i), "Supplied and fitted", 1.0, 50.0))
            .collect(),
        invoice_info: InvoiceInfo {
            number: "INV-1".to_string(),
            next_service_date: "01/05/2027".to_string(),
            ..Default::default()
        },
        company_info: CompanyInfo {
            name: "Harbour Auto".to_string(),
            address: vec!["12 Wharf Rd".to_string(), "Port Chalmers".to_string()],
            phone: "03 555 0199".to_string(),
        },
        calculation: Totals::compute(&[LineItem::new("a", "", 2.0, 50.0)], 10.0, DiscountType::Percentage),
        sale_note: note.to_string(),
        ..Default::default()
    }
}

/// A surface whose empty table ends at y=130, so the note starts at 147.
fn boundary_surface() -> RecordingSurface {
    RecordingSurface::a4().with_row_height(10.0).with_char_width(1.0)
}

fn note_lines_drawn(surface: &RecordingSurface) -> Vec<(usize, String)> {
    surface
        .texts()
        .into_iter()
        .filter(|(_, t, _, _)| t.starts_with("ln-"))
        .map(|(page, t, _, _)| (page, t.to_string()))
        .collect()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn count(bytes: &[u8], needle: &[u8]) -> usize {
    bytes.windows(needle.len()).filter(|w| *w == needle).count()
}

// ─── Note Pagination ────────────────────────────────────────────

#[test]
fn test_note_exactly_filling_page_does_not_break() {
    let mut surface = boundary_surface();
    let report = LayoutEngine::default()
        .export(&mut surface, &make_doc(0, &numbered_note(20)), None)
        .unwrap();

    assert_eq!(surface.new_page_count(), 0);
    assert_eq!(report.page_count, 1);
    assert_eq!(report.note_pages, 1);
    assert!(!report.phases.contains(&Phase::NoteContinuation));

    let (_, _, _, first_y) = surface.find_text("ln-000").unwrap();
    assert!((first_y - 147.0).abs() < 1e-9);
}

#[test]
fn test_one_line_over_breaks_once() {
    let mut surface = boundary_surface();
    let report = LayoutEngine::default()
        .export(&mut surface, &make_doc(0, &numbered_note(21)), None)
        .unwrap();

    assert_eq!(report.page_count, 2);
    assert_eq!(report.note_pages, 2);
    assert!(report.phases.contains(&Phase::NoteContinuation));

    let lines = note_lines_drawn(&surface);
    assert_eq!(lines.iter().filter(|(p, _)| *p == 0).count(), 20);
    assert_eq!(lines.last().unwrap(), &(1, "ln-020".to_string()));

    let (page, _, _, y) = surface.find_text("Note (continued):").unwrap();
    assert_eq!((page, y), (1, 20.0));
    let (_, _, _, y) = surface.find_text("ln-020").unwrap();
    assert!((y - 25.0).abs() < 1e-9);
}

#[test]
fn test_note_with_no_room_moves_whole_to_next_page() {
    // Ten rows end the table at 230, so the note would start right on the
    // bottom margin at 247 with zero space left.
    let mut surface = boundary_surface();
    let report = LayoutEngine::default()
        .export(&mut surface, &make_doc(10, &numbered_note(3)), None)
        .unwrap();

    let lines = note_lines_drawn(&surface);
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|(page, _)| *page == 1));

    let (page, _, _, y) = surface.find_text("Note:").unwrap();
    assert_eq!((page, y), (1, 20.0));
    let (_, _, _, y) = surface.find_text("ln-000").unwrap();
    assert!((y - 25.0).abs() < 1e-9);
    assert!(surface.find_text("Note (continued):").is_none());

    assert_eq!(report.note_pages, 1);
    assert!(report.phases.contains(&Phase::Note));
    assert!(!report.phases.contains(&Phase::NoteContinuation));
}

#[test]
fn test_long_note_loses_nothing_across_many_pages() {
    let mut surface = boundary_surface();
    let report = LayoutEngine::default()
        .export(&mut surface, &make_doc(3, &numbered_note(200)), None)
        .unwrap();

    let drawn: Vec<String> = note_lines_drawn(&surface).into_iter().map(|(_, t)| t).collect();
    let expected: Vec<String> = (0..200).map(|i| format!("ln-{:03}", i)).collect();
    assert_eq!(drawn, expected);

    assert!(report.note_pages > 2);
    let continued = surface
        .texts()
        .iter()
        .filter(|(_, t, _, _)| *t == "Note (continued):")
        .count();
    assert_eq!(continued, report.note_pages - 1);

    // Nothing lands inside the reserved bottom margin.
    let limit = 297.0 - LayoutConfig::default().note.bottom_margin;
    for (_, t, _, y) in surface.texts() {
        if t.starts_with("ln-") {
            assert!(y <= limit, "{} drawn at y={}", t, y);
        }
    }
}

#[test]
fn test_wrapped_note_keeps_every_word() {
    let note = "word ".repeat(400);
    let mut surface = RecordingSurface::a4().with_char_width(2.0);
    LayoutEngine::default()
        .export(&mut surface, &make_doc(2, note.trim_end()), None)
        .unwrap();

    let words: usize = surface
        .calls()
        .iter()
        .filter_map(|c| match c {
            DrawCall::Text { text, x, .. } if *x == 25.0 => Some(text.split_whitespace().count()),
            _ => None,
        })
        .sum();
    assert_eq!(words, 400);
}

#[test]
fn test_empty_note_draws_nothing() {
    for note in ["", "   \n\t  "] {
        let mut surface = boundary_surface();
        let report = LayoutEngine::default()
            .export(&mut surface, &make_doc(1, note), None)
            .unwrap();
        assert_eq!(report.note_lines, 0);
        assert_eq!(report.note_pages, 0);
        assert!(surface.find_text("Note").is_none());
        assert_eq!(surface.new_page_count(), 0);
    }
}

#[test]
fn test_note_label_and_font() {
    let mut surface = boundary_surface();
    LayoutEngine::default()
        .export(&mut surface, &make_doc(0, "Check tyres"), None)
        .unwrap();

    let (_, _, x, y) = surface.find_text("Note:").unwrap();
    assert_eq!((x, y), (10.0, 147.0));
    let options = surface.options_of("Check tyres").unwrap();
    assert_eq!(options.font_style, FontStyle::Italic);
    assert_eq!(options.font_size, 10.0);
}

// ─── Totals & Footer ────────────────────────────────────────────

#[test]
fn test_total_row_shifts_with_rounding() {
    let mut with_rounding = make_doc(1, "short");
    with_rounding.calculation = Totals::compute(
        &[LineItem::new("x", "", 1.0, 100.07)],
        0.0,
        DiscountType::Percentage,
    );
    assert!(with_rounding.calculation.rounding.abs() > 1e-9);
    let without_rounding = make_doc(1, "short");
    assert!(without_rounding.calculation.rounding.abs() < 1e-9);

    let engine = LayoutEngine::default();
    let mut a = boundary_surface();
    let mut b = boundary_surface();
    let ra = engine.export(&mut a, &with_rounding, None).unwrap();
    let rb = engine.export(&mut b, &without_rounding, None).unwrap();

    assert!((ra.total_line_y - rb.total_line_y - 5.0).abs() < 1e-9);
    assert!(a.find_text("Rounding:").is_some());
    assert!(b.find_text("Rounding:").is_none());

    let (_, label, x, _) = a.find_text("TOTAL:").unwrap();
    assert_eq!((label, x), ("TOTAL:", 150.0));
    assert_eq!(a.options_of("TOTAL:").unwrap().font_style, FontStyle::Bold);
    assert_eq!(a.options_of("$115.10").unwrap().align, Align::Right);
}

#[test]
fn test_totals_follow_the_note() {
    let mut surface = boundary_surface();
    let report = LayoutEngine::default()
        .export(&mut surface, &make_doc(0, &numbered_note(4)), None)
        .unwrap();

    // 147 + 4 lines * 5 + 10 gap, then three rows above TOTAL
    let (_, _, _, subtotal_y) = surface.find_text("Subtotal:").unwrap();
    assert!((subtotal_y - 177.0).abs() < 1e-9);
    assert!((report.total_line_y - 192.0).abs() < 1e-9);
}

#[test]
fn test_totals_move_whole_when_crowding_footer() {
    // 20 lines end the note at y=257; TOTAL would land at 277, past 297 - 25
    let mut doc = make_doc(0, &numbered_note(20));
    doc.calculation.rounding = 0.02;
    let mut config = LayoutConfig::default();
    config.footer_clearance = 25.0;

    let mut surface = boundary_surface();
    let report = LayoutEngine::new(config).export(&mut surface, &doc, None).unwrap();

    assert_eq!(report.totals_page, 1);
    let (page, _, _, y) = surface.find_text("Subtotal:").unwrap();
    assert_eq!((page, y), (1, 20.0));
    assert_eq!(surface.find_text("TOTAL:").unwrap().0, 1);
}

#[test]
fn test_footer_on_last_page() {
    let mut surface = boundary_surface();
    let report = LayoutEngine::default()
        .export(&mut surface, &make_doc(0, &numbered_note(120)), None)
        .unwrap();

    let (page, _, x, y) = surface.find_text("Thank you for your business!").unwrap();
    assert_eq!(page, report.page_count - 1);
    assert_eq!(page, report.footer_page);
    assert_eq!((x, y), (105.0, 280.0));
    assert_eq!(surface.options_of("Thank you").unwrap().align, Align::Center);
}

// ─── Header & Table ─────────────────────────────────────────────

#[test]
fn test_header_blocks_at_fixed_positions() {
    let mut surface = RecordingSurface::a4();
    LayoutEngine::default()
        .export(&mut surface, &make_doc(1, ""), None)
        .unwrap();

    let (_, _, x, y) = surface.find_text("TAX INVOICE").unwrap();
    assert_eq!((x, y), (190.0, 20.0));
    assert_eq!(surface.find_text("Harbour Auto").unwrap().3, 45.0);
    // Two address lines still reserve three before the phone line.
    assert_eq!(surface.find_text("Phone: 03").unwrap().3, 65.0);
    assert_eq!(surface.find_text("Invoice #: INV-1").unwrap().3, 45.0);
    assert_eq!(surface.find_text("VEHICLE DETAILS:").unwrap().2, 140.0);
}

#[test]
fn test_long_table_pushes_everything_down() {
    let mut surface = RecordingSurface::a4().with_char_width(1.0);
    let report = LayoutEngine::default()
        .export(&mut surface, &make_doc(40, "after the table"), None)
        .unwrap();

    let table_end = surface
        .calls()
        .iter()
        .find_map(|c| match c {
            DrawCall::Table { end_page, end_y, .. } => Some((*end_page, *end_y)),
            _ => None,
        })
        .unwrap();
    assert_eq!(table_end.0, 1);

    let (page, _, _, y) = surface.find_text("Next Service Date:").unwrap();
    assert_eq!(page, 1);
    assert!((y - (table_end.1 + 10.0)).abs() < 1e-9);
    let (_, _, _, note_y) = surface.find_text("Note:").unwrap();
    assert!((note_y - (y + 7.0)).abs() < 1e-9);
    assert_eq!(report.page_count, 2);
}

// ─── Placement Policy ───────────────────────────────────────────

#[test]
fn test_always_new_page_policy() {
    let mut config = LayoutConfig::default();
    config.note.policy.page_break = NoteBreak::AlwaysNewPage;
    let mut surface = boundary_surface();
    let report = LayoutEngine::new(config)
        .export(&mut surface, &make_doc(0, &numbered_note(3)), None)
        .unwrap();

    assert_eq!(report.page_count, 2);
    let (page, _, _, y) = surface.find_text("Note:").unwrap();
    assert_eq!((page, y), (1, 20.0));
    assert_eq!(surface.find_text("ln-000").unwrap().3, 25.0);
    assert!(!report.phases.contains(&Phase::NoteContinuation));
}

#[test]
fn test_after_totals_policy() {
    let mut config = LayoutConfig::default();
    config.note.policy.position = NotePosition::AfterTotals;
    let mut surface = boundary_surface();
    let report = LayoutEngine::new(config)
        .export(&mut surface, &make_doc(0, &numbered_note(3)), None)
        .unwrap();

    let texts = surface.texts();
    let total_idx = texts.iter().position(|(_, t, _, _)| *t == "TOTAL:").unwrap();
    let note_idx = texts.iter().position(|(_, t, _, _)| *t == "Note:").unwrap();
    assert!(total_idx < note_idx);
    assert!(texts[note_idx].3 > report.total_line_y);

    let totals = report.phases.iter().position(|p| *p == Phase::Totals).unwrap();
    let note = report.phases.iter().position(|p| *p == Phase::Note).unwrap();
    assert!(totals < note);
}

// ─── Failures & Output ──────────────────────────────────────────

#[test]
fn test_save_uses_invoice_number() {
    let mut surface = RecordingSurface::a4();
    LayoutEngine::default()
        .export(&mut surface, &make_doc(1, ""), None)
        .unwrap();
    assert_eq!(
        surface.calls().last(),
        Some(&DrawCall::Save {
            file_name: "Invoice-INV-1.pdf".to_string()
        })
    );
}

#[test]
fn test_failures_abort_export() {
    let points = [
        FailPoint::Table,
        FailPoint::Save,
        FailPoint::Text("ln-005".to_string()),
    ];
    for point in points {
        let mut surface = boundary_surface().failing_at(point.clone());
        let err = LayoutEngine::default()
            .export(&mut surface, &make_doc(2, &numbered_note(10)), None)
            .unwrap_err();
        assert!(err.to_string().starts_with("export failed"), "{:?}: {}", point, err);
        assert!(!surface.calls().iter().any(|c| matches!(c, DrawCall::Save { .. })));
    }
}

#[test]
fn test_export_writes_valid_pdf_file() {
    let dir = tempfile::tempdir().unwrap();
    let report = folio::export_invoice(
        &make_doc(3, &"A long note that wraps. ".repeat(300)),
        None,
        &LayoutConfig::default(),
        dir.path(),
    )
    .unwrap();

    assert_eq!(report.file_name, "Invoice-INV-1.pdf");
    assert!(report.page_count >= 2);
    let bytes = std::fs::read(dir.path().join(&report.file_name)).unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(count(&bytes, b"/Type /Page "), report.page_count);
    assert_eq!(count(&bytes, b"/Title (Tax Invoice INV-1)"), 1);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_failed_export_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = folio::export_invoice(
        &make_doc(1, ""),
        Some("data:image/png;base64,not-an-image"),
        &LayoutConfig::default(),
        dir.path(),
    );
    assert!(result.is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_render_in_memory_with_logo() {
    let mut img = image::RgbaImage::new(4, 2);
    for pixel in img.pixels_mut() {
        *pixel = image::Rgba([245, 166, 35, 200]);
    }
    let mut png = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png);
    image::ImageEncoder::write_image(encoder, img.as_raw(), 4, 2, image::ColorType::Rgba8).unwrap();
    let logo = folio::image_loader::load_image_bytes(&png).unwrap();

    let bytes = folio::render_invoice_pdf(&make_doc(2, "Thanks"), Some(&logo), &LayoutConfig::default())
        .unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(count(&bytes, b"/SMask"), 1);
    assert_eq!(count(&bytes, b"/Im0 "), 1);
}

#[test]
fn test_parse_document_from_camel_case_json() {
    let json = r#"{
        "items": [{"name": "Oil", "quantity": 2, "unitPrice": 12.5, "total": 25}],
        "invoiceInfo": {"number": "A/7", "nextServiceDate": "soon"},
        "calculation": {"subtotal": 25, "gst": 3.75, "total": 28.75},
        "saleNote": "hi"
    }"#;
    let doc = folio::parse_document(json).unwrap();
    assert_eq!(doc.items[0].unit_price, 12.5);
    assert_eq!(doc.calculation.discount_type, DiscountType::Percentage);
    assert_eq!(doc.file_name(), "Invoice-A_7.pdf");

    let err = folio::parse_document("{ \"items\": [ }").unwrap_err();
    assert!(err.to_string().starts_with("export failed"));
}

// ─── Totals Scenarios ───────────────────────────────────────────

#[test]
fn test_totals_scenario_discounted() {
    let totals = Totals::compute(&[LineItem::new("a", "", 2.0, 50.0)], 10.0, DiscountType::Percentage);
    assert!((totals.subtotal - 100.0).abs() < 1e-9);
    assert!((totals.discount_amount() - 10.0).abs() < 1e-9);
    assert!((totals.gst - 13.5).abs() < 1e-9);
    assert!((totals.total - 103.5).abs() < 1e-9);
    assert!(totals.rounding.abs() < 1e-9);
}

#[test]
fn test_totals_scenario_cash_rounding() {
    let totals = Totals::compute(&[LineItem::new("a", "", 1.0, 100.07)], 0.0, DiscountType::Percentage);
    assert!((totals.gst - 15.0105).abs() < 1e-9);
    assert!((totals.total - 115.10).abs() < 1e-9);
    assert!((totals.rounding - 0.0195).abs() < 1e-9);
}
