use wasm_bindgen::prelude::*;

use crate::config::LayoutConfig;
use crate::image_loader::load_image;

/// Render an invoice JSON document to PDF bytes. `logo` is a data URI or
/// raw base64; pass an empty string for no logo.
#[wasm_bindgen]
pub fn export_invoice_pdf(json: &str, logo: &str) -> Result<Vec<u8>, JsValue> {
    let doc = crate::parse_document(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let logo = if logo.trim().is_empty() {
        None
    } else {
        Some(load_image(logo).map_err(|e| JsValue::from_str(&e.to_string()))?)
    };
    crate::render_invoice_pdf(&doc, logo.as_ref(), &LayoutConfig::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
