//! # Invoice Model
//!
//! The input to an export: an immutable snapshot of everything the form
//! collected. Field names follow the JSON the form emits (camelCase), so a
//! document can be fed straight from the browser state.

use serde::{Deserialize, Serialize};

/// The full set of values rendered into one invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub vehicle_info: VehicleInfo,
    #[serde(default)]
    pub invoice_info: InvoiceInfo,
    #[serde(default)]
    pub company_info: CompanyInfo,
    #[serde(default)]
    pub calculation: Totals,
    /// Free-text note of unbounded length.
    #[serde(default)]
    pub sale_note: String,
}

impl InvoiceDocument {
    /// The deterministic output file name: `Invoice-<number>.pdf`.
    ///
    /// Characters that are not safe in a file name on common platforms are
    /// replaced with `_`; an empty number becomes `Invoice-draft.pdf`.
    pub fn file_name(&self) -> String {
        let number: String = self
            .invoice_info
            .number
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        if number.is_empty() {
            "Invoice-draft.pdf".to_string()
        } else {
            format!("Invoice-{}.pdf", number)
        }
    }
}

/// One row of the line-item table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Pre-computed `quantity * unit_price`. Layout never recomputes it.
    pub total: f64,
}

impl LineItem {
    /// Build an item with its total filled in.
    pub fn new(name: &str, description: &str, quantity: f64, unit_price: f64) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            description: description.to_string(),
            quantity,
            unit_price,
            total: quantity * unit_price,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    #[serde(default)]
    pub registration: String,
    #[serde(default)]
    pub odometer: String,
    #[serde(default)]
    pub make_model: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceInfo {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub gst_number: String,
    #[serde(default)]
    pub service_date: String,
    #[serde(default)]
    pub next_service_date: String,
    #[serde(default)]
    pub salesperson: String,
    #[serde(default)]
    pub entered_by: String,
    #[serde(default)]
    pub crim_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[serde(default)]
    pub name: String,
    /// One entry per printed address line.
    #[serde(default)]
    pub address: Vec<String>,
    #[serde(default)]
    pub phone: String,
}

/// How the discount figure is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscountType {
    #[default]
    Percentage,
    Fixed,
}

/// The totals block as computed upstream. See [`crate::totals`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub discount_type: DiscountType,
    pub gst: f64,
    pub total: f64,
    #[serde(default)]
    pub rounding: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_document() {
        let json = r#"{
            "items": [{"id": "a", "name": "Tyre", "description": "205/55R16",
                       "quantity": 4, "unitPrice": 120, "total": 480}],
            "customerInfo": {"name": "Jo", "email": "jo@example.com", "phone": "021"},
            "vehicleInfo": {"registration": "ABC123", "odometer": "120000", "makeModel": "Corolla"},
            "invoiceInfo": {"number": "INV-2026-1001", "gstNumber": "123-456-789",
                            "nextServiceDate": "2027-04-19", "crimNumber": "77"},
            "companyInfo": {"name": "Acme", "address": ["1 Road", "Town"], "phone": ""},
            "calculation": {"subtotal": 480, "discount": 0, "discountType": "fixed",
                            "gst": 72, "total": 552, "rounding": 0},
            "saleNote": "Rotate at next service."
        }"#;
        let doc: InvoiceDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.items.len(), 1);
        assert_eq!(doc.items[0].unit_price, 120.0);
        assert_eq!(doc.vehicle_info.make_model, "Corolla");
        assert_eq!(doc.invoice_info.next_service_date, "2027-04-19");
        assert_eq!(doc.calculation.discount_type, DiscountType::Fixed);
        assert_eq!(doc.company_info.address.len(), 2);
    }

    #[test]
    fn test_missing_sections_default() {
        let doc: InvoiceDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.items.is_empty());
        assert!(doc.sale_note.is_empty());
        assert_eq!(doc.calculation.discount_type, DiscountType::Percentage);
    }

    #[test]
    fn test_file_name() {
        let mut doc = InvoiceDocument::default();
        doc.invoice_info.number = "INV-2026-4821".into();
        assert_eq!(doc.file_name(), "Invoice-INV-2026-4821.pdf");

        doc.invoice_info.number = "A/B:7".into();
        assert_eq!(doc.file_name(), "Invoice-A_B_7.pdf");

        doc.invoice_info.number = "  ".into();
        assert_eq!(doc.file_name(), "Invoice-draft.pdf");
    }

    #[test]
    fn test_line_item_new_computes_total() {
        let item = LineItem::new("Oil change", "", 2.0, 50.0);
        assert_eq!(item.total, 100.0);
    }
}
