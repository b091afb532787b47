//! # Totals Arithmetic
//!
//! Subtotal, discount, GST and cash rounding. The layout engine consumes
//! [`Totals`] as given; this module is what produces them.

use crate::model::{DiscountType, LineItem, Totals};

/// GST rate applied after discount.
pub const GST_RATE: f64 = 0.15;

/// Cash rounding increment for the final total.
pub const CASH_INCREMENT: f64 = 0.05;

impl Totals {
    /// Compute the full totals block from line items and a discount.
    pub fn compute(items: &[LineItem], discount: f64, discount_type: DiscountType) -> Self {
        let subtotal: f64 = items.iter().map(|item| item.total).sum();
        let discount_amount = discount_amount(subtotal, discount, discount_type);
        let gst = (subtotal - discount_amount) * GST_RATE;
        let before_rounding = subtotal - discount_amount + gst;
        let total = round_to_increment(before_rounding, CASH_INCREMENT);

        Totals {
            subtotal,
            discount,
            discount_type,
            gst,
            total,
            rounding: total - before_rounding,
        }
    }

    /// The currency amount taken off the subtotal.
    pub fn discount_amount(&self) -> f64 {
        discount_amount(self.subtotal, self.discount, self.discount_type)
    }
}

fn discount_amount(subtotal: f64, discount: f64, discount_type: DiscountType) -> f64 {
    match discount_type {
        DiscountType::Percentage => subtotal * discount / 100.0,
        DiscountType::Fixed => discount,
    }
}

/// Round to the nearest multiple of `increment`, halves away from zero.
///
/// Scales by the reciprocal (`* 20` for 0.05) since dividing by an inexact
/// increment pulls exact half cases such as 12.075 below the midpoint. The
/// nudge absorbs float noise left over from summing cent amounts.
pub fn round_to_increment(value: f64, increment: f64) -> f64 {
    let steps = 1.0 / increment;
    let scaled = value * steps;
    (scaled + scaled.signum() * 1e-9).round() / steps
}

/// Format a currency amount as `$1,234.56` (`-$12.00` for negatives).
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let grouped = dollars
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
