//! # Font Management
//!
//! The invoice is set entirely in the standard PDF Helvetica family, which
//! needs no embedding. This module resolves a text style to one of the four
//! faces and measures strings with its metrics.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::surface::FontStyle;

/// The four Helvetica faces used by the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFont {
    /// The face that renders `style`.
    pub fn for_style(style: FontStyle) -> Self {
        match style {
            FontStyle::Normal => Self::Helvetica,
            FontStyle::Bold => Self::HelveticaBold,
            FontStyle::Italic => Self::HelveticaOblique,
            FontStyle::BoldItalic => Self::HelveticaBoldOblique,
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
        }
    }
}

/// Measure `text` in points for the given style and size.
pub fn measure(text: &str, style: FontStyle, font_size: f64) -> f64 {
    StandardFont::for_style(style)
        .metrics()
        .measure_string(text, font_size)
}
