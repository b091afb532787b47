//! Structured error type for invoice export.
//!
//! Every failure is an export failure: the layout engine never recovers
//! partially, so callers only need to know *that* the export failed and a
//! readable cause. The variants exist for the message, not for branching.

use thiserror::Error;

/// The unified error type returned by all public Folio API functions.
#[derive(Debug, Error)]
pub enum FolioError {
    /// JSON input failed to parse as a valid invoice document or config.
    #[error("export failed: could not parse input: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// The logo could not be read or decoded.
    #[error("export failed: image error: {0}")]
    Image(String),
    /// Text, table or PDF generation failed.
    #[error("export failed: render error: {0}")]
    Render(String),
    /// The layout configuration is unusable (e.g. a zero line pitch).
    #[error("export failed: invalid layout config: {0}")]
    Config(String),
    /// The finished document could not be written.
    #[error("export failed: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the invoice schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FolioError::Parse { source: e, hint }
    }
}
