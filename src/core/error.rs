//! Domain errors for rate fetching and conversion

use thiserror::Error;

/// Every failure a rate lookup or conversion can surface to the user.
///
/// All variants are recoverable: the caller shows the message, keeps any
/// previously fetched rates and lets the user try again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    #[error("Failed to fetch {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },

    #[error("Failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("Invalid exchange rate for {currency}: {rate}")]
    InvalidRate { currency: String, rate: f64 },

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
}

impl FxError {
    pub fn fetch(source_name: &str, reason: impl ToString) -> Self {
        FxError::Fetch {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(source_name: &str, reason: impl ToString) -> Self {
        FxError::Parse {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that mean no rates are available at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FxError::Fetch { .. } | FxError::Parse { .. })
    }
}
