//! Core business logic abstractions

pub mod config;
pub mod convert;
pub mod error;
pub mod history;
pub mod i18n;
pub mod log;
pub mod presenter;
pub mod rates;

// Re-export main types for cleaner imports
pub use convert::{Conversion, ConversionRequest, convert, convert_with, format_amount};
pub use error::FxError;
pub use history::{HistoryFetcher, PricePoint};
pub use i18n::{Catalog, Language, MessageKey};
pub use presenter::{Action, ConversionPresenter, Panel, ViewState};
pub use rates::{AssetPriceProvider, BASE_CURRENCY, RateProvider, RateSource, RateTable};
