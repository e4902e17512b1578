//! Exchange rate table and provider abstractions

use crate::core::error::FxError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const BASE_CURRENCY: &str = "EUR";

/// Rates for a set of currencies, all quoted as units of the currency per one
/// unit of the base currency.
///
/// The base currency is always present at exactly `1.0` and every other rate is
/// finite and strictly positive. Once shared behind an `Arc` a table is never
/// modified; a refresh builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: String,
    as_of: Option<NaiveDate>,
    rates: BTreeMap<String, f64>,
    unavailable: Vec<String>,
}

impl RateTable {
    pub fn new(base: &str, as_of: Option<NaiveDate>) -> Self {
        let base = base.to_uppercase();
        let mut rates = BTreeMap::new();
        rates.insert(base.clone(), 1.0);
        RateTable {
            base,
            as_of,
            rates,
            unavailable: Vec::new(),
        }
    }

    /// Adds a rate for `currency`, rejecting anything that could not be used
    /// as a divisor. The base currency cannot be overwritten.
    pub fn insert(&mut self, currency: &str, rate: f64) -> Result<(), FxError> {
        let code = currency.trim().to_uppercase();
        if code.is_empty() {
            return Err(FxError::UnsupportedCurrency(currency.to_string()));
        }
        if !rate.is_finite() || rate <= 0.0 {
            return Err(FxError::InvalidRate {
                currency: code,
                rate,
            });
        }
        if code != self.base {
            self.rates.insert(code, rate);
        }
        Ok(())
    }

    /// Records an optional asset that was requested but could not be priced.
    pub fn mark_unavailable(&mut self, currency: &str) {
        let code = currency.to_uppercase();
        if !self.unavailable.contains(&code) {
            self.unavailable.push(code);
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    pub fn get(&self, currency: &str) -> Option<f64> {
        self.rates.get(&currency.trim().to_uppercase()).copied()
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.get(currency).is_some()
    }

    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn unavailable(&self) -> &[String] {
        &self.unavailable
    }
}

/// A source of complete rate tables.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable, FxError>;
}

/// A source for the price of a single extra asset, quoted in the base currency.
#[async_trait]
pub trait AssetPriceProvider: Send + Sync {
    /// Code the asset is listed under in a rate table, e.g. `BTC`.
    fn symbol(&self) -> &str;

    /// Price of one unit of the asset in the base currency.
    async fn fetch_price(&self) -> Result<f64, FxError>;
}

/// Shared access to the current rate table, as seen by the interaction layer.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// The current table, fetched if nothing usable is held.
    async fn rates(&self) -> Result<Arc<RateTable>, FxError>;

    /// Forces a new fetch. On failure the previously held table stays in place.
    async fn refresh(&self) -> Result<Arc<RateTable>, FxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_contains_base() {
        let table = RateTable::new("eur", None);
        assert_eq!(table.base(), "EUR");
        assert_eq!(table.get("EUR"), Some(1.0));
        assert_eq!(table.currencies().count(), 1);
    }

    #[test]
    fn test_insert_normalizes_codes() {
        let mut table = RateTable::new(BASE_CURRENCY, None);
        table.insert(" usd ", 1.1).unwrap();
        assert_eq!(table.get("USD"), Some(1.1));
        assert_eq!(table.get("usd"), Some(1.1));
        assert!(table.contains("Usd"));
    }

    #[test]
    fn test_insert_rejects_invalid_rates() {
        let mut table = RateTable::new(BASE_CURRENCY, None);
        for rate in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let err = table.insert("USD", rate).unwrap_err();
            assert!(matches!(err, FxError::InvalidRate { .. }));
        }
        assert!(!table.contains("USD"));
    }

    #[test]
    fn test_base_rate_cannot_be_overwritten() {
        let mut table = RateTable::new(BASE_CURRENCY, None);
        table.insert("EUR", 2.0).unwrap();
        assert_eq!(table.get("EUR"), Some(1.0));
    }

    #[test]
    fn test_mark_unavailable_is_deduplicated() {
        let mut table = RateTable::new(BASE_CURRENCY, None);
        table.mark_unavailable("btc");
        table.mark_unavailable("BTC");
        assert_eq!(table.unavailable(), &["BTC".to_string()]);
        assert!(!table.contains("BTC"));
    }
}
