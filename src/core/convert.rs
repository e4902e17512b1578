//! Currency conversion through the base currency

use crate::core::error::FxError;
use crate::core::rates::RateTable;

/// A single amount to move from one currency into another.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub source: String,
    pub target: String,
}

impl ConversionRequest {
    pub fn new(amount: f64, source: &str, target: &str) -> Self {
        ConversionRequest {
            amount,
            source: source.trim().to_uppercase(),
            target: target.trim().to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub request: ConversionRequest,
    pub value: f64,
}

/// Converts `amount` between two base-relative rates.
///
/// Dividing by the source rate yields the amount in the base currency,
/// multiplying by the target rate converts out of it.
pub fn convert(amount: f64, source_rate: f64, target_rate: f64) -> Result<f64, FxError> {
    for (side, rate) in [("source", source_rate), ("target", target_rate)] {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(FxError::InvalidRate {
                currency: side.to_string(),
                rate,
            });
        }
    }
    let value = (amount / source_rate) * target_rate;
    if !value.is_finite() {
        return Err(FxError::InvalidAmount(amount));
    }
    Ok(value)
}

/// Looks up both currencies in `table` and converts the request amount.
///
/// Identical source and target return the amount untouched.
pub fn convert_with(table: &RateTable, request: &ConversionRequest) -> Result<Conversion, FxError> {
    if !request.amount.is_finite() || request.amount < 0.0 {
        return Err(FxError::InvalidAmount(request.amount));
    }

    let source_rate = lookup(table, &request.source)?;
    let target_rate = lookup(table, &request.target)?;

    let value = if request.source == request.target {
        request.amount
    } else {
        convert(request.amount, source_rate, target_rate)?
    };

    Ok(Conversion {
        request: request.clone(),
        value,
    })
}

fn lookup(table: &RateTable, currency: &str) -> Result<f64, FxError> {
    let rate = table
        .get(currency)
        .ok_or_else(|| FxError::UnsupportedCurrency(currency.to_string()))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(FxError::InvalidRate {
            currency: currency.to_string(),
            rate,
        });
    }
    Ok(rate)
}

/// Formats a converted amount at display precision.
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::BASE_CURRENCY;

    fn sample_table() -> RateTable {
        let mut table = RateTable::new(BASE_CURRENCY, None);
        table.insert("USD", 1.1).unwrap();
        table.insert("JPY", 160.0).unwrap();
        table.insert("GBP", 0.85).unwrap();
        table.insert("CHF", 0.9437).unwrap();
        table
    }

    #[test]
    fn test_usd_to_jpy() {
        let table = sample_table();
        let result = convert_with(&table, &ConversionRequest::new(100.0, "USD", "JPY")).unwrap();
        assert!((result.value - (100.0 / 1.1) * 160.0).abs() < 1e-9);
        assert_eq!(format_amount(result.value), "14545.45");
    }

    #[test]
    fn test_identity_is_exact() {
        let table = sample_table();
        for code in table.currencies() {
            for amount in [0.0, 0.1, 50.0, 123456.789, 1e-7] {
                let result =
                    convert_with(&table, &ConversionRequest::new(amount, code, code)).unwrap();
                assert_eq!(result.value, amount);
            }
        }

        let result = convert_with(&table, &ConversionRequest::new(50.0, "EUR", "EUR")).unwrap();
        assert_eq!(format_amount(result.value), "50.00");
    }

    #[test]
    fn test_conversion_is_transitive_through_base() {
        let table = sample_table();
        let codes: Vec<&str> = table.currencies().collect();
        let amount = 987.65;

        for a in &codes {
            for b in &codes {
                for c in &codes {
                    let ra = table.get(a).unwrap();
                    let rb = table.get(b).unwrap();
                    let rc = table.get(c).unwrap();
                    let via_b = convert(convert(amount, ra, rb).unwrap(), rb, rc).unwrap();
                    let direct = convert(amount, ra, rc).unwrap();
                    assert!(
                        (via_b - direct).abs() <= direct.abs() * 1e-12,
                        "{a}->{b}->{c}: {via_b} vs {direct}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_invalid_rates_are_rejected() {
        assert!(matches!(
            convert(10.0, 0.0, 1.0),
            Err(FxError::InvalidRate { .. })
        ));
        assert!(matches!(
            convert(10.0, 1.0, 0.0),
            Err(FxError::InvalidRate { .. })
        ));
        assert!(matches!(
            convert(10.0, -1.1, 1.0),
            Err(FxError::InvalidRate { .. })
        ));
        assert!(matches!(
            convert(10.0, 1.0, -3.0),
            Err(FxError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_unsupported_currency() {
        let table = sample_table();
        let err = convert_with(&table, &ConversionRequest::new(1.0, "USD", "XYZ")).unwrap_err();
        assert_eq!(err, FxError::UnsupportedCurrency("XYZ".to_string()));

        let err = convert_with(&table, &ConversionRequest::new(1.0, "ABC", "ABC")).unwrap_err();
        assert_eq!(err, FxError::UnsupportedCurrency("ABC".to_string()));
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let table = sample_table();
        let err = convert_with(&table, &ConversionRequest::new(-5.0, "USD", "GBP")).unwrap_err();
        assert_eq!(err, FxError::InvalidAmount(-5.0));
    }

    #[test]
    fn test_non_finite_amount_is_rejected() {
        let table = sample_table();
        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err =
                convert_with(&table, &ConversionRequest::new(amount, "USD", "GBP")).unwrap_err();
            assert!(matches!(err, FxError::InvalidAmount(_)), "{amount}: {err}");
        }
        // Rejected before the identity shortcut too.
        let err = convert_with(&table, &ConversionRequest::new(f64::NAN, "EUR", "EUR")).unwrap_err();
        assert!(matches!(err, FxError::InvalidAmount(_)));
    }

    #[test]
    fn test_overflowing_result_is_rejected() {
        let mut table = sample_table();
        table.insert("BTC", 1.0 / 50000.0).unwrap();

        let err = convert_with(&table, &ConversionRequest::new(1e305, "BTC", "EUR")).unwrap_err();
        assert_eq!(err, FxError::InvalidAmount(1e305));
        assert_eq!(convert(f64::MAX, 0.5, 1.0), Err(FxError::InvalidAmount(f64::MAX)));

        let result = convert_with(&table, &ConversionRequest::new(1e300, "EUR", "BTC")).unwrap();
        assert!(result.value.is_finite());
    }

    #[test]
    fn test_request_normalizes_codes() {
        let request = ConversionRequest::new(1.0, " usd", "jpy ");
        assert_eq!(request.source, "USD");
        assert_eq!(request.target, "JPY");
    }
}
