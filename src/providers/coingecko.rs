use crate::core::error::FxError;
use crate::core::rates::{AssetPriceProvider, BASE_CURRENCY};
use crate::providers::util::{get_text, http_client};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

const SOURCE: &str = "CoinGecko price";

/// Spot price of one crypto asset in the base currency from the CoinGecko
/// simple price API.
pub struct CoinGeckoProvider {
    base_url: String,
    asset_id: String,
    symbol: String,
    timeout: Duration,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, asset_id: &str, symbol: &str, timeout: Duration) -> Self {
        CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            asset_id: asset_id.to_string(),
            symbol: symbol.to_uppercase(),
            timeout,
        }
    }
}

// {"bitcoin": {"eur": 61234.5}}
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

#[async_trait]
impl AssetPriceProvider for CoinGeckoProvider {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    #[instrument(name = "CoinGeckoPriceFetch", skip(self), fields(asset = %self.asset_id))]
    async fn fetch_price(&self) -> Result<f64, FxError> {
        let vs_currency = BASE_CURRENCY.to_lowercase();
        let url = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies={}",
            self.base_url, self.asset_id, vs_currency
        );
        let client = http_client(self.timeout)?;
        let body = get_text(&client, &url, SOURCE).await?;

        let data: SimplePriceResponse = serde_json::from_str(&body).map_err(|e| {
            FxError::parse(SOURCE, format!("invalid JSON for {}: {e}", self.asset_id))
        })?;

        let price = data
            .get(&self.asset_id)
            .and_then(|quotes| quotes.get(&vs_currency))
            .copied()
            .ok_or_else(|| {
                FxError::parse(
                    SOURCE,
                    format!("no {} price for {}", vs_currency, self.asset_id),
                )
            })?;

        if !price.is_finite() || price <= 0.0 {
            return Err(FxError::InvalidRate {
                currency: self.symbol.clone(),
                rate: price,
            });
        }

        debug!("Fetched {} price: {}", self.symbol, price);
        Ok(price)
    }
}
