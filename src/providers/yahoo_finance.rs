use crate::core::error::FxError;
use crate::core::history::{HistoryFetcher, PricePoint};
use crate::providers::util::{get_text, http_client};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const SOURCE: &str = "Yahoo Finance history";

/// One year of daily closes for a currency pair from the Yahoo Finance chart API.
pub struct YahooHistoryProvider {
    base_url: String,
    timeout: Duration,
    crypto_symbols: Vec<String>,
}

impl YahooHistoryProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        YahooHistoryProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            crypto_symbols: Vec::new(),
        }
    }

    /// Codes that Yahoo lists as crypto pairs (`BTC-EUR`) rather than FX pairs.
    pub fn with_crypto_symbols(mut self, symbols: &[&str]) -> Self {
        self.crypto_symbols = symbols.iter().map(|s| s.to_uppercase()).collect();
        self
    }

    /// Yahoo symbol for a pair, and whether its closes must be inverted.
    ///
    /// Crypto pairs are only listed with the crypto asset first (`BTC-EUR`),
    /// so a fiat to crypto pair is fetched the other way round.
    pub fn chart_symbol(&self, base: &str, target: &str) -> (String, bool) {
        let base = base.trim().to_uppercase();
        let target = target.trim().to_uppercase();
        if self.crypto_symbols.contains(&base) {
            (format!("{base}-{target}"), false)
        } else if self.crypto_symbols.contains(&target) {
            (format!("{target}-{base}"), true)
        } else {
            (format!("{base}{target}=X"), false)
        }
    }

    async fn fetch_series(&self, symbol: &str) -> Result<Vec<PricePoint>, FxError> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1y",
            self.base_url, symbol
        );
        let client = http_client(self.timeout)?;
        let body = get_text(&client, &url, SOURCE).await?;

        let data: YahooChartResponse = serde_json::from_str(&body).map_err(|e| {
            FxError::parse(SOURCE, format!("invalid JSON response for {symbol}: {e}"))
        })?;

        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| FxError::parse(SOURCE, format!("no chart data for {symbol}")))?;

        Ok(extract_points(&item))
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Vec<ChartItem>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

fn extract_points(item: &ChartItem) -> Vec<PricePoint> {
    let (Some(timestamps), Some(closes)) = (
        item.timestamp.as_ref(),
        item.indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref()),
    ) else {
        return Vec::new();
    };

    timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            let close = (*close)?;
            if !close.is_finite() || close <= 0.0 {
                return None;
            }
            let date = DateTime::from_timestamp(*ts, 0)?.date_naive();
            Some(PricePoint { date, close })
        })
        .collect()
}

fn invert_points(points: Vec<PricePoint>) -> Vec<PricePoint> {
    points
        .into_iter()
        .map(|p| PricePoint {
            date: p.date,
            close: 1.0 / p.close,
        })
        .collect()
}

#[async_trait]
impl HistoryFetcher for YahooHistoryProvider {
    #[instrument(name = "YahooHistoryFetch", skip(self))]
    async fn fetch_history(&self, base: &str, target: &str) -> Vec<PricePoint> {
        let (symbol, inverted) = self.chart_symbol(base, target);
        match self.fetch_series(&symbol).await {
            Ok(points) => {
                debug!("Fetched {} history points for {}", points.len(), symbol);
                if inverted {
                    invert_points(points)
                } else {
                    points
                }
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "History unavailable");
                Vec::new()
            }
        }
    }
}
