//! Historical price series for charting

use async_trait::async_trait;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[async_trait]
pub trait HistoryFetcher: Send + Sync {
    /// Daily closes for one year of `base` priced in `target`, oldest first.
    /// Returns an empty series when nothing could be fetched.
    async fn fetch_history(&self, base: &str, target: &str) -> Vec<PricePoint>;
}

/// Summary figures shown alongside a history chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySummary {
    pub first: PricePoint,
    pub last: PricePoint,
    pub min: f64,
    pub max: f64,
    pub change_pct: f64,
}

pub fn summarize(points: &[PricePoint]) -> Option<HistorySummary> {
    let first = *points.first()?;
    let last = *points.last()?;
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.close), hi.max(p.close))
        });
    let change_pct = if first.close > 0.0 {
        ((last.close - first.close) / first.close) * 100.0
    } else {
        0.0
    };
    Some(HistorySummary {
        first,
        last,
        min,
        max,
        change_pct,
    })
}

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders the series as a one-line chart at most `width` characters wide.
///
/// Points are averaged into `width` buckets when the series is longer.
pub fn sparkline(points: &[PricePoint], width: usize) -> String {
    if points.is_empty() || width == 0 {
        return String::new();
    }

    let buckets: Vec<f64> = if points.len() <= width {
        points.iter().map(|p| p.close).collect()
    } else {
        (0..width)
            .map(|i| {
                let start = i * points.len() / width;
                let end = ((i + 1) * points.len() / width).max(start + 1);
                let slice = &points[start..end];
                slice.iter().map(|p| p.close).sum::<f64>() / slice.len() as f64
            })
            .collect()
    };

    let min = buckets.iter().copied().fold(f64::INFINITY, f64::min);
    let max = buckets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    buckets
        .iter()
        .map(|value| {
            if span <= f64::EPSILON {
                SPARK_BARS[SPARK_BARS.len() / 2]
            } else {
                let idx = (((value - min) / span) * (SPARK_BARS.len() - 1) as f64).round();
                SPARK_BARS[idx as usize]
            }
        })
        .collect()
}
