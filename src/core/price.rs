//! Price history abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Daily adjusted close prices of one symbol, dates strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
    /// Builds a series from unordered observations. Later duplicates of a date
    /// replace earlier ones.
    pub fn from_points(symbol: &str, mut points: Vec<(NaiveDate, f64)>) -> Self {
        points.sort_by_key(|(date, _)| *date);
        let mut deduped: Vec<(NaiveDate, f64)> = Vec::with_capacity(points.len());
        for (date, price) in points {
            match deduped.last_mut() {
                Some(last) if last.0 == date => last.1 = price,
                _ => deduped.push((date, price)),
            }
        }

        PriceSeries {
            symbol: symbol.to_string(),
            points: deduped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetches daily prices in `[start, end)`.
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries>;
}
