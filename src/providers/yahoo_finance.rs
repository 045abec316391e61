use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::price::{HistoryProvider, PriceSeries};

fn to_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Maps bar timestamps to exchange-local dates and pairs them with prices.
/// Null prices are gaps and are skipped.
fn extract_points(
    timestamps: &[i64],
    prices: &[Option<f64>],
    gmt_offset: i64,
) -> Vec<(NaiveDate, f64)> {
    timestamps
        .iter()
        .zip(prices)
        .filter_map(|(ts, price)| {
            let price = (*price)?;
            let date = DateTime::from_timestamp(ts + gmt_offset, 0)?.date_naive();
            Some((date, price))
        })
        .collect()
}

// YahooHistoryProvider implementation for HistoryProvider
pub struct YahooHistoryProvider {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl YahooHistoryProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("sidx/1.0")
            .timeout(timeout)
            .build()?;
        Ok(YahooHistoryProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    fn request_error(&self, e: reqwest::Error, symbol: &str, url: &str) -> anyhow::Error {
        if e.is_timeout() {
            anyhow!(
                "Request timed out after {:?} for symbol: {}",
                self.timeout,
                symbol
            )
        } else {
            anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url)
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    currency: Option<String>,
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

impl ChartItem {
    /// Adjusted closes when present, plain closes otherwise.
    fn prices(&self) -> Option<&[Option<f64>]> {
        let indicators = self.indicators.as_ref()?;
        indicators
            .adjclose
            .as_ref()
            .and_then(|a| a.first())
            .and_then(|a| a.adjclose.as_deref())
            .or_else(|| {
                debug!("No adjusted close, falling back to close");
                indicators.quote.first().and_then(|q| q.close.as_deref())
            })
    }
}

#[async_trait]
impl HistoryProvider for YahooHistoryProvider {
    #[instrument(
        name = "YahooHistoryFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplit&includeAdjustedClose=true",
            self.base_url,
            symbol,
            to_timestamp(start),
            to_timestamp(end)
        );
        debug!("Requesting price history from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(e, symbol, &url))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.request_error(e, symbol, &url))?;

        let data: YahooChartResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                return Err(anyhow!("HTTP error: {} for symbol: {}", status, symbol));
            }
            Err(e) => {
                return Err(anyhow!("Failed to parse JSON response for {}: {}", symbol, e));
            }
        };

        if let Some(err) = data.chart.error {
            return Err(anyhow!(
                "Provider error {}: {} for symbol: {}",
                err.code,
                err.description,
                symbol
            ));
        }
        if !status.is_success() {
            return Err(anyhow!("HTTP error: {} for symbol: {}", status, symbol));
        }

        let item = data
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))?;

        let points = match (item.timestamp.as_deref(), item.prices()) {
            (Some(timestamps), Some(prices)) => {
                extract_points(timestamps, prices, item.meta.gmtoffset)
            }
            _ => Vec::new(),
        };

        // Keep the requested [start, end) window only
        let points = points
            .into_iter()
            .filter(|(date, _)| *date >= start && *date < end)
            .collect();

        let series = PriceSeries::from_points(symbol, points);
        debug!(
            currency = ?item.meta.currency,
            points = series.points.len(),
            "Received Yahoo history"
        );
        Ok(series)
    }
}
