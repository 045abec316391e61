//! Runs the index pipeline: fetch, align, convert, compound, reconcile.
use crate::core::basket::Basket;
use crate::core::config::IndexConfig;
use crate::core::currency::to_euro;
use crate::core::error::IndexError;
use crate::core::index::{IndexSeries, build_index};
use crate::core::price::{HistoryProvider, PriceSeries};
use crate::core::table::align;
use crate::core::weights::{Reconciliation, reconcile};
use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, info};

/// Everything the presenter needs from one run.
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub index: IndexSeries,
    pub weights: Reconciliation,
}

impl IndexReport {
    /// Initial and final weights in percent, cash last.
    pub fn weight_rows(&self) -> impl Iterator<Item = (&str, f64, f64)> {
        self.weights
            .rows
            .iter()
            .map(|row| (row.asset.as_str(), row.initial * 100.0, row.end * 100.0))
    }
}

/// Fetches every required symbol as one batch. Any failure fails the batch,
/// listing every symbol that could not be fetched.
pub async fn fetch_all(
    provider: &(dyn HistoryProvider + Send + Sync),
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
    on_fetched: &(dyn Fn() + Sync),
) -> Result<Vec<PriceSeries>, IndexError> {
    let futures = symbols.iter().map(|symbol| async move {
        let result = provider.fetch_history(symbol, start, end).await;
        on_fetched();
        (symbol, result)
    });

    let mut series = Vec::with_capacity(symbols.len());
    let mut failed = Vec::new();
    let mut reasons = Vec::new();
    for (symbol, result) in join_all(futures).await {
        match result {
            Ok(s) if s.is_empty() => {
                failed.push(symbol.clone());
                reasons.push(format!("{symbol}: no prices in range"));
            }
            Ok(s) => series.push(s),
            Err(e) => {
                debug!("Fetch failed for {}: {}", symbol, e);
                failed.push(symbol.clone());
                reasons.push(format!("{symbol}: {e}"));
            }
        }
    }

    if !failed.is_empty() {
        return Err(IndexError::DataFetch {
            symbols: failed,
            reason: reasons.join("; "),
        });
    }
    Ok(series)
}

/// Pure part of the pipeline, from fetched series to the report.
pub fn build_report(
    config: &IndexConfig,
    basket: &Basket,
    series: &[PriceSeries],
    end: NaiveDate,
) -> Result<IndexReport, IndexError> {
    let table = align(series, config.missing_data)?;
    let euro = to_euro(&table, basket)?;
    let index = build_index(&euro, basket)?;
    let weights = reconcile(&euro, basket, config.start_date, config.start_price_policy)?;

    Ok(IndexReport {
        title: config.title.clone(),
        start: config.start_date,
        end,
        index,
        weights,
    })
}

pub async fn compute(
    config: &IndexConfig,
    provider: &(dyn HistoryProvider + Send + Sync),
    end: NaiveDate,
    on_fetched: &(dyn Fn() + Sync),
) -> Result<IndexReport, IndexError> {
    if config.start_date >= end {
        return Err(IndexError::InvalidConfig(format!(
            "Start date {} must be before end date {end}",
            config.start_date
        )));
    }

    let basket = Basket::from_config(config)?;
    let symbols = basket.required_symbols();
    info!(
        "Fetching {} symbols from {} to {}",
        symbols.len(),
        config.start_date,
        end
    );

    let series = fetch_all(provider, &symbols, config.start_date, end, on_fetched).await?;
    let report = build_report(config, &basket, &series, end)?;
    info!(
        rows = report.index.dates.len(),
        change = ?report.index.total_change_pct(),
        "Index computed"
    );
    Ok(report)
}
