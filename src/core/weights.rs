//! End-of-period weights after price drift.

use crate::core::basket::{Basket, CASH};
use crate::core::error::IndexError;
use crate::core::table::PriceTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which row supplies the start price of each asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPricePolicy {
    /// First price dated on or after the start date.
    #[default]
    FirstOnOrAfter,
    /// Price on exactly the start date; fails on non-trading days.
    Exact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightRow {
    pub asset: String,
    /// Fractions in [0, 1] unless leveraged.
    pub initial: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Basket assets in configured order, cash last.
    pub rows: Vec<WeightRow>,
}

impl Reconciliation {
    #[cfg(test)]
    pub fn get(&self, asset: &str) -> Option<&WeightRow> {
        self.rows.iter().find(|row| row.asset == asset)
    }
}

/// Locates the row index holding the start price.
pub fn start_row(
    dates: &[NaiveDate],
    start: NaiveDate,
    policy: StartPricePolicy,
) -> Result<usize, IndexError> {
    let found = match policy {
        StartPricePolicy::FirstOnOrAfter => dates.iter().position(|d| *d >= start),
        StartPricePolicy::Exact => dates.iter().position(|d| *d == start),
    };
    found.ok_or_else(|| match policy {
        StartPricePolicy::FirstOnOrAfter => {
            IndexError::Alignment(format!("No prices on or after {start}"))
        }
        StartPricePolicy::Exact => {
            IndexError::Alignment(format!("No prices on start date {start}"))
        }
    })
}

pub fn reconcile(
    euro: &PriceTable,
    basket: &Basket,
    start: NaiveDate,
    policy: StartPricePolicy,
) -> Result<Reconciliation, IndexError> {
    let start_idx = start_row(euro.dates(), start, policy)?;
    let end_idx = euro.len() - 1;
    debug!(
        start = %euro.dates()[start_idx],
        end = %euro.dates()[end_idx],
        "Reconciling weights"
    );

    let mut values = Vec::with_capacity(basket.assets().len() + 1);
    for asset in basket.assets() {
        let prices = euro.column(&asset.symbol)?;
        let (start_price, end_price) = (prices[start_idx], prices[end_idx]);
        if start_price == 0.0 {
            return Err(IndexError::Computation(format!(
                "Start price of {} is zero",
                asset.symbol
            )));
        }
        values.push((
            asset.symbol.clone(),
            asset.initial_fraction(),
            asset.initial_fraction() * (end_price / start_price),
        ));
    }
    values.push((CASH.to_string(), basket.cash_fraction(), basket.cash_fraction()));

    let total: f64 = values.iter().map(|(_, _, v)| v).sum();
    if total == 0.0 {
        return Err(IndexError::Computation(
            "Total final portfolio value is zero".to_string(),
        ));
    }

    let rows = values
        .into_iter()
        .map(|(asset, initial, value)| WeightRow {
            asset,
            initial,
            end: value / total,
        })
        .collect();

    Ok(Reconciliation { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{BasketEntry, FxConfig};
    use std::collections::BTreeMap;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
    }

    fn basket() -> Basket {
        let entries = [
            BasketEntry {
                symbol: "A".to_string(),
                weight: 7.5,
                fx: None,
            },
            BasketEntry {
                symbol: "B".to_string(),
                weight: 5.6,
                fx: None,
            },
        ];
        Basket::new(&entries, 75.0, &FxConfig::default(), false).unwrap()
    }

    fn table(a: Vec<f64>, b: Vec<f64>) -> PriceTable {
        // 19th and 20th are a weekend
        PriceTable::new(
            vec![d(17), d(18), d(21)],
            BTreeMap::from([("A".to_string(), a), ("B".to_string(), b)]),
        )
        .unwrap()
    }

    #[test]
    fn test_final_fractions_sum_to_one() {
        let euro = table(vec![10.0, 12.0, 13.0], vec![50.0, 40.0, 45.0]);
        let result = reconcile(&euro, &basket(), d(17), StartPricePolicy::FirstOnOrAfter).unwrap();
        let total: f64 = result.rows.iter().map(|r| r.end).sum();
        assert!((total - 1.0).abs() < 1e-9);
        let initial: f64 = result.rows.iter().map(|r| r.initial).sum();
        assert!((initial - 1.0).abs() < 1e-9);
        assert_eq!(result.rows.last().unwrap().asset, CASH);
    }

    #[test]
    fn test_unchanged_prices_keep_initial_weights() {
        let euro = table(vec![10.0, 12.0, 10.0], vec![50.0, 40.0, 50.0]);
        let result = reconcile(&euro, &basket(), d(17), StartPricePolicy::FirstOnOrAfter).unwrap();
        for row in &result.rows {
            assert!(
                (row.end - row.initial).abs() < 1e-12,
                "{} drifted from {} to {}",
                row.asset,
                row.initial,
                row.end
            );
        }
    }

    #[test]
    fn test_drift_reweights_assets() {
        let euro = table(vec![10.0, 10.0, 20.0], vec![50.0, 50.0, 50.0]);
        let result = reconcile(&euro, &basket(), d(17), StartPricePolicy::FirstOnOrAfter).unwrap();

        let a = 0.10;
        let b = 5.6 / 75.0;
        let cash = 1.0 - a - b;
        let total = 2.0 * a + b + cash;
        assert!((result.get("A").unwrap().end - 2.0 * a / total).abs() < 1e-12);
        assert!((result.get("B").unwrap().end - b / total).abs() < 1e-12);
        assert!((result.get(CASH).unwrap().end - cash / total).abs() < 1e-12);
    }

    #[test]
    fn test_non_trading_start_date() {
        let euro = table(vec![10.0, 12.0, 13.0], vec![50.0, 40.0, 45.0]);

        // Saturday start picks Monday's prices
        let result = reconcile(&euro, &basket(), d(19), StartPricePolicy::FirstOnOrAfter).unwrap();
        let a = result.get("A").unwrap();
        assert!(a.end > 0.0);
        assert_eq!(start_row(euro.dates(), d(19), StartPricePolicy::FirstOnOrAfter).unwrap(), 2);

        let err = reconcile(&euro, &basket(), d(19), StartPricePolicy::Exact).unwrap_err();
        assert!(matches!(err, IndexError::Alignment(_)));
        assert_eq!(
            err.to_string(),
            "Alignment error: No prices on start date 2025-04-19"
        );
    }

    #[test]
    fn test_start_after_last_date() {
        let euro = table(vec![10.0, 12.0, 13.0], vec![50.0, 40.0, 45.0]);
        assert!(reconcile(&euro, &basket(), d(22), StartPricePolicy::FirstOnOrAfter).is_err());
    }

    #[test]
    fn test_zero_start_price() {
        let euro = table(vec![0.0, 12.0, 13.0], vec![50.0, 40.0, 45.0]);
        let err = reconcile(&euro, &basket(), d(17), StartPricePolicy::Exact).unwrap_err();
        assert!(matches!(err, IndexError::Computation(_)));
    }
}
