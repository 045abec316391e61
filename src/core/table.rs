//! Date-aligned price table and the missing-data policy used to build it.

use crate::core::error::IndexError;
use crate::core::price::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// How gaps are handled when series disagree on trading dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDataPolicy {
    /// Carry the last known price forward. Leading rows with nothing to carry
    /// are dropped.
    #[default]
    ForwardFill,
    /// Keep only dates on which every symbol traded.
    Drop,
    /// Any gap is an error.
    Fail,
}

/// Ascending date index with one gap-free price column per symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl PriceTable {
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: BTreeMap<String, Vec<f64>>,
    ) -> Result<Self, IndexError> {
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(IndexError::Alignment(
                "Dates must be strictly increasing".to_string(),
            ));
        }
        if let Some((symbol, column)) = columns.iter().find(|(_, c)| c.len() != dates.len()) {
            return Err(IndexError::Alignment(format!(
                "Column {symbol} has {} rows, expected {}",
                column.len(),
                dates.len()
            )));
        }
        Ok(PriceTable { dates, columns })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, symbol: &str) -> Result<&[f64], IndexError> {
        self.columns
            .get(symbol)
            .map(Vec::as_slice)
            .ok_or_else(|| IndexError::Alignment(format!("No price column for {symbol}")))
    }
}

/// Merges per-symbol series on the union of their dates.
pub fn align(series: &[PriceSeries], policy: MissingDataPolicy) -> Result<PriceTable, IndexError> {
    if series.is_empty() {
        return Err(IndexError::Alignment("No series to align".to_string()));
    }
    if let Some(empty) = series.iter().find(|s| s.is_empty()) {
        return Err(IndexError::Alignment(format!(
            "Series for {} has no observations",
            empty.symbol
        )));
    }

    let all_dates: Vec<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(date, _)| *date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // Sparse view: one Option per union date per symbol
    let sparse: Vec<(&str, Vec<Option<f64>>)> = series
        .iter()
        .map(|s| {
            let by_date: BTreeMap<NaiveDate, f64> = s.points.iter().copied().collect();
            let values = all_dates.iter().map(|d| by_date.get(d).copied()).collect();
            (s.symbol.as_str(), values)
        })
        .collect();

    let mut dates = Vec::with_capacity(all_dates.len());
    let mut columns: BTreeMap<String, Vec<f64>> = sparse
        .iter()
        .map(|(symbol, _)| (symbol.to_string(), Vec::with_capacity(all_dates.len())))
        .collect();
    let mut last_seen: Vec<Option<f64>> = vec![None; sparse.len()];
    let mut dropped = 0usize;

    for (row, date) in all_dates.iter().enumerate() {
        let mut values = Vec::with_capacity(sparse.len());
        for (col, (symbol, column)) in sparse.iter().enumerate() {
            let value = match (column[row], policy) {
                (Some(v), _) => {
                    last_seen[col] = Some(v);
                    Some(v)
                }
                (None, MissingDataPolicy::ForwardFill) => last_seen[col],
                (None, MissingDataPolicy::Drop) => None,
                (None, MissingDataPolicy::Fail) => {
                    return Err(IndexError::Alignment(format!(
                        "Missing price for {symbol} on {date}"
                    )));
                }
            };
            values.push(value);
        }

        if values.iter().any(Option::is_none) {
            dropped += 1;
            continue;
        }

        dates.push(*date);
        for ((symbol, _), value) in sparse.iter().zip(values) {
            if let (Some(column), Some(v)) = (columns.get_mut(*symbol), value) {
                column.push(v);
            }
        }
    }

    debug!(
        rows = dates.len(),
        dropped,
        ?policy,
        "Aligned {} series",
        series.len()
    );

    if dates.is_empty() {
        return Err(IndexError::Alignment(
            "No dates left after aligning price series".to_string(),
        ));
    }

    PriceTable::new(dates, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
    }

    fn gapped_series() -> Vec<PriceSeries> {
        vec![
            // A trades every day
            PriceSeries::from_points("A", vec![(d(16), 10.0), (d(17), 11.0), (d(18), 12.0)]),
            // B starts late and misses the 18th
            PriceSeries::from_points("B", vec![(d(17), 20.0), (d(21), 22.0)]),
        ]
    }

    #[test]
    fn test_forward_fill_carries_last_price() {
        let table = align(&gapped_series(), MissingDataPolicy::ForwardFill).unwrap();
        // 16th dropped: B has no earlier price to carry
        assert_eq!(table.dates(), &[d(17), d(18), d(21)]);
        assert_eq!(table.column("A").unwrap(), &[11.0, 12.0, 12.0]);
        assert_eq!(table.column("B").unwrap(), &[20.0, 20.0, 22.0]);
    }

    #[test]
    fn test_drop_keeps_common_dates() {
        let table = align(&gapped_series(), MissingDataPolicy::Drop).unwrap();
        assert_eq!(table.dates(), &[d(17)]);
        assert_eq!(table.column("A").unwrap(), &[11.0]);
        assert_eq!(table.column("B").unwrap(), &[20.0]);
    }

    #[test]
    fn test_fail_reports_first_gap() {
        let err = align(&gapped_series(), MissingDataPolicy::Fail).unwrap_err();
        assert!(matches!(err, IndexError::Alignment(_)));
        assert_eq!(
            err.to_string(),
            "Alignment error: Missing price for B on 2025-04-16"
        );
    }

    #[test]
    fn test_aligned_input_is_unchanged_under_every_policy() {
        let series = vec![
            PriceSeries::from_points("A", vec![(d(16), 1.0), (d(17), 2.0)]),
            PriceSeries::from_points("B", vec![(d(16), 3.0), (d(17), 4.0)]),
        ];
        for policy in [
            MissingDataPolicy::ForwardFill,
            MissingDataPolicy::Drop,
            MissingDataPolicy::Fail,
        ] {
            let table = align(&series, policy).unwrap();
            assert_eq!(table.dates(), &[d(16), d(17)]);
            assert_eq!(table.column("B").unwrap(), &[3.0, 4.0]);
        }
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let series = vec![
            PriceSeries::from_points("A", vec![(d(16), 1.0)]),
            PriceSeries::from_points("B", vec![]),
        ];
        let err = align(&series, MissingDataPolicy::ForwardFill).unwrap_err();
        assert!(err.to_string().contains("Series for B has no observations"));
    }

    #[test]
    fn test_disjoint_series_under_drop_is_rejected() {
        let series = vec![
            PriceSeries::from_points("A", vec![(d(16), 1.0)]),
            PriceSeries::from_points("B", vec![(d(17), 1.0)]),
        ];
        assert!(matches!(
            align(&series, MissingDataPolicy::Drop),
            Err(IndexError::Alignment(_))
        ));
    }

    #[test]
    fn test_missing_column_lookup() {
        let table = align(&gapped_series(), MissingDataPolicy::ForwardFill).unwrap();
        assert_eq!(table.column("A").unwrap().len(), table.len());
        assert_eq!(table.column("B").unwrap().len(), table.len());
        assert!(table.column("C").is_err());
    }

    #[test]
    fn test_new_rejects_mismatched_columns() {
        let columns = BTreeMap::from([("A".to_string(), vec![1.0])]);
        assert!(PriceTable::new(vec![d(16), d(17)], columns).is_err());
        assert!(PriceTable::new(vec![d(17), d(16)], BTreeMap::new()).is_err());
    }
}
