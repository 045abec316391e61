//! Daily returns and the compounded index level.

use crate::core::basket::Basket;
use crate::core::error::IndexError;
use crate::core::table::PriceTable;
use chrono::NaiveDate;

pub const BASE_LEVEL: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSeries {
    pub dates: Vec<NaiveDate>,
    /// Weighted basket return per date, first entry 0.
    pub returns: Vec<f64>,
    pub levels: Vec<f64>,
}

impl IndexSeries {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Percent change of the level between the first and last dates.
    pub fn total_change_pct(&self) -> Option<f64> {
        match (self.levels.first(), self.levels.last()) {
            (Some(first), Some(last)) if *first != 0.0 => Some((last / first - 1.0) * 100.0),
            _ => None,
        }
    }
}

/// Simple day-over-day returns; the first observation has no baseline and
/// returns 0.
pub fn daily_returns(symbol: &str, prices: &[f64]) -> Result<Vec<f64>, IndexError> {
    let mut returns = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return Ok(returns);
    }

    returns.push(0.0);
    for (i, pair) in prices.windows(2).enumerate() {
        let (prev, curr) = (pair[0], pair[1]);
        if prev == 0.0 {
            return Err(IndexError::Computation(format!(
                "{symbol} price is zero at row {i}, cannot compute return"
            )));
        }
        returns.push(curr / prev - 1.0);
    }
    Ok(returns)
}

/// `base × Π(1 + r)` for every prefix of `returns`.
pub fn compound(returns: &[f64], base: f64) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |growth, r| {
            *growth *= 1.0 + r;
            Some(*growth * base)
        })
        .collect()
}

/// Weighted sum of asset returns per date using initial fractions. Cash earns
/// nothing and does not contribute.
pub fn index_returns(euro: &PriceTable, basket: &Basket) -> Result<Vec<f64>, IndexError> {
    let mut total = vec![0.0; euro.len()];
    for asset in basket.assets() {
        let returns = daily_returns(&asset.symbol, euro.column(&asset.symbol)?)?;
        let fraction = asset.initial_fraction();
        for (acc, r) in total.iter_mut().zip(returns) {
            *acc += fraction * r;
        }
    }
    Ok(total)
}

pub fn build_index(euro: &PriceTable, basket: &Basket) -> Result<IndexSeries, IndexError> {
    if euro.is_empty() {
        return Err(IndexError::Alignment(
            "Cannot build an index from an empty price table".to_string(),
        ));
    }

    let returns = index_returns(euro, basket)?;
    let levels = compound(&returns, BASE_LEVEL);

    Ok(IndexSeries {
        dates: euro.dates().to_vec(),
        returns,
        levels,
    })
}
