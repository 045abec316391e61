//! Basket weights: raw weights scaled to percent, the residual cash position
//! and the FX pair each asset is converted with.

use crate::core::config::{BasketEntry, FxConfig, IndexConfig};
use crate::core::error::IndexError;
use std::collections::BTreeSet;

pub const CASH: &str = "CASH";

#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub symbol: String,
    /// Percent of the basket after scaling.
    pub scaled_pct: f64,
    pub fx_pair: String,
}

impl Asset {
    pub fn initial_fraction(&self) -> f64 {
        self.scaled_pct / 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Basket {
    assets: Vec<Asset>,
    cash_pct: f64,
}

impl Basket {
    pub fn from_config(config: &IndexConfig) -> Result<Self, IndexError> {
        Self::new(
            &config.basket,
            config.scale_base,
            &config.fx,
            config.allow_leverage,
        )
    }

    pub fn new(
        entries: &[BasketEntry],
        scale_base: f64,
        fx: &FxConfig,
        allow_leverage: bool,
    ) -> Result<Self, IndexError> {
        if entries.is_empty() {
            return Err(IndexError::InvalidConfig("Basket is empty".to_string()));
        }
        if !(scale_base.is_finite() && scale_base > 0.0) {
            return Err(IndexError::InvalidConfig(format!(
                "Scale base must be positive, got {scale_base}"
            )));
        }

        let scale = 100.0 / scale_base;
        let mut seen = BTreeSet::new();
        let mut assets = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.symbol == CASH {
                return Err(IndexError::InvalidConfig(format!(
                    "{CASH} is reserved for the residual position"
                )));
            }
            if !seen.insert(entry.symbol.as_str()) {
                return Err(IndexError::InvalidConfig(format!(
                    "Duplicate basket symbol: {}",
                    entry.symbol
                )));
            }
            if !(entry.weight.is_finite() && entry.weight > 0.0) {
                return Err(IndexError::InvalidConfig(format!(
                    "Weight for {} must be positive, got {}",
                    entry.symbol, entry.weight
                )));
            }

            assets.push(Asset {
                symbol: entry.symbol.clone(),
                scaled_pct: entry.weight * scale,
                fx_pair: fx.pair_for(&entry.symbol, entry.fx.as_deref()),
            });
        }

        let cash_pct = 100.0 - assets.iter().map(|a| a.scaled_pct).sum::<f64>();
        if cash_pct < 0.0 && !allow_leverage {
            return Err(IndexError::InvalidConfig(format!(
                "Scaled weights exceed 100% (cash {cash_pct:.2}%), set allow_leverage to accept"
            )));
        }

        Ok(Basket { assets, cash_pct })
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn cash_pct(&self) -> f64 {
        self.cash_pct
    }

    pub fn cash_fraction(&self) -> f64 {
        self.cash_pct / 100.0
    }

    /// Distinct FX pairs in first-use order.
    pub fn fx_pairs(&self) -> Vec<&str> {
        let mut pairs: Vec<&str> = Vec::new();
        for asset in &self.assets {
            if !pairs.contains(&asset.fx_pair.as_str()) {
                pairs.push(&asset.fx_pair);
            }
        }
        pairs
    }

    /// Every symbol the provider must deliver: basket tickers, then FX pairs.
    pub fn required_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.assets.iter().map(|a| a.symbol.clone()).collect();
        for pair in self.fx_pairs() {
            if !symbols.iter().any(|s| s == pair) {
                symbols.push(pair.to_string());
            }
        }
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(symbol: &str, weight: f64) -> BasketEntry {
        BasketEntry {
            symbol: symbol.to_string(),
            weight,
            fx: None,
        }
    }

    fn default_entries() -> Vec<BasketEntry> {
        vec![
            entry("BRK-B", 7.5),
            entry("EVO.ST", 5.6),
            entry("UBER", 5.6),
            entry("GOOG", 3.75),
            entry("KSPI", 3.75),
            entry("NU", 3.75),
            entry("MELI", 3.75),
            entry("SBSW", 1.86),
            entry("ALB", 1.86),
        ]
    }

    #[test]
    fn test_initial_fractions_sum_to_one() {
        let basket = Basket::new(&default_entries(), 75.0, &FxConfig::default(), false).unwrap();
        let total: f64 = basket
            .assets()
            .iter()
            .map(Asset::initial_fraction)
            .sum::<f64>()
            + basket.cash_fraction();
        assert!((total - 1.0).abs() < 1e-9, "total was {total}");
        // 37.42 raw -> 49.893% scaled
        assert!((basket.cash_pct() - (100.0 - 37.42 * 100.0 / 75.0)).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_weights() {
        let basket = Basket::new(
            &[entry("A", 7.5), entry("B", 5.6)],
            75.0,
            &FxConfig::default(),
            false,
        )
        .unwrap();
        assert!((basket.assets()[0].scaled_pct - 10.0).abs() < 1e-12);
        assert!((basket.assets()[1].scaled_pct - 7.466_666_666_666_667).abs() < 1e-9);
        assert!((basket.cash_pct() - 82.533_333_333_333_33).abs() < 1e-9);
    }

    #[test]
    fn test_fx_pairs_and_required_symbols() {
        let basket = Basket::new(&default_entries(), 75.0, &FxConfig::default(), false).unwrap();
        assert_eq!(basket.assets()[0].fx_pair, "EURUSD=X");
        assert_eq!(basket.assets()[1].fx_pair, "EURSEK=X");
        assert_eq!(basket.fx_pairs(), vec!["EURUSD=X", "EURSEK=X"]);

        let symbols = basket.required_symbols();
        assert_eq!(symbols.len(), 11);
        assert_eq!(symbols[9], "EURUSD=X");
        assert_eq!(symbols[10], "EURSEK=X");
    }

    #[test]
    fn test_negative_cash_requires_leverage_flag() {
        let entries = [entry("A", 50.0), entry("B", 40.0)];
        let err = Basket::new(&entries, 75.0, &FxConfig::default(), false).unwrap_err();
        assert!(matches!(err, IndexError::InvalidConfig(_)));
        assert!(err.to_string().contains("exceed 100%"));

        let basket = Basket::new(&entries, 75.0, &FxConfig::default(), true).unwrap();
        assert!((basket.cash_pct() - -20.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_entries_are_rejected() {
        let fx = FxConfig::default();
        assert!(Basket::new(&[], 75.0, &fx, false).is_err());
        assert!(Basket::new(&[entry("A", 1.0)], 0.0, &fx, false).is_err());
        assert!(Basket::new(&[entry("A", -1.0)], 75.0, &fx, false).is_err());
        assert!(Basket::new(&[entry("A", 1.0), entry("A", 2.0)], 75.0, &fx, false).is_err());
        assert!(Basket::new(&[entry(CASH, 1.0)], 75.0, &fx, false).is_err());
    }
}
