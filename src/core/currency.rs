//! Currency normalization into euros

use crate::core::basket::Basket;
use crate::core::error::IndexError;
use crate::core::table::PriceTable;
use std::collections::BTreeMap;

/// Divides each basket column by its FX pair on the same row.
///
/// FX pairs quote foreign currency per euro (`EURUSD=X` ≈ 1.08), so the euro
/// price is `native / rate`. The returned table holds one column per basket
/// asset and shares the input's date index.
pub fn to_euro(table: &PriceTable, basket: &Basket) -> Result<PriceTable, IndexError> {
    let mut columns = BTreeMap::new();

    for asset in basket.assets() {
        let native = table.column(&asset.symbol)?;
        let rates = table.column(&asset.fx_pair)?;

        let euro = native
            .iter()
            .zip(rates)
            .zip(table.dates())
            .map(|((price, rate), date)| {
                if *rate == 0.0 {
                    Err(IndexError::Computation(format!(
                        "{} rate is zero on {date}, cannot convert {}",
                        asset.fx_pair, asset.symbol
                    )))
                } else {
                    Ok(price / rate)
                }
            })
            .collect::<Result<Vec<f64>, IndexError>>()?;

        columns.insert(asset.symbol.clone(), euro);
    }

    PriceTable::new(table.dates().to_vec(), columns)
}
