//! Failure classes of an index run

use thiserror::Error;

/// Every variant aborts the run: later stages need the full aligned table.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Failed to fetch data for {}: {reason}", .symbols.join(", "))]
    DataFetch {
        symbols: Vec<String>,
        reason: String,
    },

    #[error("Alignment error: {0}")]
    Alignment(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IndexError {
    pub fn fetch(symbol: &str, reason: impl Into<String>) -> Self {
        IndexError::DataFetch {
            symbols: vec![symbol.to_string()],
            reason: reason.into(),
        }
    }
}
