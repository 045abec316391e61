//! Core business logic abstractions

pub mod basket;
pub mod config;
pub mod currency;
pub mod error;
pub mod index;
pub mod log;
pub mod pipeline;
pub mod price;
pub mod table;
pub mod weights;

// Re-export main types for cleaner imports
pub use error::IndexError;
pub use pipeline::IndexReport;
pub use price::{HistoryProvider, PriceSeries};
