pub mod chart;
pub mod index;
pub mod setup;
pub mod ui;
