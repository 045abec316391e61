pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::{AppConfig, IndexConfig};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Command line overrides of the configured period and chart location.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub output: Option<PathBuf>,
}

impl RunOptions {
    /// Applies overrides; the end date falls back to the config, then today.
    pub fn resolve(&self, config: &IndexConfig) -> (IndexConfig, NaiveDate) {
        let mut resolved = config.clone();
        if let Some(start) = self.start {
            resolved.start_date = start;
        }
        let end = self
            .end
            .or(config.end_date)
            .unwrap_or_else(|| Local::now().date_naive());
        resolved.end_date = Some(end);
        (resolved, end)
    }
}

pub enum AppCommand {
    Index(RunOptions),
    Weights(RunOptions),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("sidx starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let yahoo = &config.providers.yahoo;
    let provider = providers::YahooHistoryProvider::new(
        &yahoo.base_url,
        Duration::from_secs(yahoo.timeout_secs),
    )?;

    match command {
        AppCommand::Index(options) => {
            let (index, end) = options.resolve(&config.index);
            let chart_path = options.output.unwrap_or_else(|| config.chart_path());
            cli::index::run(&index, &provider, end, &chart_path).await
        }
        AppCommand::Weights(options) => {
            let (index, end) = options.resolve(&config.index);
            cli::index::run_weights(&index, &provider, end).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FxConfig;
    use crate::core::table::MissingDataPolicy;
    use crate::core::weights::StartPricePolicy;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn config(end_date: Option<NaiveDate>) -> IndexConfig {
        IndexConfig {
            title: "Test".to_string(),
            start_date: d(4, 16),
            end_date,
            scale_base: 75.0,
            allow_leverage: false,
            start_price_policy: StartPricePolicy::FirstOnOrAfter,
            missing_data: MissingDataPolicy::ForwardFill,
            fx: FxConfig::default(),
            basket: vec![],
        }
    }

    #[test]
    fn test_resolve_prefers_cli_overrides() {
        let options = RunOptions {
            start: Some(d(5, 1)),
            end: Some(d(6, 1)),
            output: None,
        };
        let (resolved, end) = options.resolve(&config(Some(d(9, 1))));
        assert_eq!(resolved.start_date, d(5, 1));
        assert_eq!(end, d(6, 1));
        assert_eq!(resolved.end_date, Some(d(6, 1)));
    }

    #[test]
    fn test_resolve_falls_back_to_config_then_today() {
        let (resolved, end) = RunOptions::default().resolve(&config(Some(d(9, 1))));
        assert_eq!(resolved.start_date, d(4, 16));
        assert_eq!(end, d(9, 1));

        let (_, end) = RunOptions::default().resolve(&config(None));
        assert_eq!(end, Local::now().date_naive());
    }
}
