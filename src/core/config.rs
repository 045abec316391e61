use crate::core::table::MissingDataPolicy;
use crate::core::weights::StartPricePolicy;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BasketEntry {
    pub symbol: String,
    pub weight: f64,
    /// FX pair used to convert this symbol into euros, overrides suffix rules.
    #[serde(default)]
    pub fx: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FxConfig {
    pub default: String,
    /// Market suffix (e.g. ".ST") to FX pair.
    #[serde(default)]
    pub suffixes: BTreeMap<String, String>,
}

impl Default for FxConfig {
    fn default() -> Self {
        FxConfig {
            default: "EURUSD=X".to_string(),
            suffixes: BTreeMap::from([(".ST".to_string(), "EURSEK=X".to_string())]),
        }
    }
}

impl FxConfig {
    /// Resolves the FX pair for a symbol: explicit override, then the longest
    /// matching suffix, then the default pair.
    pub fn pair_for(&self, symbol: &str, explicit: Option<&str>) -> String {
        if let Some(pair) = explicit {
            return pair.to_string();
        }
        self.suffixes
            .iter()
            .filter(|(suffix, _)| symbol.ends_with(suffix.as_str()))
            .max_by_key(|(suffix, _)| suffix.len())
            .map_or_else(|| self.default.clone(), |(_, pair)| pair.clone())
    }
}

fn default_title() -> String {
    "Synthetic Index (€)".to_string()
}

fn default_scale_base() -> f64 {
    75.0
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_title")]
    pub title: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_scale_base")]
    pub scale_base: f64,
    /// Accept a basket whose scaled weights exceed 100% (negative cash).
    #[serde(default)]
    pub allow_leverage: bool,
    #[serde(default)]
    pub start_price_policy: StartPricePolicy,
    #[serde(default)]
    pub missing_data: MissingDataPolicy,
    #[serde(default)]
    pub fx: FxConfig,
    pub basket: Vec<BasketEntry>,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for YahooProviderConfig {
    fn default() -> Self {
        YahooProviderConfig {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub yahoo: YahooProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub index: IndexConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub chart_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "sidx", "sidx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn chart_path(&self) -> PathBuf {
        PathBuf::from(
            self.chart_path
                .as_deref()
                .unwrap_or("synthetic_index.svg"),
        )
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
