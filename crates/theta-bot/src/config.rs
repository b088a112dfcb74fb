//! Application configuration.
//!
//! Symbol parameters resolve in three layers: built-in defaults, then
//! `[symbols.defaults]`, then `[symbols.tickers.<SYMBOL>]`.

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use theta_core::SymbolConfig;
use theta_risk::RiskConfig;
use theta_strategy::StrategyConfig;

/// Default config path when neither the CLI nor `THETA_CONFIG` names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable holding the config path.
pub const CONFIG_ENV_VAR: &str = "THETA_CONFIG";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Optional per-symbol parameters. Unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymbolOverrides {
    pub enabled: Option<bool>,
    pub max_positions: Option<u32>,
    pub target_delta: Option<Decimal>,
    pub min_premium: Option<Decimal>,
    pub min_premium_percent: Option<Decimal>,
    pub dte_min: Option<i64>,
    pub dte_max: Option<i64>,
    pub roll_when_dte: Option<i64>,
    pub roll_when_pnl_percent: Option<Decimal>,
    pub write_calls_on_assignment: Option<bool>,
    pub max_position_size_percent: Option<Decimal>,
}

impl SymbolOverrides {
    /// Apply the set fields on top of `base`.
    pub fn apply(&self, mut base: SymbolConfig) -> SymbolConfig {
        if let Some(v) = self.enabled {
            base.enabled = v;
        }
        if let Some(v) = self.max_positions {
            base.max_positions = v;
        }
        if let Some(v) = self.target_delta {
            base.target_delta = v;
        }
        if let Some(v) = self.min_premium {
            base.min_premium = v;
        }
        if let Some(v) = self.min_premium_percent {
            base.min_premium_percent = v;
        }
        if let Some(v) = self.dte_min {
            base.dte_min = v;
        }
        if let Some(v) = self.dte_max {
            base.dte_max = v;
        }
        if let Some(v) = self.roll_when_dte {
            base.roll_when_dte = v;
        }
        if let Some(v) = self.roll_when_pnl_percent {
            base.roll_when_pnl_percent = v;
        }
        if let Some(v) = self.write_calls_on_assignment {
            base.write_calls_on_assignment = v;
        }
        if let Some(v) = self.max_position_size_percent {
            base.max_position_size_percent = v;
        }
        base
    }
}

/// Symbol table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolsConfig {
    #[serde(default)]
    pub defaults: SymbolOverrides,
    /// Keyed by ticker.
    #[serde(default)]
    pub tickers: BTreeMap<String, SymbolOverrides>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Only report decisions. Order placement is not implemented, so this
    /// is informational and surfaced in the report.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub symbols: SymbolsConfig,
}

fn default_dry_run() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dry_run: default_dry_run(),
            logging: LoggingConfig::default(),
            risk: RiskConfig::default(),
            strategy: StrategyConfig::default(),
            symbols: SymbolsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the config path: CLI arg > `THETA_CONFIG` > default.
    pub fn resolve_path(cli_path: Option<&str>) -> String {
        cli_path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolved per-symbol configuration, sorted by ticker.
    pub fn symbol_configs(&self) -> Vec<SymbolConfig> {
        self.symbols
            .tickers
            .iter()
            .map(|(ticker, overrides)| {
                let base = self.symbols.defaults.apply(SymbolConfig::new(ticker.as_str()));
                overrides.apply(base)
            })
            .collect()
    }

    /// Validate every section.
    pub fn validate(&self) -> AppResult<()> {
        if self.symbols.tickers.is_empty() {
            return Err(AppError::Config(
                "at least one symbol must be configured under [symbols.tickers]".to_string(),
            ));
        }

        for symbol in self.symbol_configs() {
            symbol.validate()?;
        }
        self.risk.validate()?;
        self.strategy.validate()?;

        Ok(())
    }
}
