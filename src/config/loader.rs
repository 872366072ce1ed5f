//! Configuration Loader
//!
//! Loads and validates router configuration from TOML files.

use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::known_programs::PUMPFUN_PROGRAM_ID;
use crate::domain::plan::Dex;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub router: RouterSection,
    #[serde(default)]
    pub venues: VenuesSection,
    #[serde(default)]
    pub pump_fun: PumpFunSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Plan acceptance and guard settings
#[derive(Debug, Clone, Deserialize)]
pub struct RouterSection {
    /// Longest hop sequence a single route may carry
    #[serde(default = "default_max_hops")]
    pub max_hops_per_route: usize,
    /// Reject settlements that debit more than `amount_in` from the source
    #[serde(default = "default_true")]
    pub enforce_source_spend: bool,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            max_hops_per_route: default_max_hops(),
            enforce_source_spend: true,
        }
    }
}

/// Venues the router will dispatch to
#[derive(Debug, Clone, Deserialize)]
pub struct VenuesSection {
    /// Selector names, e.g. "pumpfun_buy"
    #[serde(default = "default_enabled_venues")]
    pub enabled: Vec<String>,
}

impl Default for VenuesSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled_venues(),
        }
    }
}

impl VenuesSection {
    /// Resolve enabled names to selectors
    pub fn selectors(&self) -> Result<Vec<Dex>, ConfigError> {
        self.enabled
            .iter()
            .map(|name| {
                Dex::from_name(name)
                    .ok_or_else(|| ConfigError::ValidationError(format!("unknown venue '{}'", name)))
            })
            .collect()
    }
}

/// Pump.fun bonding-curve program settings
#[derive(Debug, Clone, Deserialize)]
pub struct PumpFunSection {
    /// Program id (base58)
    #[serde(default = "default_pumpfun_program")]
    pub program_id: String,
    /// Protocol fee charged on the SOL side, in basis points
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u16,
}

impl Default for PumpFunSection {
    fn default() -> Self {
        Self {
            program_id: default_pumpfun_program(),
            fee_bps: default_fee_bps(),
        }
    }
}

impl PumpFunSection {
    /// Get program id with environment variable override
    /// Checks PUMPFUN_PROGRAM_ID env var first, falls back to config value
    pub fn get_program_id(&self) -> Result<Pubkey, ConfigError> {
        let raw = std::env::var("PUMPFUN_PROGRAM_ID").unwrap_or_else(|_| self.program_id.clone());
        Pubkey::from_str(&raw)
            .map_err(|e| ConfigError::ValidationError(format!("invalid pump_fun.program_id '{}': {}", raw, e)))
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_max_hops() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_enabled_venues() -> Vec<String> {
    Dex::ALL.iter().map(|dex| dex.name().to_string()).collect()
}

fn default_pumpfun_program() -> String {
    PUMPFUN_PROGRAM_ID.to_string()
}

fn default_fee_bps() -> u16 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.router.max_hops_per_route == 0 {
            return Err(ConfigError::ValidationError(
                "max_hops_per_route must be > 0".to_string(),
            ));
        }

        if self.venues.enabled.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one venue must be enabled".to_string(),
            ));
        }
        self.venues.selectors()?;

        if self.pump_fun.fee_bps >= 10_000 {
            return Err(ConfigError::ValidationError(format!(
                "fee_bps must be < 10000, got {}",
                self.pump_fun.fee_bps
            )));
        }
        self.pump_fun.get_program_id()?;

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}
