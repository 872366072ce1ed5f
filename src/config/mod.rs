//! Configuration Module
//!
//! Loads and validates router configuration from TOML files.

pub mod loader;
pub mod logging;

pub use loader::{
    load_config, Config, ConfigError, LoggingSection, PumpFunSection, RouterSection, VenuesSection,
};
pub use logging::init_logging;
