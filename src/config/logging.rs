//! Logging Setup
//!
//! Installs the `tracing` subscriber for hosts embedding the router.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::loader::LoggingSection;

/// Initialize logging from the `[logging]` section
///
/// `RUST_LOG` wins over the configured level. Returns false when a global
/// subscriber was already installed, which leaves the existing one in place.
pub fn init_logging(section: &LoggingSection) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(section.level.to_lowercase()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_is_harmless() {
        let section = LoggingSection::default();
        let _ = init_logging(&section);
        assert!(!init_logging(&section));
    }
}
