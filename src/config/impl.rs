use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Initialize the global configuration
///
/// Only the first call wins; later calls are ignored so tests may call it
/// freely.
///
/// # Examples
/// ```no_run
/// use urlshort::config::{init_config, StaticConfig};
/// init_config(StaticConfig::default());
/// ```
pub fn init_config(config: StaticConfig) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(config));
}
