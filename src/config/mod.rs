//! Carrier Configuration Module
//!
//! HOS limits, the weekly cycle choice, the home-terminal time zone and
//! dashboard thresholds, loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `HOS_CONFIG` environment variable (path to TOML file)
//! 2. `hos_config.toml` in the current working directory
//! 3. Built-in federal defaults, only when neither file exists
//!
//! A file that exists but fails to parse or validate is an error, never a
//! silent fallback.
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(HosConfig::load()?);
//!
//! // In a request handler:
//! let policy = config::get().policy()?;
//! ```
//!
//! The engine itself never reads this global; it takes a `PolicyWindow`.

mod hos_config;
pub mod defaults;
pub mod validation;

pub use hos_config::*;

use std::sync::OnceLock;

static HOS_CONFIG: OnceLock<HosConfig> = OnceLock::new();

/// Initialize the global configuration. Later calls are ignored.
pub fn init(config: HosConfig) {
    if HOS_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get the global configuration.
///
/// Panics if `init()` has not been called; a missing config is a startup bug.
pub fn get() -> &'static HosConfig {
    HOS_CONFIG
        .get()
        .expect("config::get() called before config::init()")
}

pub fn is_initialized() -> bool {
    HOS_CONFIG.get().is_some()
}
