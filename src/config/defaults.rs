//! System-wide default constants.
//!
//! Regulatory numbers live in `HosConfig` defaults; this file holds the
//! operational ones.

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable holding the path to the TOML config file.
pub const CONFIG_ENV_VAR: &str = "HOS_CONFIG";

/// Config file looked up in the current working directory.
pub const CONFIG_FILE_NAME: &str = "hos_config.toml";

/// Home-terminal time zone when `[carrier] time_zone` is not set.
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";

// ============================================================================
// HTTP Server
// ============================================================================

pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

/// Largest accepted request body (bytes). Fleet payloads carry every segment.
pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// Scheduling
// ============================================================================

/// Alternative drivers returned when the request does not set a limit.
pub const DEFAULT_ALTERNATIVES_LIMIT: usize = 5;
