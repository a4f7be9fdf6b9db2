//! Global constants for buildtriage
//!
//! Centralized location for application-wide constants

/// Per-user configuration directory name under the platform config dir
pub const APP_DIR: &str = "buildtriage";

/// Connection settings file name inside APP_DIR
pub const SETTINGS_FILE_NAME: &str = "server.toml";

/// Signature catalog file looked up in the working directory by default
pub const DEFAULT_CATALOG_FILE: &str = "causes.toml";

/// Default report window in hours (HOURS_AGO < build time <= now)
pub const DEFAULT_HOURS_AGO: i64 = 30;
