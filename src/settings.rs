//! Server connection settings
//!
//! Loads the operator-maintained connection file (URL, credentials and an
//! optional job-alias table). A missing file is fatal before any network
//! activity; the binary prints the expected path and example contents so the
//! operator can create it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{APP_DIR, SETTINGS_FILE_NAME};

/// Errors from settings loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("server settings file not found at {path}")]
    Missing { path: PathBuf },

    #[error("cannot read server settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("server settings {path} are not valid TOML: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("no per-user configuration directory on this system")]
    NoConfigDir,
}

/// Connection parameters for the CI server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Base URL, e.g. "http://jenkins.example.com:8080"
    pub url: String,
    pub username: String,
    /// Password or API token
    pub password: String,
    /// Optional short-name -> job-name table resolved before any fetch
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
}

/// Example contents printed when the settings file is missing.
pub const EXAMPLE_SETTINGS: &str = r#"url = "http://jenkins.example.com:8080"
username = "<username>"
password = "<password or API token>"

# Optional short names for jobs
[aliases]
full = "test_charm_func_full"
lint = "test_charm_lint"
"#;

impl ServerSettings {
    /// Per-user default location: `<config-dir>/buildtriage/server.toml`.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE_NAME))
            .ok_or(SettingsError::NoConfigDir)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::Missing {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve a possibly-aliased job name to the real one.
    pub fn resolve_job<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_minimal_settings() {
        let settings: ServerSettings = toml::from_str(
            r#"
url = "http://jenkins.example.com:8080"
username = "ci-bot"
password = "s3cret"
"#,
        )
        .unwrap();
        assert_eq!(settings.url, "http://jenkins.example.com:8080");
        assert!(settings.aliases.is_empty());
    }

    #[test]
    fn resolves_aliases_and_passes_through_unknown_names() {
        let settings: ServerSettings = toml::from_str(
            r#"
url = "http://jenkins.example.com:8080"
username = "ci-bot"
password = "s3cret"

[aliases]
full = "test_charm_func_full"
"#,
        )
        .unwrap();
        assert_eq!(settings.resolve_job("full"), "test_charm_func_full");
        assert_eq!(settings.resolve_job("mojo_runner"), "mojo_runner");
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        match ServerSettings::load(&path) {
            Err(SettingsError::Missing { path: reported }) => assert_eq!(reported, path),
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "url = ").unwrap();
        assert!(matches!(
            ServerSettings::load(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn example_settings_parse() {
        let settings: ServerSettings = toml::from_str(EXAMPLE_SETTINGS).unwrap();
        assert_eq!(settings.resolve_job("lint"), "test_charm_lint");
    }
}
