//! Application settings loaded from `config.toml`.
//!
//! Every field has a default, so the file is optional: a missing file yields
//! [`Settings::default`]. A file that exists but cannot be parsed is an error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `SeaORM` connection URL for the ledger database
    pub database_url: String,
    /// Directory exported workbooks are written to
    pub export_dir: PathBuf,
    /// File name prefix for exported workbooks
    pub export_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://wedding_list.db?mode=rwc".to_string(),
            export_dir: PathBuf::from("."),
            export_prefix: "ledger".to_string(),
        }
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is not valid TOML.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {path_ref:?}: {e}"),
    })
}

/// Loads settings from `./config.toml`, or the defaults when it is absent.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        load_settings(path)
    } else {
        tracing::info!("No {} found, using default settings", DEFAULT_CONFIG_PATH);
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            database_url = "sqlite://gifts.db?mode=rwc"
            export_dir = "exports"
            export_prefix = "gifts"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.database_url, "sqlite://gifts.db?mode=rwc");
        assert_eq!(settings.export_dir, PathBuf::from("exports"));
        assert_eq!(settings.export_prefix, "gifts");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = toml::from_str(r#"export_prefix = "gifts""#).unwrap();
        assert_eq!(settings.export_prefix, "gifts");
        assert_eq!(settings.database_url, Settings::default().database_url);
        assert_eq!(settings.export_dir, PathBuf::from("."));
    }

    #[test]
    fn test_load_settings_reports_bad_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "export_dir = [").unwrap();

        let result = load_settings(&path);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_settings_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = load_settings(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
