//! Configuration file handling.
//!
//! The configuration lives in the platform config directory:
//! - Linux: `~/.config/eencijfer/config.toml`
//! - macOS: `~/Library/Application Support/nl.eencijfer.eencijfer/config.toml`
//! - Windows: `%APPDATA%\eencijfer\eencijfer\config\config.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use eencijfer_core::{LocalIdTable, PrivacyOptions};
use eencijfer_ingest::read_table;
use eencijfer_model::ExportFormat;

const APP_QUALIFIER: &str = "nl";
const APP_ORG: &str = "eencijfer";
const APP_NAME: &str = "eencijfer";
const CONFIG_FILENAME: &str = "config.toml";

/// Path of the default configuration file, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

fn default_root() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_default()
        .join("eencijfer")
}

/// Institution table used to attach local ids before pseudonymization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalIdConfig {
    pub path: PathBuf,
    pub left_on: String,
    pub right_on: String,
}

/// Settings of one eencijfer installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Raw fixed-width files as delivered.
    pub source_dir: PathBuf,
    /// Decoded tables.
    pub result_dir: PathBuf,
    /// Enriched tables for reporting.
    pub assets_dir: PathBuf,
    /// Layout definition files.
    pub import_definitions_dir: PathBuf,
    /// Reference tables; `result_dir` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_dir: Option<PathBuf>,
    /// `;`-separated local program names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_names_file: Option<PathBuf>,
    /// Decode fields with their declared converters instead of as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_column_converters: Option<bool>,
    pub remove_pii: bool,
    pub add_local_id: bool,
    pub export_format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<LocalIdConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self::rooted_at(&default_root())
    }
}

impl Config {
    /// Default settings with every directory below `root`.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            source_dir: root.join("eencijfer"),
            result_dir: root.join("result"),
            assets_dir: root.join("assets"),
            import_definitions_dir: root.join("definitions"),
            reference_dir: None,
            local_names_file: None,
            use_column_converters: None,
            remove_pii: true,
            add_local_id: false,
            export_format: ExportFormat::default(),
            local_id: None,
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize configuration")
    }

    /// Loads the configuration at `path`.
    ///
    /// A missing file gives the defaults; an unreadable or invalid file is
    /// an error.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml(&content)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                tracing::info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                tracing::info!(
                    path = %path.display(),
                    source_dir = %config.source_dir.display(),
                    "No configuration file found, using defaults"
                );
                Ok(config)
            }
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Writes the configuration, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    pub fn reference_dir(&self) -> &Path {
        self.reference_dir.as_deref().unwrap_or(&self.result_dir)
    }

    /// Builds the privacy options, reading the local-id table when enabled.
    pub fn privacy_options(&self) -> Result<PrivacyOptions> {
        let local_id = if self.add_local_id {
            let Some(local) = &self.local_id else {
                bail!("add_local_id is set but the [local_id] table is missing");
            };
            let table = read_table(&local.path)
                .with_context(|| format!("failed to read {}", local.path.display()))?;
            Some(LocalIdTable {
                table,
                left_on: local.left_on.clone(),
                right_on: local.right_on.clone(),
            })
        } else {
            None
        };
        Ok(PrivacyOptions {
            remove_pii: self.remove_pii,
            local_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_a_round_trip() {
        let config = Config::rooted_at(Path::new("/data"));
        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.reference_dir(), Path::new("/data/result"));
    }

    #[test]
    fn local_id_requires_its_table() {
        let config = Config {
            add_local_id: true,
            ..Config::rooted_at(Path::new("/data"))
        };
        assert!(config.privacy_options().is_err());
    }
}
