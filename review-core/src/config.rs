//! Layered tool settings.
//!
//! Defaults, then an optional TOML file, then `GATEREVIEW_*` environment
//! variables. Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found at path: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Environment prefix, e.g. `GATEREVIEW_CONFIRM_DISCARD=false`.
pub const ENV_PREFIX: &str = "GATEREVIEW";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Extension of the documents under review, without the dot.
    #[serde(default = "default_document_extension")]
    pub document_extension: String,

    /// Directory created inside the input folder for the store.
    #[serde(default = "default_output_dir_name")]
    pub output_dir_name: String,

    #[serde(default = "default_store_file_name")]
    pub store_file_name: String,

    /// Ask before discarding a sample.
    #[serde(default = "default_true")]
    pub confirm_discard: bool,

    /// Ask before clearing a sample's gate record.
    #[serde(default = "default_true")]
    pub confirm_clear: bool,

    /// Arrow-key navigation at session start.
    #[serde(default = "default_true")]
    pub nav_keys_enabled: bool,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Input poll interval of the page viewer.
    #[serde(default = "default_preview_poll_ms")]
    pub preview_poll_ms: u64,
}

fn default_document_extension() -> String {
    "pdf".to_string()
}
fn default_output_dir_name() -> String {
    "output".to_string()
}
fn default_store_file_name() -> String {
    "correction.yaml".to_string()
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_preview_poll_ms() -> u64 {
    100
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            document_extension: default_document_extension(),
            output_dir_name: default_output_dir_name(),
            store_file_name: default_store_file_name(),
            confirm_discard: default_true(),
            confirm_clear: default_true(),
            nav_keys_enabled: default_true(),
            log_level: default_log_level(),
            preview_poll_ms: default_preview_poll_ms(),
        }
    }
}

impl ReviewConfig {
    pub fn validate(&self) -> Result<()> {
        if self.document_extension.trim_start_matches('.').trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "document_extension must not be empty".into(),
            ));
        }
        if self.store_file_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store_file_name must not be empty".into(),
            ));
        }
        if self.preview_poll_ms == 0 {
            return Err(ConfigError::ValidationError(
                "preview_poll_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// `<input>/<output_dir_name>/<store_file_name>`.
    pub fn store_path(&self, input: &Path) -> PathBuf {
        input
            .join(&self.output_dir_name)
            .join(&self.store_file_name)
    }
}

/// Configuration loader with layered merging.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load defaults, then the file if one was set, then the environment.
    pub fn load(&self) -> Result<ReviewConfig> {
        let defaults = serde_json::to_string(&ReviewConfig::default())?;
        let mut builder =
            Config::builder().add_source(File::from_str(&defaults, config::FileFormat::Json));

        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            builder = builder.add_source(File::from(path.as_path()));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: ReviewConfig = builder.build()?.try_deserialize()?;
        settings.validate()?;
        tracing::debug!(?settings, "Loaded configuration");
        Ok(settings)
    }

    /// First existing file of `./gatereview.toml`,
    /// `<config dir>/gatereview/config.toml`, `~/.gatereview.toml`.
    pub fn find_config_file() -> Option<PathBuf> {
        let cwd_config = PathBuf::from("./gatereview.toml");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("gatereview").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".gatereview.toml");
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }

    pub fn load_default() -> Result<ReviewConfig> {
        match Self::find_config_file() {
            Some(path) => ConfigLoader::new().with_file(path).load(),
            None => ConfigLoader::new().load(),
        }
    }
}
