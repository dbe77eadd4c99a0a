//! Converter configuration.
//!
//! Loaded from TOML; every section and field falls back to its default so
//! a partial file is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::intensity::{IntensityTable, ZoneDefinition};
use crate::workouts::{BuilderSettings, FormatCapabilities, OutputFormat, RangeMode};

/// Default author written into documents.
pub const DEFAULT_AUTHOR: &str = "rideplan";
/// Default document tag.
pub const DEFAULT_TAG: &str = "TCTP";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Config file version
    pub version: String,
    /// Power scaling
    pub power: PowerSettings,
    /// Step builder settings
    pub builder: BuilderSettings,
    /// Output settings
    pub output: OutputSettings,
    /// Zone overrides, merged over the standard table
    pub zones: Vec<ZoneDefinition>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            power: PowerSettings::default(),
            builder: BuilderSettings::default(),
            output: OutputSettings::default(),
            zones: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Intensity table for this configuration.
    pub fn intensity_table(&self) -> IntensityTable {
        let table = if self.zones.is_empty() {
            IntensityTable::standard().clone()
        } else {
            IntensityTable::with_overrides(&self.zones)
        };

        match (self.power.field_test_power, self.power.reference_ftp) {
            (Some(field_test), Some(ftp)) => table.with_power_scale(field_test, ftp),
            _ => table,
        }
    }

    /// Reject settings the builder cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let RangeMode::Point { position } = self.builder.range_mode {
            if !(0.0..=1.0).contains(&position) {
                return Err(ConfigError::InvalidValue(format!(
                    "builder.range_mode.position must be within 0.0..=1.0, got {position}"
                )));
            }
        }
        Ok(())
    }

    /// Capabilities of the selected format, after the `flat` override.
    pub fn capabilities(&self) -> FormatCapabilities {
        let mut capabilities = self.output.format.capabilities();
        if self.output.flat {
            capabilities.native_repeats = false;
        }
        capabilities
    }
}

/// Power reference values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSettings {
    /// Field-test power the zone table percentages refer to (watts)
    pub field_test_power: Option<u16>,
    /// FTP configured on the training platform (watts)
    pub reference_ftp: Option<u16>,
}

/// Output-related settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    /// Prepended to every workout name
    pub prefix: String,
    pub author: String,
    pub tags: Vec<String>,
    /// Force unrolled rendering even when the format can repeat
    pub flat: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            prefix: String::new(),
            author: DEFAULT_AUTHOR.to_string(),
            tags: vec![DEFAULT_TAG.to_string()],
            flat: false,
        }
    }
}

/// Get the application config directory.
pub fn get_config_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "rideplan", "rideplan")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default configuration file path.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

/// Load configuration from `path`, or from the default location.
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = path.map_or_else(get_config_path, Path::to_path_buf);

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    parse_config(&content)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to `path`.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
