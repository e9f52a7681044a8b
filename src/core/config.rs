//! Configuration management.
//!
//! Handles loading configuration from TOML files and resolving it, together
//! with the credential store, into the settings a report run needs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::DEFAULT_RECENT_DONE_DAYS;
use crate::integrations::{IssueQuery, DEFAULT_FETCH_LIMIT, DEFAULT_LABEL, DEFAULT_LINEAR_API_URL};
use crate::security::{CredentialType, PropertySource, SecretValue};
use crate::surface::{SheetLayout, DEFAULT_SHEETS_API_URL};

/// Local configuration file name.
pub const LOCAL_CONFIG_FILE: &str = ".linear-report.toml";

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value is absent from every source.
    #[error(
        "Missing configuration value '{key}'. Set {env_var}, store it with \
         `linear-report secrets set {key}`, or add it to the config file."
    )]
    Missing { key: &'static str, env_var: &'static str },

    #[error("Failed to read config file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn missing(credential: CredentialType) -> Self {
        Self::Missing { key: credential.key_name(), env_var: credential.env_var() }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Linear settings
    pub linear: LinearConfig,

    /// Google Sheets settings
    pub sheets: SheetsConfig,

    /// Report settings
    pub report: ReportConfig,
}

/// Linear API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConfig {
    /// GraphQL endpoint
    pub api_url: String,

    /// Label that marks issues for the report
    pub label: String,

    /// Maximum number of issues fetched per run
    pub fetch_limit: u32,

    /// API key (prefer the environment or keychain)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Google Sheets settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Sheets API base URL
    pub api_url: String,

    /// Target spreadsheet ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    /// OAuth bearer token (prefer the environment or keychain)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Report shaping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// How many days back a completed issue still counts as recently done
    pub recent_done_days: u32,

    /// Width of the title column in pixels
    pub title_column_width: u32,

    /// Width of every other column in pixels
    pub column_width: u32,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_LINEAR_API_URL.to_string(),
            label: DEFAULT_LABEL.to_string(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            api_key: None,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_SHEETS_API_URL.to_string(),
            spreadsheet_id: None,
            access_token: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        let layout = SheetLayout::default();
        Self {
            recent_done_days: DEFAULT_RECENT_DONE_DAYS,
            title_column_width: layout.title_column_width,
            column_width: layout.column_width,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.linear-report.toml` in current directory
    /// 2. `~/.config/linear-report/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> ConfigResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Path of the config file [`Config::load`] would read, if any exists.
    pub fn default_path() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        Self::config_dir().map(|d| d.join("config.toml")).filter(|p| p.exists())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Self = toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("linear-report"))
    }

    /// Copy of the configuration with inline secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]".to_string());

        let mut config = self.clone();
        config.linear.api_key = mask(&self.linear.api_key);
        config.sheets.access_token = mask(&self.sheets.access_token);
        config
    }
}

/// Everything a report run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Linear API key
    pub linear_api_key: SecretValue,
    /// Linear GraphQL endpoint
    pub linear_api_url: String,
    /// Issue filter
    pub query: IssueQuery,
    /// Target spreadsheet ID
    pub spreadsheet_id: Option<String>,
    /// Sheets API bearer token
    pub sheets_access_token: Option<SecretValue>,
    /// Sheets API base URL
    pub sheets_api_url: String,
    /// Recency window for completed issues, in days
    pub recent_done_days: u32,
    /// Column sizing
    pub layout: SheetLayout,
}

impl ReportSettings {
    /// Resolve settings from the config file and a property store.
    ///
    /// The property store wins over values inlined in the config file. Only the
    /// Linear API key is required here; the Sheets destination is checked by
    /// [`ReportSettings::destination`] so previews can run without it.
    pub fn resolve(config: &Config, properties: &dyn PropertySource) -> ConfigResult<Self> {
        let lookup = |credential: CredentialType, inline: &Option<String>| {
            properties.property(credential).or_else(|| {
                inline.as_deref().filter(|v| !v.trim().is_empty()).map(SecretValue::new)
            })
        };

        let linear_api_key = lookup(CredentialType::LinearApiKey, &config.linear.api_key)
            .ok_or_else(|| ConfigError::missing(CredentialType::LinearApiKey))?;

        if config.linear.fetch_limit == 0 {
            return Err(ConfigError::Invalid("linear.fetch_limit must be positive".to_string()));
        }
        if config.linear.label.trim().is_empty() {
            return Err(ConfigError::Invalid("linear.label must not be empty".to_string()));
        }

        let spreadsheet_id = lookup(CredentialType::SpreadsheetId, &config.sheets.spreadsheet_id)
            .map(|v| v.expose().trim().to_string());
        let sheets_access_token =
            lookup(CredentialType::SheetsAccessToken, &config.sheets.access_token);

        Ok(Self {
            linear_api_key,
            linear_api_url: config.linear.api_url.clone(),
            query: IssueQuery {
                label: config.linear.label.clone(),
                limit: config.linear.fetch_limit,
                ..IssueQuery::default()
            },
            spreadsheet_id,
            sheets_access_token,
            sheets_api_url: config.sheets.api_url.clone(),
            recent_done_days: config.report.recent_done_days,
            layout: SheetLayout {
                title_column_width: config.report.title_column_width,
                column_width: config.report.column_width,
            },
        })
    }

    /// Spreadsheet ID and access token, failing if either is missing.
    pub fn destination(&self) -> ConfigResult<(&str, &SecretValue)> {
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| ConfigError::missing(CredentialType::SpreadsheetId))?;
        let token = self
            .sheets_access_token
            .as_ref()
            .ok_or_else(|| ConfigError::missing(CredentialType::SheetsAccessToken))?;
        Ok((spreadsheet_id, token))
    }
}
