//! Credential store for the report.
//!
//! Credentials are looked up, in order, from:
//! - environment variables (including a `.env` file loaded at startup)
//! - the operating system's native credential storage:
//!   - macOS: Keychain
//!   - Windows: Credential Manager
//!   - Linux: Secret Service (GNOME Keyring, KDE Wallet, etc.)
//!
//! The configuration file is the last fallback and is handled by
//! [`crate::core::ReportSettings::resolve`].
//!
//! Secret values are zeroed on drop and never printed.

#[cfg(feature = "secrets")]
use keyring::Entry;
#[cfg(feature = "secrets")]
use zeroize::Zeroize;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The service name used for keyring entries.
const SERVICE_NAME: &str = "linear-report";

/// Result type for secrets operations.
pub type SecretsResult<T> = Result<T, SecretsError>;

/// Errors that can occur during secrets operations.
#[derive(Debug, Error)]
pub enum SecretsError {
    /// Failed to access the system keychain.
    #[error("Failed to access system keychain: {0}")]
    KeychainAccess(String),

    /// Secret not found.
    #[error("Secret not found: {0}")]
    NotFound(String),

    /// Failed to store secret.
    #[error("Failed to store secret: {0}")]
    StoreFailed(String),

    /// Failed to delete secret.
    #[error("Failed to delete secret: {0}")]
    DeleteFailed(String),

    /// Unknown credential name.
    #[error("Unknown credential '{0}' (expected linear_api_key, spreadsheet_id or sheets_access_token)")]
    UnknownCredential(String),

    /// Feature not available.
    #[error("Secrets feature not available - compile with 'secrets' feature")]
    FeatureNotAvailable,
}

/// A secret value that is zeroed on drop.
#[cfg(feature = "secrets")]
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue {
    value: String,
}

#[cfg(not(feature = "secrets"))]
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue {
    value: String,
}

impl SecretValue {
    /// Create a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    /// Get the secret value.
    ///
    /// Note: Use sparingly and ensure the value is not logged.
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Get the length of the secret.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Check if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

// Prevent accidental logging of secrets
impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue([REDACTED])")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Values the report resolves from the credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialType {
    /// Linear personal API key.
    LinearApiKey,
    /// Target spreadsheet ID.
    SpreadsheetId,
    /// OAuth bearer token for the Google Sheets API.
    SheetsAccessToken,
}

impl CredentialType {
    /// All credential types.
    pub const ALL: [Self; 3] = [Self::LinearApiKey, Self::SpreadsheetId, Self::SheetsAccessToken];

    /// Get the key name for this credential type.
    pub fn key_name(&self) -> &'static str {
        match self {
            Self::LinearApiKey => "linear_api_key",
            Self::SpreadsheetId => "spreadsheet_id",
            Self::SheetsAccessToken => "sheets_access_token",
        }
    }

    /// Environment variable that overrides the stored value.
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::LinearApiKey => "LINEAR_API_KEY",
            Self::SpreadsheetId => "SPREADSHEET_ID",
            Self::SheetsAccessToken => "GOOGLE_SHEETS_TOKEN",
        }
    }
}

impl FromStr for CredentialType {
    type Err = SecretsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key_name() == s || c.env_var() == s)
            .ok_or_else(|| SecretsError::UnknownCredential(s.to_string()))
    }
}

/// A key-value store the report settings are resolved from.
pub trait PropertySource {
    /// Look up a credential, `None` when the store has no value for it.
    fn property(&self, credential: CredentialType) -> Option<SecretValue>;
}

/// Fixed in-memory properties, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticProperties {
    values: HashMap<CredentialType, SecretValue>,
}

impl StaticProperties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value.
    pub fn with(mut self, credential: CredentialType, value: impl Into<String>) -> Self {
        self.values.insert(credential, SecretValue::new(value));
        self
    }
}

impl PropertySource for StaticProperties {
    fn property(&self, credential: CredentialType) -> Option<SecretValue> {
        self.values.get(&credential).cloned()
    }
}

/// Manages secrets storage and retrieval.
#[derive(Debug)]
pub struct SecretsManager {
    /// Service name for keyring entries.
    service: String,
}

impl Default for SecretsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretsManager {
    /// Create a new secrets manager.
    pub fn new() -> Self {
        Self { service: SERVICE_NAME.to_string() }
    }

    /// Create a secrets manager with a custom service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    /// Store a secret in the system keychain.
    #[cfg(feature = "secrets")]
    pub fn store(&self, credential_type: CredentialType, secret: &SecretValue) -> SecretsResult<()> {
        let entry = Entry::new(&self.service, credential_type.key_name())
            .map_err(|e| SecretsError::KeychainAccess(e.to_string()))?;

        entry.set_password(secret.expose()).map_err(|e| SecretsError::StoreFailed(e.to_string()))
    }

    /// Store a secret in the system keychain.
    #[cfg(not(feature = "secrets"))]
    pub fn store(
        &self,
        _credential_type: CredentialType,
        _secret: &SecretValue,
    ) -> SecretsResult<()> {
        Err(SecretsError::FeatureNotAvailable)
    }

    /// Retrieve a secret from the system keychain.
    #[cfg(feature = "secrets")]
    pub fn retrieve(&self, credential_type: CredentialType) -> SecretsResult<SecretValue> {
        let key = credential_type.key_name();
        let entry = Entry::new(&self.service, key)
            .map_err(|e| SecretsError::KeychainAccess(e.to_string()))?;

        let password = entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => SecretsError::NotFound(key.to_string()),
            other => SecretsError::KeychainAccess(other.to_string()),
        })?;

        Ok(SecretValue::new(password))
    }

    /// Retrieve a secret from the system keychain.
    #[cfg(not(feature = "secrets"))]
    pub fn retrieve(&self, _credential_type: CredentialType) -> SecretsResult<SecretValue> {
        Err(SecretsError::FeatureNotAvailable)
    }

    /// Delete a secret from the system keychain.
    #[cfg(feature = "secrets")]
    pub fn delete(&self, credential_type: CredentialType) -> SecretsResult<()> {
        let entry = Entry::new(&self.service, credential_type.key_name())
            .map_err(|e| SecretsError::KeychainAccess(e.to_string()))?;

        entry.delete_credential().map_err(|e| SecretsError::DeleteFailed(e.to_string()))
    }

    /// Delete a secret from the system keychain.
    #[cfg(not(feature = "secrets"))]
    pub fn delete(&self, _credential_type: CredentialType) -> SecretsResult<()> {
        Err(SecretsError::FeatureNotAvailable)
    }

    /// Check if a secret exists in the keychain.
    pub fn exists(&self, credential_type: CredentialType) -> bool {
        self.retrieve(credential_type).is_ok()
    }

    /// Get a secret from environment variable or keychain.
    pub fn get_or_env(&self, credential_type: CredentialType) -> SecretsResult<SecretValue> {
        // First try environment variable
        if let Ok(value) = std::env::var(credential_type.env_var()) {
            if !value.trim().is_empty() {
                return Ok(SecretValue::new(value));
            }
        }

        // Then try keychain
        self.retrieve(credential_type)
    }
}

impl PropertySource for SecretsManager {
    fn property(&self, credential: CredentialType) -> Option<SecretValue> {
        match self.get_or_env(credential) {
            Ok(value) if !value.is_empty() => Some(value),
            Ok(_) | Err(SecretsError::NotFound(_) | SecretsError::FeatureNotAvailable) => None,
            Err(e) => {
                tracing::warn!(credential = credential.key_name(), error = %e, "Keychain lookup failed");
                None
            }
        }
    }
}
