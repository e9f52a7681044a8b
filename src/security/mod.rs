//! Security module.
//!
//! Owns the credential store: API keys, spreadsheet ID and access tokens are
//! resolved from the environment or the OS keychain and held in redacted,
//! zeroize-on-drop values.

mod secrets;

pub use secrets::{
    CredentialType, PropertySource, SecretValue, SecretsError, SecretsManager, SecretsResult,
    StaticProperties,
};
