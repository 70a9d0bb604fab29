//! Scope configuration with TOML file support.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;
use crate::TmsError;

/// Identifies a token management scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TmsId {
    pub network: String,
    pub channel: String,
    pub namespace: String,
}

impl fmt::Display for TmsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.network, self.channel, self.namespace)
    }
}

/// Configuration for one token management scope.
///
/// Can be loaded from a TOML file via [`TmsConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmsConfig {
    #[serde(default = "default_network")]
    pub network: String,

    #[serde(default = "default_channel")]
    pub channel: String,

    /// Ledger namespace holding the scope's tokens and parameters.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Identifier of the driver the scope's public parameters must name.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Store only the SHA-256 of each token request instead of the request.
    #[serde(default)]
    pub store_token_request_hash: bool,

    /// Also record every issued output under the issued-history prefix.
    #[serde(default)]
    pub record_issued_history: bool,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "debug,tessera_ledger=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_network() -> String {
    "default".into()
}

fn default_channel() -> String {
    "default".into()
}

fn default_namespace() -> String {
    "token".into()
}

fn default_driver() -> String {
    "fabtoken/v1".into()
}

fn default_log_format() -> String {
    "human".into()
}

fn default_log_level() -> String {
    "info".into()
}

impl TmsConfig {
    pub fn from_toml_file(path: &str) -> Result<Self, TmsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| TmsError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, TmsError> {
        let config: Self = toml::from_str(s).map_err(|e| TmsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, TmsError> {
        toml::to_string_pretty(self).map_err(|e| TmsError::Config(e.to_string()))
    }

    /// The namespace becomes a ledger key component, so it may not contain
    /// reserved runes.
    pub fn validate(&self) -> Result<(), TmsError> {
        if self.namespace.is_empty() {
            return Err(TmsError::Config("namespace must not be empty".into()));
        }
        tessera_ledger::keys::validate_component(&self.namespace)
            .map_err(|e| TmsError::Config(format!("namespace: {e}")))?;
        if self.driver.is_empty() {
            return Err(TmsError::Config("driver must not be empty".into()));
        }
        self.log_format()?;
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, TmsError> {
        self.log_format.parse()
    }

    pub fn tms_id(&self) -> TmsId {
        TmsId {
            network: self.network.clone(),
            channel: self.channel.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl Default for TmsConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            channel: default_channel(),
            namespace: default_namespace(),
            driver: default_driver(),
            store_token_request_hash: false,
            record_issued_history: false,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
