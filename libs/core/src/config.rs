use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Connection settings for one Web Access service
///
/// Supplied once when a connector is built and never mutated afterwards.
/// Every request orchestrator spawned from the connector shares it read-only.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Root of the Web Access application, e.g. `https://host/WebAccess`
    pub base_url: String,

    /// Log in transparently the first time a call is rejected with 403
    #[serde(default)]
    pub login_on_demand: bool,

    #[serde(default)]
    pub login_user: String,

    #[serde(default)]
    pub login_password: String,

    /// Log off again after an operation that needed an on-demand login
    #[serde(default)]
    pub auto_log_off_on_demand: bool,
}

impl ConnectionInfo {
    /// Settings with no on-demand login
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_on_demand: false,
            login_user: String::new(),
            login_password: String::new(),
            auto_log_off_on_demand: false,
        }
    }

    /// Create a builder for configuring the connection
    pub fn builder(base_url: impl Into<String>) -> ConnectionInfoBuilder {
        ConnectionInfoBuilder::new(base_url)
    }

    /// Parse and validate settings from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let info: Self = toml::from_str(source)?;
        info.validate()?;
        Ok(info)
    }

    /// Read, parse and validate settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::invalid("base_url must not be empty"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid(format!("base_url {:?}: {}", self.base_url, e)))?;
        if self.login_on_demand && self.login_user.is_empty() {
            return Err(Error::invalid("login_on_demand requires login_user"));
        }
        Ok(())
    }

    /// Absolute URL of a service endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("base_url", &self.base_url)
            .field("login_on_demand", &self.login_on_demand)
            .field("login_user", &self.login_user)
            .field("login_password", &"*".repeat(self.login_password.len().min(8)))
            .field("auto_log_off_on_demand", &self.auto_log_off_on_demand)
            .finish()
    }
}

/// Builder for [`ConnectionInfo`]
pub struct ConnectionInfoBuilder {
    info: ConnectionInfo,
}

impl ConnectionInfoBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            info: ConnectionInfo::new(base_url),
        }
    }

    /// Enable on-demand login with the given credentials
    pub fn login_on_demand(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.info.login_on_demand = true;
        self.info.login_user = user.into();
        self.info.login_password = password.into();
        self
    }

    /// Set the credentials without enabling on-demand login
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.info.login_user = user.into();
        self.info.login_password = password.into();
        self
    }

    pub fn auto_log_off_on_demand(mut self, enabled: bool) -> Self {
        self.info.auto_log_off_on_demand = enabled;
        self
    }

    /// Validate and return the settings
    pub fn build(self) -> Result<ConnectionInfo> {
        self.info.validate()?;
        Ok(self.info)
    }
}
