//! Typed platform configuration

use crate::error::{ConfigError, ConfigResult};
use crate::loader::YamlLoader;
use mambo_core::Recipe;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration file inside the config directory
pub const CONFIG_FILE: &str = "mambo.yaml";

/// Vendor cloud endpoint used when `base_url` is not configured
pub const DEFAULT_BASE_URL: &str = "https://api.cecotec.com";

/// Platform identifier registered with the host
pub const DEFAULT_PLATFORM_NAME: &str = "MamboPlatform";

fn default_platform() -> String {
    DEFAULT_PLATFORM_NAME.to_string()
}

fn default_name() -> String {
    "Mambo".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Configuration consumed by the Mambo platform
///
/// `token` is written back through the host whenever a login yields a new
/// one; every other field is read-only for the platform.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_platform")]
    pub platform: String,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    /// Ordered recipes; the order defines the recipe selector indices
    #[serde(default)]
    pub recipes: Vec<Recipe>,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("platform", &self.platform)
            .field("name", &self.name)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("recipes", &self.recipes.len())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl PlatformConfig {
    /// Build a config from credentials with every other field defaulted
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            platform: default_platform(),
            name: default_name(),
            token: None,
            email: email.into(),
            password: password.into(),
            recipes: Vec::new(),
            base_url: default_base_url(),
        }
    }

    /// Load `mambo.yaml` from the config directory
    pub fn load(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let config_dir = config_dir.as_ref();
        let mut loader = YamlLoader::new(config_dir)?;
        let value = loader.load_file(CONFIG_FILE)?;
        let config = Self::from_value(value)?;

        info!(
            platform = %config.platform,
            recipes = config.recipes.len(),
            has_token = config.token.is_some(),
            "Loaded platform configuration"
        );

        Ok(config)
    }

    /// Deserialize an already tag-processed YAML value
    pub fn from_value(value: serde_yaml::Value) -> ConfigResult<Self> {
        let config: Self =
            serde_yaml::from_value(value).map_err(|source| ConfigError::Schema { source })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.token.is_none() && (self.email.is_empty() || self.password.is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "email".to_string(),
                reason: "email and password are required when no token is configured"
                    .to_string(),
            });
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "base_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        Ok(())
    }

    /// JSON form handed to the host when asking it to persist the config
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        serde_yaml::to_string(self).map_err(|source| ConfigError::Schema { source })
    }
}
