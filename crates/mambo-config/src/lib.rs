//! Platform configuration for the Mambo bridge
//!
//! Configuration lives in `mambo.yaml` inside a config directory and is
//! loaded with a small set of custom YAML tags:
//!
//! - `!include path` - Include another YAML file
//! - `!secret key` - Substitute from secrets.yaml
//! - `!env_var VAR` - Environment variable substitution
//!
//! # Example
//!
//! ```ignore
//! use mambo_config::PlatformConfig;
//!
//! let config = PlatformConfig::load("/etc/mambo")?;
//! println!("{} recipes configured", config.recipes.len());
//! ```

mod error;
mod loader;
mod platform;
mod secrets;

pub use error::{ConfigError, ConfigResult};
pub use loader::YamlLoader;
pub use platform::{PlatformConfig, CONFIG_FILE, DEFAULT_BASE_URL, DEFAULT_PLATFORM_NAME};
pub use secrets::Secrets;

pub use serde_yaml::Value;
