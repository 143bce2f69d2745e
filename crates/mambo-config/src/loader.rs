//! YAML loader resolving the custom config tags
//!
//! - `!include path` splices in another file, relative to the including file
//! - `!secret key` substitutes a value from secrets.yaml
//! - `!env_var NAME` substitutes an environment variable
//!
//! Unknown tags are kept as they are, with their contents still resolved.

use crate::error::{ConfigError, ConfigResult};
use crate::secrets::Secrets;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Tags the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Include,
    Secret,
    EnvVar,
}

impl Tag {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "!include" => Some(Tag::Include),
            "!secret" => Some(Tag::Secret),
            "!env_var" => Some(Tag::EnvVar),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Tag::Include => "!include",
            Tag::Secret => "!secret",
            Tag::EnvVar => "!env_var",
        }
    }

    /// Every supported tag takes one string argument
    fn argument(self, value: Value) -> ConfigResult<String> {
        match (self, value) {
            (_, Value::String(arg)) => Ok(arg),
            (Tag::Include, other) => Err(ConfigError::InvalidIncludePath {
                path: format!("{:?}", other),
                reason: "path must be a string".to_string(),
            }),
            (tag, _) => Err(ConfigError::InvalidValue {
                key: tag.name().to_string(),
                reason: "argument must be a string".to_string(),
            }),
        }
    }
}

/// Loads YAML files from a config directory, resolving tags as it goes
pub struct YamlLoader {
    config_dir: PathBuf,
    secrets: Secrets,
    /// Chain of files being loaded, outermost first
    loading: Vec<PathBuf>,
}

impl YamlLoader {
    /// Loader for a config directory, reading its secrets.yaml if present
    pub fn new(config_dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_dir = config_dir.into();
        let secrets = Secrets::load(&config_dir)?;
        Ok(Self::with_secrets(config_dir, secrets))
    }

    fn with_secrets(config_dir: impl Into<PathBuf>, secrets: Secrets) -> Self {
        Self {
            config_dir: config_dir.into(),
            secrets,
            loading: Vec::new(),
        }
    }

    /// Load a file; relative paths are taken from the config directory
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let joined = self.config_dir.join(path.as_ref());
        // Canonical paths so the same file reached two ways is still a cycle
        let path = fs::canonicalize(&joined).unwrap_or(joined);
        if self.loading.contains(&path) {
            return Err(ConfigError::CircularInclude { path });
        }

        debug!(path = %path.display(), "Loading YAML file");
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
            path: path.clone(),
            source,
        })?;

        self.loading.push(path.clone());
        let loaded = self.load_string(&content, &path);
        self.loading.pop();
        loaded
    }

    /// Parse YAML text; `source_path` anchors relative includes
    fn load_string(&mut self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        let value = serde_yaml::from_str(content).map_err(|source| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source,
        })?;
        self.resolve(value, source_path)
    }

    fn resolve(&mut self, value: Value, source_path: &Path) -> ConfigResult<Value> {
        Ok(match value {
            Value::Tagged(tagged) => self.resolve_tagged(*tagged, source_path)?,
            Value::Mapping(map) => {
                let mut resolved = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    resolved.insert(key, self.resolve(value, source_path)?);
                }
                Value::Mapping(resolved)
            }
            Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|item| self.resolve(item, source_path))
                    .collect::<ConfigResult<_>>()?,
            ),
            scalar => scalar,
        })
    }

    fn resolve_tagged(&mut self, tagged: TaggedValue, source_path: &Path) -> ConfigResult<Value> {
        let Some(tag) = Tag::parse(&tagged.tag.to_string()) else {
            trace!(tag = %tagged.tag, "Keeping unknown tag");
            let value = self.resolve(tagged.value, source_path)?;
            return Ok(Value::Tagged(Box::new(TaggedValue {
                tag: tagged.tag,
                value,
            })));
        };

        let arg = tag.argument(tagged.value)?;
        match tag {
            Tag::Include => {
                let target = self.include_target(&arg, source_path);
                self.load_file(target)
            }
            Tag::Secret => {
                trace!(key = %arg, "Substituting secret");
                Ok(Value::String(self.secrets.get(&arg)?.to_string()))
            }
            Tag::EnvVar => std::env::var(&arg)
                .map(Value::String)
                .map_err(|_| ConfigError::EnvVarNotFound { var: arg }),
        }
    }

    /// Include targets are relative to the directory of the including file
    fn include_target(&self, path: &str, source_path: &Path) -> PathBuf {
        let base = source_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(&self.config_dir);
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load_yaml(dir: &Path, file: &str) -> ConfigResult<Value> {
        YamlLoader::new(dir)?.load_file(file)
    }

    fn load_yaml_string(dir: &Path, content: &str, source_name: &str) -> ConfigResult<Value> {
        YamlLoader::new(dir)?.load_string(content, &dir.join(source_name))
    }

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
        value.as_mapping()?.get(&Value::String(key.to_string()))
    }

    #[test]
    fn test_include_relative_to_including_file() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "recipes/list.yaml",
            "- id: 1\n  name: Rice\n",
        );
        write_file(
            dir.path(),
            "mambo.yaml",
            "email: a@b.c\nrecipes: !include recipes/list.yaml\n",
        );

        let value = load_yaml(dir.path(), "mambo.yaml").unwrap();
        let recipes = get(&value, "recipes").unwrap().as_sequence().unwrap();
        assert_eq!(recipes.len(), 1);
    }

    #[test]
    fn test_secret() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "mambo_password: secret123\n");
        write_file(dir.path(), "mambo.yaml", "password: !secret mambo_password\n");

        let value = load_yaml(dir.path(), "mambo.yaml").unwrap();
        assert_eq!(
            get(&value, "password"),
            Some(&Value::String("secret123".to_string()))
        );
    }

    #[test]
    fn test_missing_secret() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "mambo.yaml", "password: !secret nope\n");

        let result = load_yaml(dir.path(), "mambo.yaml");
        assert!(matches!(result, Err(ConfigError::SecretNotFound { .. })));
    }

    #[test]
    fn test_env_var() {
        let dir = TempDir::new().unwrap();
        std::env::set_var("TEST_MAMBO_CONFIG_EMAIL", "env@example.com");
        write_file(
            dir.path(),
            "mambo.yaml",
            "email: !env_var TEST_MAMBO_CONFIG_EMAIL\n",
        );

        let value = load_yaml(dir.path(), "mambo.yaml").unwrap();
        assert_eq!(
            get(&value, "email"),
            Some(&Value::String("env@example.com".to_string()))
        );
    }

    #[test]
    fn test_missing_env_var() {
        let dir = TempDir::new().unwrap();
        let result = load_yaml_string(
            dir.path(),
            "email: !env_var TEST_MAMBO_CONFIG_SURELY_UNSET\n",
            "inline.yaml",
        );
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound { .. })));
    }

    #[test]
    fn test_circular_include_detection() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.yaml", "b: !include b.yaml\n");
        write_file(dir.path(), "b.yaml", "a: !include a.yaml\n");

        let result = load_yaml(dir.path(), "a.yaml");
        assert!(matches!(result, Err(ConfigError::CircularInclude { .. })));
    }

    #[test]
    fn test_non_string_secret_key() {
        let dir = TempDir::new().unwrap();
        let result = load_yaml_string(dir.path(), "password: !secret [a, b]\n", "inline.yaml");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
