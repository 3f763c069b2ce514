//! Client configuration.
//!
//! TOML config, loaded user-level first (`~/.ambu/config.toml`) then
//! project-level (`./.ambu/config.toml`, overrides user). Only fields a file
//! actually sets override the running config; CLI flags and env vars are
//! applied on top by `main`.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// API endpoint settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.ambu-life.app/api".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Main configuration structure
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api: ApiConfig,
    pub token_file: Option<PathBuf>,
}

/// On-disk representation; every field optional so a file only overrides
/// what it sets.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: Option<ApiFileSection>,
    #[serde(default)]
    token_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiFileSection {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from default paths.
    /// Priority: project (./.ambu/config.toml) > user (~/.ambu/config.toml).
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".ambu").join("config.toml");
            if user_config.exists() {
                config.merge(read_config_file(&user_config)?);
            }
        }

        let project_config = Path::new(".ambu").join("config.toml");
        if project_config.exists() {
            config.merge(read_config_file(&project_config)?);
        }

        Ok(config)
    }

    /// Load configuration from a specific path, on top of defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(read_config_file(path)?);
        Ok(config)
    }

    /// Merge a config file into this one (the file takes priority for the
    /// fields it sets).
    fn merge(&mut self, file: ConfigFile) {
        if let Some(api) = file.api {
            if let Some(base_url) = api.base_url {
                self.api.base_url = base_url;
            }
            if let Some(timeout_ms) = api.timeout_ms {
                self.api.timeout_ms = timeout_ms;
            }
        }
        if file.token_file.is_some() {
            self.token_file = file.token_file;
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            errors.push(ValidationError {
                field: "api.base_url".to_string(),
                message: format!(
                    "Must start with http:// or https://, got '{}'",
                    self.api.base_url
                ),
            });
        }

        if self.api.timeout_ms == 0 {
            errors.push(ValidationError {
                field: "api.timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&content)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.ambu-life.app/api");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert!(config.token_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_overrides_only_set_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"http://localhost:5000/api\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        // timeout not set in the file, default survives.
        assert_eq!(config.api.timeout_ms, 10_000);
    }

    #[test]
    fn test_load_from_reads_token_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token_file = \"/tmp/ambu-token\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(
            config.token_file.as_deref(),
            Some(Path::new("/tmp/ambu-token"))
        );
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = Config::default();
        config.api.base_url = "ftp://api.example".to_string();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("base_url"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_ms = 0;
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("timeout_ms"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api = not toml").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}
