//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{ClientConfig, Environment};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable selecting the deployment environment.
pub const ENV_ENVIRONMENT: &str = "MARKETPLACE_ENV";
/// Environment variable overriding the backend origin.
pub const ENV_BASE_URL: &str = "MARKETPLACE_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid MARKETPLACE_ENV: {0}")]
    Environment(String),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), "Configuration file loaded");
    Ok(config)
}

/// Parse, apply environment overrides, and validate a TOML document.
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    let mut config: ClientConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(config)
}

/// Validate an already-built configuration.
pub fn validate(config: ClientConfig) -> Result<ClientConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `MARKETPLACE_ENV` / `MARKETPLACE_BASE_URL` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(env) = lookup(ENV_ENVIRONMENT) {
        config.api.environment = env.parse::<Environment>().map_err(ConfigError::Environment)?;
    }
    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.api.base_url = Some(base_url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_file() {
        let path = std::env::temp_dir().join(format!("mc_config_{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[api]\ntimeout_ms = 2500\n[upload]\nmethod = \"cos\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api.timeout_ms, 2500);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_error_display() {
        let err = toml::from_str::<ClientConfig>("[api]\ntimeout_ms = 0\n")
            .map_err(ConfigError::from)
            .and_then(validate)
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: api.timeout_ms: must be greater than zero");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ClientConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            ENV_ENVIRONMENT => Some("production".to_string()),
            ENV_BASE_URL => Some("https://canary.hoho.app".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api.environment, Environment::Production);
        assert_eq!(config.api.api_root(), "https://canary.hoho.app/api/v1");

        let err = apply_env_overrides(&mut config, |key| {
            (key == ENV_ENVIRONMENT).then(|| "moon".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Environment(_)));
    }
}
