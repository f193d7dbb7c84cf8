//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix of environment variables overriding file settings,
/// e.g. `CHAIN_ROUTER__ROUTING__NOT_FOUND_ROUTE`.
pub const ENV_PREFIX: &str = "CHAIN_ROUTER__";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid override {key}={value}: {reason}")]
    Override {
        key: String,
        value: String,
        reason: String,
    },

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

/// Load, apply environment overrides and validate a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: AppConfig = toml::from_str(&content)?;

    apply_overrides(&mut config, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = ?path, modules = config.modules.len(), "Configuration loaded");
    Ok(config)
}

/// Apply `CHAIN_ROUTER__SECTION__KEY` overrides. Unknown keys with the
/// prefix are ignored; other variables are skipped.
pub fn apply_overrides<I>(config: &mut AppConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in vars {
        let Some(key) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key = key.to_lowercase().replace("__", ".");

        match key.as_str() {
            "app.environment" => config.app.environment = value,
            "app.debug" => {
                config.app.debug = value.parse().map_err(|_| ConfigError::Override {
                    key: key.clone(),
                    value: value.clone(),
                    reason: "expected true or false".to_string(),
                })?
            }
            "listener.bind_address" => config.listener.bind_address = value,
            "context.scheme" => config.context.scheme = value,
            "context.host" => config.context.host = value,
            "context.base_path" => config.context.base_path = value,
            "routing.not_found_route" => config.routing.not_found_route = value,
            "observability.log_level" => config.observability.log_level = value,
            _ => {
                tracing::warn!(variable = %name, "Ignoring unknown configuration override");
                continue;
            }
        }
        tracing::debug!(key = %key, "Configuration override applied");
    }
    Ok(())
}
