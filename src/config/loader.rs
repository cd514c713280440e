//! Configuration loading from and saving to disk.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::schema::{FaucetConfig, DEFAULT_CONFIG_FILE};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Serialize error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Read a TOML file without validating it.
///
/// A missing [`DEFAULT_CONFIG_FILE`] yields the defaults so the CLI flags alone
/// can drive the faucet. Any other missing path is an error.
pub fn read_config(path: &Path) -> Result<FaucetConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound && path == Path::new(DEFAULT_CONFIG_FILE) => {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(FaucetConfig::default());
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load configuration, apply `overrides`, then validate the result.
pub fn load_config(
    path: &Path,
    overrides: impl FnOnce(&mut FaucetConfig),
) -> Result<FaucetConfig, ConfigError> {
    let mut config = read_config(path)?;
    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Write `config` as TOML.
pub fn save_config(path: &Path, config: &FaucetConfig) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(ConfigError::Io)?;
    }
    fs::write(path, content).map_err(ConfigError::Io)
}
