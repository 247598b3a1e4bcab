//! Config file loading (TOML format)

use crate::types::Config;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parse configuration from TOML text.
pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_config() {
        let config = load_config_from_str(
            r#"
            [limits]
            max_level = 4

            [encoder]
            buffer_capacity = 1024
            "#,
        )
        .unwrap();

        assert_eq!(config.limits.max_level, 4);
        // Unset fields keep their defaults
        assert_eq!(config.limits.max_len, 255);
        assert_eq!(config.encoder.buffer_capacity, 1024);
    }

    #[test]
    fn test_load_probe_defaults() {
        let config = load_config_from_str(
            r#"
            [probes]
            rate = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.probes.rate, 0.5);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let err = load_config_from_str("[limits\nmax_level = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[limits]\nmax_size = 7").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.limits.max_size, 7);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load_config(Path::new("/nonexistent/spyglass.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }
}
