//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ApiConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ApiConfig, ConfigError> {
    let config: ApiConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ApiConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert!(config.storage.data_path.is_none());
        assert!(config.storage.seed.is_empty());
    }

    #[test]
    fn test_full_file() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [storage]
            data_path = "data/contacts.json"
            seed = [{ nama = "Andi", telepon = "081234567890", email = "andi@gmail.com" }]

            [security]
            max_body_size = 1024
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.storage.data_path.as_deref(), Some("data/contacts.json"));
        assert_eq!(config.storage.seed[0].nama, "Andi");
        assert_eq!(config.security.max_body_size, 1024);
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_invalid_seed_rejected() {
        let err = parse_config(
            r#"
            [storage]
            seed = [{ nama = "Andi", telepon = "0812", email = "andi@yahoo.com" }]
            "#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: storage.seed[0]: Format email tidak valid"
        );
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_config("[listener"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_example_file_is_valid() {
        let config = parse_config(include_str!("../../contact-api.example.toml")).unwrap();
        assert_eq!(config.storage.seed.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_config(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
