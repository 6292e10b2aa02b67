//! Service configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::policy::DEFAULT_ALLOWED_EXTENSIONS;
use crate::{Result, ServiceError};

/// Environment variable overriding `storage.data_dir`
pub const DATA_DIR_ENV: &str = "DOCSTAMP_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Record storage configuration
    pub storage: StorageConfig,

    /// Upload whitelisting
    #[serde(default)]
    pub upload: UploadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the record database
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// File extensions accepted for timestamping and verification
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: PathBuf::from(".docstamp"),
            },
            upload: UploadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &std::path::Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ServiceError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                self.storage.data_dir = PathBuf::from(dir);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = ServiceConfig::from_toml(
            r#"
            [storage]
            data_dir = "/var/lib/docstamp"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/docstamp"));
        assert_eq!(config.upload.allowed_extensions, vec!["txt", "pdf", "docx", "doc"]);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_file_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("docstamp.toml");

        let mut config = ServiceConfig::default();
        config.upload.allowed_extensions = vec!["md".to_string()];
        config.logging.level = "debug".to_string();
        config.to_file(&path).unwrap();

        let loaded = ServiceConfig::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.upload.allowed_extensions, vec!["md"]);
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.storage.data_dir, config.storage.data_dir);
    }

    #[test]
    fn test_missing_storage_section_is_rejected() {
        let err = ServiceConfig::from_toml("[logging]\nlevel = \"info\"\n").unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ServiceConfig::from_file(std::path::Path::new("/nonexistent/docstamp.toml"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Io(_)));
    }
}
