//! File type whitelisting for uploaded documents

use std::collections::HashSet;
use std::path::Path;

use crate::config::UploadConfig;
use crate::{Result, ServiceError};

/// Extensions accepted when none are configured
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf", "docx", "doc"];

/// Decides which uploaded files may be timestamped or verified
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed_extensions: HashSet<String>,
}

impl UploadPolicy {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(&config.allowed_extensions)
    }

    /// A file name is allowed when it contains a dot and its final
    /// extension is whitelisted, compared case-insensitively
    pub fn is_allowed(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((_, extension)) => self
                .allowed_extensions
                .contains(&extension.to_ascii_lowercase()),
            None => false,
        }
    }

    /// Check the final component of a path against the whitelist
    pub fn check(&self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if file_name.is_empty() || !self.is_allowed(&file_name) {
            return Err(ServiceError::DisallowedFileType(path.display().to_string()));
        }

        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_EXTENSIONS)
    }
}
