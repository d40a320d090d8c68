//! Runtime configuration for the chat core.
//!
//! Configuration is plain data deserialised from JSON. Every field has a
//! default, so an empty object yields [`ColloquyConfig::default`].
//!
//! # Examples
//!
//! ```
//! use colloquy::config::ColloquyConfig;
//!
//! let config = ColloquyConfig::from_json_str(r#"{ "submission": { "preview_max_chars": 40 } }"#)
//!     .expect("valid configuration");
//! assert_eq!(config.submission.preview_max_chars, 40);
//! assert_eq!(config.submission.max_body_chars, 4000);
//! ```

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColloquyConfig {
    /// Outgoing message limits and preview shaping.
    pub submission: SubmissionConfig,
    /// Attachment download cache sizing.
    pub attachment_cache: AttachmentCacheConfig,
}

impl ColloquyConfig {
    /// Parses configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is malformed and
    /// [`ConfigError::Invalid`] when a limit is zero.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// The file is read through a capability handle on its parent
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when `path` names no file or the file
    /// cannot be read, otherwise the errors of [`Self::from_json_str`].
    pub fn from_path(path: &Utf8Path) -> Result<Self, ConfigError> {
        let file_name = path.file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("configuration path {path} has no file name"),
            )
        })?;
        let parent = path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
        let contents = dir.read_to_string(file_name)?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.submission.max_body_chars == 0 {
            return Err(ConfigError::Invalid("submission.max_body_chars must be positive"));
        }
        if self.submission.preview_max_chars == 0 {
            return Err(ConfigError::Invalid(
                "submission.preview_max_chars must be positive",
            ));
        }
        Ok(())
    }
}

/// Limits applied by the submission pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Maximum body length in characters.
    pub max_body_chars: usize,
    /// Maximum conversation preview length in characters, before the
    /// trailing ellipsis.
    pub preview_max_chars: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            max_body_chars: 4000,
            preview_max_chars: 80,
        }
    }
}

impl SubmissionConfig {
    /// Creates a strict configuration with reduced limits.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_body_chars: 1000,
            preview_max_chars: 40,
        }
    }
}

/// Sizing for the attachment download cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttachmentCacheConfig {
    /// Maximum number of cached attachments.
    pub capacity: usize,
}

impl Default for AttachmentCacheConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document is malformed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}
