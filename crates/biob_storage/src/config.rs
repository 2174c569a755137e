//! Storage backend configuration.
//!
//! Selects a backend from a TOML file or string, with `BIOB_`-prefixed
//! environment variables overriding file values:
//!
//! ```toml
//! backend = "file_system"
//! base_path = "/var/biob"
//! ```

use crate::{BinaryObjectStorage, FileSystemStorage, InMemoryStorage};
use biob_error::{StorageError, StorageErrorKind, StorageResult};
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "BIOB";

/// Which storage backend to use and how to set it up.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process-local storage that is lost on exit
    #[default]
    Memory,
    /// Durable storage below a base directory
    FileSystem {
        /// Root directory for payload and metadata files
        base_path: PathBuf,
    },
}

impl StorageConfig {
    /// Load configuration from a TOML file, applying environment overrides.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> StorageResult<Self> {
        debug!("Loading storage configuration from file");

        let builder =
            Config::builder().add_source(File::from(path.as_ref()).format(FileFormat::Toml));
        Self::finish(builder, &path.as_ref().display().to_string())
    }

    /// Parse configuration from TOML text, applying environment overrides.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a valid storage configuration.
    #[instrument(skip(contents))]
    pub fn from_toml_str(contents: &str) -> StorageResult<Self> {
        let builder = Config::builder().add_source(File::from_str(contents, FileFormat::Toml));
        Self::finish(builder, "inline TOML")
    }

    fn finish(builder: ConfigBuilder<DefaultState>, origin: &str) -> StorageResult<Self> {
        builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| {
                StorageError::new(StorageErrorKind::InvalidConfig(format!(
                    "Failed to read configuration from {}: {}",
                    origin, e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StorageError::new(StorageErrorKind::InvalidConfig(format!(
                    "Failed to parse configuration from {}: {}",
                    origin, e
                )))
            })
    }

    /// Construct the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if a filesystem base directory cannot be created.
    #[instrument]
    pub fn build(&self) -> StorageResult<Arc<dyn BinaryObjectStorage>> {
        match self {
            StorageConfig::Memory => {
                debug!("Using in-memory storage");
                Ok(Arc::new(InMemoryStorage::new()))
            }
            StorageConfig::FileSystem { base_path } => {
                if base_path.as_os_str().is_empty() {
                    return Err(StorageError::new(StorageErrorKind::InvalidConfig(
                        "base_path must not be empty".to_string(),
                    )));
                }
                Ok(Arc::new(FileSystemStorage::new(base_path.clone())?))
            }
        }
    }
}
