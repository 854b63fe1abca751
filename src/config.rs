//! Configuration System
//!
//! Layered run configuration: built-in defaults, an optional TOML file, then
//! `MD5LIST_*` environment variables. CLI flags are applied on top by the binary.

use crate::digest::BLOCK_SIZE;
use crate::error::ScanError;
use crate::logging::LoggingConfig;
use crate::tree::walker::{WalkerConfig, DEFAULT_CHUNK_SIZE};
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Bytes requested per read while hashing
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Descend into symlinked directories
    #[serde(default = "default_follow_symlinks")]
    pub follow_symlinks: bool,

    /// Directory that receives the timestamped manifest
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_follow_symlinks() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            follow_symlinks: default_follow_symlinks(),
            output_dir: default_output_dir(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.chunk_size < BLOCK_SIZE {
            return Err(ScanError::Config(format!(
                "chunk_size must be at least {} bytes, got {}",
                BLOCK_SIZE, self.chunk_size
            )));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ScanError::Config("output_dir cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            chunk_size: self.chunk_size,
            excluded: Vec::new(),
        }
    }
}

/// Loads `ScanConfig` from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, then `config_file` if given, then the environment.
    ///
    /// A named file must exist.
    pub fn load(config_file: Option<&Path>) -> Result<ScanConfig, ScanError> {
        let mut builder = builder_with_defaults()?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("MD5LIST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: ScanConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ScanError> {
    Ok(Config::builder()
        .set_default("chunk_size", DEFAULT_CHUNK_SIZE as i64)?
        .set_default("follow_symlinks", true)?
        .set_default("output_dir", ".")?)
}
