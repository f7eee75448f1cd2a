//! Store configuration via `quire.toml`
//!
//! On first open, a commented default `quire.toml` is created in the storage
//! root. To change settings, edit the file and reopen the store, or pass a
//! [`QuireConfig`] to `Quire::open_with_config`, which writes it back.

use quire_core::{Error, Limits, Result, DEFAULT_MAX_NESTING_DEPTH, MAX_NESTING_DEPTH};
use quire_storage::{get_codec, Durability, StorageCodec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the storage root.
pub const CONFIG_FILE_NAME: &str = "quire.toml";

/// Store configuration loaded from `quire.toml`.
///
/// # Example
///
/// ```toml
/// durability = "always"
/// codec = "zstd"
/// max_depth = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuireConfig {
    /// Durability mode: `"always"` or `"cache"`.
    #[serde(default = "default_durability_str")]
    pub durability: String,
    /// Storage codec for new writes: `"identity"` or `"zstd"`.
    #[serde(default = "default_codec_str")]
    pub codec: String,
    /// Nesting limit for encode and decode, from 1 to 128.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_durability_str() -> String {
    "always".to_string()
}

fn default_codec_str() -> String {
    "identity".to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_NESTING_DEPTH
}

impl Default for QuireConfig {
    fn default() -> Self {
        Self {
            durability: default_durability_str(),
            codec: default_codec_str(),
            max_depth: default_max_depth(),
        }
    }
}

impl QuireConfig {
    /// Parse the durability string.
    ///
    /// # Errors
    ///
    /// `Config` if the string is not `"always"` or `"cache"`.
    pub fn durability_mode(&self) -> Result<Durability> {
        match self.durability.as_str() {
            "always" => Ok(Durability::Always),
            "cache" => Ok(Durability::Cache),
            other => Err(Error::Config(format!(
                "Invalid durability mode '{}' in {}. Expected \"always\" or \"cache\".",
                other, CONFIG_FILE_NAME
            ))),
        }
    }

    /// Instantiate the configured storage codec.
    ///
    /// # Errors
    ///
    /// `Config` if the codec name is unknown.
    pub fn storage_codec(&self) -> Result<Box<dyn StorageCodec>> {
        get_codec(&self.codec).map_err(|e| {
            Error::Config(format!(
                "{} in {}. Expected \"identity\" or \"zstd\".",
                e, CONFIG_FILE_NAME
            ))
        })
    }

    /// Limits derived from this configuration
    pub fn limits(&self) -> Limits {
        Limits::with_max_depth(self.max_depth)
    }

    /// Check every value eagerly.
    pub fn validate(&self) -> Result<()> {
        self.durability_mode()?;
        self.storage_codec()?;
        if self.max_depth == 0 || self.max_depth > MAX_NESTING_DEPTH {
            return Err(Error::Config(format!(
                "max_depth {} in {} must be between 1 and {}",
                self.max_depth, CONFIG_FILE_NAME, MAX_NESTING_DEPTH
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Quire store configuration
#
# Durability mode: "always" (default) or "cache"
#   "always" = fsync every record file and its directory before a write returns
#   "cache"  = leave flushing to the OS; writes stay atomic but the last ones
#              may be lost on power failure
durability = "always"

# Storage codec for new record files: "identity" (default) or "zstd"
# Existing files stay readable after a change.
codec = "identity"

# Maximum nesting depth of a stored value (default and highest: 128).
# Deeper graphs, including cyclic ones, fail to write.
max_depth = 128
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// `Config` if the file cannot be read, parsed, or holds invalid values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: QuireConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
