//! Configuration system for tf2rust
//!
//! This module provides a trait-based configuration system that supports:
//! - Type-safe config structs via serde
//! - TOML file format
//! - Auto-generation of default configs
//! - Manual reload capability
//!
//! # Example
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//! use tf2rust_core::PluginConfig;
//!
//! #[derive(Default, Serialize, Deserialize)]
//! pub struct MyPluginConfig {
//!     pub fov: f32,
//!     pub highlight_buildings: bool,
//! }
//!
//! impl PluginConfig for MyPluginConfig {
//!     const PLUGIN_NAME: &'static str = "my_plugin";
//! }
//!
//! fn load_config() {
//!     let config = MyPluginConfig::load().unwrap_or_default();
//!     println!("FOV: {}", config.fov);
//! }
//! ```

mod loader;

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub use loader::{
    base_dir_from_binary, configs_dir, core_config_path, gamedata_dir, plugin_binary_path,
    plugin_config_path, tf2rust_base_dir,
};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Could not determine config directory from plugin location
    #[error("Config directory not available - could not resolve plugin base path")]
    NoConfigDirectory,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Trait for plugin configuration types.
///
/// Implement this trait on your config struct to enable automatic loading,
/// saving, and reloading of configuration files.
///
/// # Requirements
///
/// Your config type must implement:
/// - `Default` - for generating initial config files
/// - `Serialize` - for saving to TOML
/// - `DeserializeOwned` - for loading from TOML
/// - `Send + Sync` - for thread-safe access
///
/// # File Location
///
/// Configs are stored at:
/// `tf/addons/tf2rust/configs/plugins/{PLUGIN_NAME}/{PLUGIN_NAME}.toml`
pub trait PluginConfig: Default + Serialize + DeserializeOwned + Send + Sync {
    /// The plugin name used for config file path resolution.
    ///
    /// This determines the config file location:
    /// `configs/plugins/{PLUGIN_NAME}/{PLUGIN_NAME}.toml`
    const PLUGIN_NAME: &'static str;

    /// Load config from file, creating default if missing.
    fn load() -> ConfigResult<Self> {
        let path = plugin_config_path(Self::PLUGIN_NAME)?;
        load_or_create(&path)
    }

    /// Save config to file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> ConfigResult<()> {
        let path = plugin_config_path(Self::PLUGIN_NAME)?;
        save_to(self, &path)
    }

    /// Reload config from file.
    fn reload(&mut self) -> ConfigResult<()> {
        let path = plugin_config_path(Self::PLUGIN_NAME)?;
        *self = read_from(&path)?;
        Ok(())
    }
}

/// Read and parse a TOML config
pub fn read_from<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Write a config as pretty TOML, creating parent directories
pub fn save_to<T: Serialize>(config: &T, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::debug!("Saved config to {:?}", path);
    Ok(())
}

/// Load `path`, writing the default config there first if it is missing
pub fn load_or_create<T: Default + Serialize + DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    if path.exists() {
        return read_from(path);
    }
    let default = T::default();
    save_to(&default, path)?;
    tracing::info!("Created default config at {:?}", path);
    Ok(default)
}

/// Core framework configuration.
///
/// Loaded from `tf/addons/tf2rust/configs/core.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Config version for future migration support
    pub version: u32,

    /// `tracing` filter directive (e.g. "info", "tf2rust_core=debug")
    pub log_level: String,

    /// Gamedata file; relative paths are joined to the tf2rust base directory
    pub gamedata_path: String,

    /// Resolve every known RecvProp during load instead of on first access
    pub prefetch_netvars: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: 1,
            log_level: "info".to_owned(),
            gamedata_path: "gamedata/tf2rust.games.json".to_owned(),
            prefetch_netvars: false,
        }
    }
}

impl CoreConfig {
    /// Load core config from file, creating default if missing.
    pub fn load() -> ConfigResult<Self> {
        load_or_create(&core_config_path()?)
    }

    /// Save core config to file.
    pub fn save(&self) -> ConfigResult<()> {
        save_to(self, &core_config_path()?)
    }

    /// Reload core config from file.
    pub fn reload(&mut self) -> ConfigResult<()> {
        *self = read_from(&core_config_path()?)?;
        Ok(())
    }

    /// Absolute gamedata path, relative to `base` unless already absolute
    pub fn gamedata_file(&self, base: &Path) -> PathBuf {
        let path = Path::new(&self.gamedata_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }
}
