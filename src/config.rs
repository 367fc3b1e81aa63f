use crate::backup::data::{SyncOptions, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_DEPTH, MAX_CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration structure for the application.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Where live save data is found, laid out as `<title id>/<user id | system>`.
    pub save_root: PathBuf,
    /// Where backup slots are stored, one folder per title.
    pub backup_root: PathBuf,
    /// Copy buffer size in bytes.
    pub chunk_size: usize,
    /// Deepest directory nesting the copy and delete walks will enter.
    pub max_depth: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            save_root: PathBuf::from("saves"),
            backup_root: PathBuf::from("backups"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AppConfig {
    /// Rejects settings the copy and delete walks cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            log::warn!("Validation failed: chunk_size is zero");
            return Err("chunk_size must be greater than zero".to_string());
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            log::warn!("Validation failed: chunk_size {} is too large", self.chunk_size);
            return Err(format!("chunk_size must be at most {} bytes", MAX_CHUNK_SIZE));
        }
        if self.max_depth == 0 {
            log::warn!("Validation failed: max_depth is zero");
            return Err("max_depth must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            chunk_size: self.chunk_size,
            max_depth: self.max_depth,
        }
    }
}

/// Resolves the path to the configuration file.
///
/// Attempts to locate `config.json` in the same directory as the executable.
/// Defaults to `config.json` in the current working directory if the executable path cannot be determined.
pub fn get_config_path() -> PathBuf {
    std::env::current_exe()
        .map(|p| p.parent().unwrap_or(Path::new(".")).join("config.json"))
        .unwrap_or_else(|_| PathBuf::from("config.json"))
}

/// Loads configuration from a specific file path.
///
/// Returns `AppConfig::default()` if the file does not exist or cannot be parsed.
pub fn load_config_from_path(path: &Path) -> AppConfig {
    log::info!("Loading configuration from: {:?}", path);
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    log::info!("Configuration loaded successfully");
                    return config;
                }
                Err(e) => log::error!("Failed to parse configuration: {}", e),
            },
            Err(e) => log::error!("Failed to read configuration file: {}", e),
        }
    } else {
        log::info!("Configuration file not found, using defaults");
    }
    AppConfig::default()
}

/// Loads the initial configuration from `explicit` or the default location.
pub fn load_initial_config(explicit: Option<&Path>) -> AppConfig {
    match explicit {
        Some(path) => load_config_from_path(path),
        None => load_config_from_path(&get_config_path()),
    }
}
