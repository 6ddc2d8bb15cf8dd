//! Configuration file handling for hdr-bracket.
//!
//! Loads configuration from `~/.config/hdr-bracket/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::bracket::BracketRequest;
use crate::choices::Millistops;

/// Configuration file structure for hdr-bracket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub bracket: BracketConfig,
}

/// How to reach the camera and which gphoto2 settings to touch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraConfig {
    /// gphoto2 executable, looked up on PATH when not absolute.
    pub gphoto2: PathBuf,
    pub compensation_path: String,
    pub capture_target_path: String,
    /// Value written to `capture_target_path` before capturing; 1 is the
    /// memory card on most bodies.
    pub capture_target: Option<u32>,
    /// Settings logged before every session.
    pub status_paths: Vec<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            gphoto2: PathBuf::from("gphoto2"),
            compensation_path: "/main/capturesettings/exposurecompensation".to_string(),
            capture_target_path: "/main/settings/capturetarget".to_string(),
            capture_target: Some(1),
            status_paths: default_status_paths(),
        }
    }
}

/// Default bracket request when the command line does not give one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BracketConfig {
    pub shots: u32,
    pub ev_step: Millistops,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            shots: 3,
            ev_step: 1000,
        }
    }
}

impl From<&BracketConfig> for BracketRequest {
    fn from(bracket: &BracketConfig) -> Self {
        BracketRequest::new(bracket.shots, bracket.ev_step)
    }
}

fn default_status_paths() -> Vec<String> {
    [
        "/main/capturesettings/f-number",
        "/main/capturesettings/shutterspeed",
        "/main/imgsettings/iso",
        "/main/capturesettings/expprogram",
        "/main/capturesettings/capturemode",
        "/main/capturesettings/exposuremetermode",
        "/main/capturesettings/focusmetermode",
        "/main/capturesettings/exposurecompensation",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a path the user named explicitly.
    /// Unlike [`Config::load`], a missing file is an error.
    pub fn load_from_explicit(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write this configuration to `path`, creating parent directories.
    /// Refuses to overwrite an existing file.
    pub fn write_new(&self, path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

/// Errors that can occur when loading or writing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Config file '{}' already exists", .0.display())]
    AlreadyExists(PathBuf),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("hdr-bracket").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/hdr-bracket/config.toml")
        })
}
