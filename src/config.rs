//! Configuration file support for the editor.
//!
//! Editing preferences are stored as JSON in the platform config directory
//! and handed to [`crate::editor::EditorSession`] when an image is opened.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    FIT_MARGIN, HANDLE_HALO, HANDLE_SIZE, MIN_DRAW_EXTENT, UNDO_HISTORY_SIZE, ZOOM_STEP,
};
use crate::hit_test::HitTestParams;
use crate::viewport::ZoomAnchor;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration that can be saved and reloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Editing preferences
    #[serde(default)]
    pub preferences: EditorPreferences,
}

/// Editing behaviour knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorPreferences {
    /// Leave draw mode after each drawn shape
    #[serde(default = "default_true")]
    pub auto_disable_draw_mode: bool,

    /// Fraction of the viewport the fitted image fills
    #[serde(default = "default_fit_margin")]
    pub fit_margin: f64,

    /// Zoom factor per wheel notch
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,

    /// Point kept fixed while wheel zooming
    #[serde(default)]
    pub zoom_anchor: ZoomAnchor,

    /// Handle side in view pixels
    #[serde(default = "default_handle_size")]
    pub handle_size: f64,

    /// Extra grab tolerance around handles in view pixels
    #[serde(default = "default_handle_halo")]
    pub handle_halo: f64,

    /// Minimum world-space width and height of a drawn box
    #[serde(default = "default_min_draw_extent")]
    pub min_draw_extent: f64,

    /// Number of undo snapshots kept per image
    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,

    /// Label tabs above shapes count as part of the shape when clicking
    #[serde(default)]
    pub label_hit_area: bool,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_true() -> bool {
    true
}

fn default_fit_margin() -> f64 {
    FIT_MARGIN
}

fn default_zoom_step() -> f64 {
    ZOOM_STEP
}

fn default_handle_size() -> f64 {
    HANDLE_SIZE
}

fn default_handle_halo() -> f64 {
    HANDLE_HALO
}

fn default_min_draw_extent() -> f64 {
    MIN_DRAW_EXTENT
}

fn default_undo_limit() -> usize {
    UNDO_HISTORY_SIZE
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            auto_disable_draw_mode: default_true(),
            fit_margin: default_fit_margin(),
            zoom_step: default_zoom_step(),
            zoom_anchor: ZoomAnchor::default(),
            handle_size: default_handle_size(),
            handle_halo: default_handle_halo(),
            min_draw_extent: default_min_draw_extent(),
            undo_limit: default_undo_limit(),
            label_hit_area: false,
            log_level: LogLevel::default(),
        }
    }
}

impl EditorPreferences {
    /// Hit-test sizes derived from these preferences.
    pub fn hit_test_params(&self) -> HitTestParams {
        HitTestParams {
            handle_size: self.handle_size,
            handle_halo: self.handle_halo,
            label_hit_area: self.label_hit_area,
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: EditorPreferences::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // XDG config directory, falling back to ~/.config
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home_dir| home_dir.join(".config")))
            .map(|dir| dir.join("yolo_editor").join(Self::default_filename()))
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load `path`, falling back to defaults if it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load configuration from the default path, or defaults.
    pub fn load_from_default_path() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        }
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save(&path)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No platform config or home directory
    #[error("Could not determine config directory")]
    NoConfigDir,
}
