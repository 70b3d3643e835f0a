//! Persisted user preferences.
//!
//! Loaded once at startup and handed to the app; written back explicitly
//! when a download starts and when the window closes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::SettingsError;

pub const APP_DIR_NAME: &str = "simple-mp3-downloader";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SCRIPT_ENV_VAR: &str = "MP3_DOWNLOADER_SCRIPT";
pub const DEFAULT_SCRIPT_NAME: &str = "yt-downloader";

pub const MIN_WINDOW_WIDTH: f32 = 320.0;
pub const MIN_WINDOW_HEIGHT: f32 = 200.0;
/// Windows parks minimized windows at (-32000, -32000).
const MAX_COORDINATE: f32 = 16_000.0;

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowGeometry {
    pub width: f32,
    pub height: f32,
    /// `None` lets the window manager place the window.
    pub x: Option<f32>,
    pub y: Option<f32>,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            width: 520.0,
            height: 320.0,
            x: None,
            y: None,
        }
    }
}

impl WindowGeometry {
    /// Ignores the zero size reported while minimized. Returns whether it was kept.
    pub fn record_size(&mut self, width: f32, height: f32) -> bool {
        if !is_usable_size(width, height) {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    /// Ignores the off-screen parking spot of a minimized window.
    pub fn record_position(&mut self, x: f32, y: f32) -> bool {
        if !is_usable_coordinate(x) || !is_usable_coordinate(y) {
            return false;
        }
        self.x = Some(x);
        self.y = Some(y);
        true
    }

    /// Geometry safe to open a window with: a minimum size and no
    /// off-screen position.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let (width, height) = if self.width.is_finite() && self.height.is_finite() {
            (
                self.width.max(MIN_WINDOW_WIDTH),
                self.height.max(MIN_WINDOW_HEIGHT),
            )
        } else {
            (defaults.width, defaults.height)
        };

        let (x, y) = match (self.x, self.y) {
            (Some(x), Some(y)) if is_usable_coordinate(x) && is_usable_coordinate(y) => {
                (Some(x), Some(y))
            }
            _ => (None, None),
        };

        Self {
            width,
            height,
            x,
            y,
        }
    }
}

fn is_usable_size(width: f32, height: f32) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}

fn is_usable_coordinate(value: f32) -> bool {
    value.is_finite() && value.abs() < MAX_COORDINATE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folder used for the previous download.
    pub last_folder: Option<PathBuf>,
    /// External script invoked for each download.
    pub script_path: PathBuf,
    pub window: WindowGeometry,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_folder: None,
            script_path: default_script_path(),
            window: WindowGeometry::default(),
        }
    }
}

impl Settings {
    /// Missing file yields defaults; an unreadable or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(SettingsError::Encode)?;

        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Settings saved");
        Ok(())
    }

    /// Startup load: falls back to defaults (with a warning) on any failure,
    /// then applies the script override from the environment.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let mut settings = match path.map(Self::load_from) {
            Some(Ok(settings)) => settings,
            Some(Err(e)) => {
                warn!("Failed to load settings, using defaults: {}", e);
                Self::default()
            }
            None => Self::default(),
        };

        if let Some(script) = std::env::var_os(SCRIPT_ENV_VAR) {
            settings.script_path = PathBuf::from(script);
        }

        settings
    }
}

/// `<config dir>/simple-mp3-downloader/settings.json`
pub fn settings_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
        .ok_or(SettingsError::NoConfigDir)
}

/// `yt-downloader.py` beside the executable when shipped together,
/// otherwise the bare name resolved on `PATH` at run time.
fn default_script_path() -> PathBuf {
    let bundled = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(format!("{}.py", DEFAULT_SCRIPT_NAME))));

    match bundled {
        Some(path) if path.is_file() => path,
        _ => PathBuf::from(DEFAULT_SCRIPT_NAME),
    }
}
