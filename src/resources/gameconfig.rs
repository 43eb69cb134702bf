//! Host configuration.
//!
//! Settings loaded from an INI file. Defaults are safe to start with; values
//! missing from the file keep their defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [view]
//! width = 800
//! height = 600
//!
//! [update]
//! target_fps = 60
//!
//! [animation]
//! multiplier = 1.0
//!
//! [assets]
//! root = ./assets
//! ```

use std::path::PathBuf;
use std::time::Duration;

use configparser::ini::Ini;
use log::{info, warn};

/// Default safe values for startup
const DEFAULT_VIEW_WIDTH: u32 = 800;
const DEFAULT_VIEW_HEIGHT: u32 = 600;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_MULTIPLIER: f32 = 1.0;
const DEFAULT_ASSET_ROOT: &str = "./assets";
const DEFAULT_CONFIG_PATH: &str = "./migfx.ini";

/// MiGfx host configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MiGfxConfig {
    /// View width in pixels.
    pub view_width: u32,
    /// View height in pixels.
    pub view_height: u32,
    /// Update cadence the animators are tuned for.
    pub target_fps: u32,
    /// Playback multiplier applied to animators on load.
    pub animation_multiplier: f32,
    /// Directory textures, fonts and sounds are resolved against.
    pub asset_root: PathBuf,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for MiGfxConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MiGfxConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            view_width: DEFAULT_VIEW_WIDTH,
            view_height: DEFAULT_VIEW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            animation_multiplier: DEFAULT_MULTIPLIER,
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [view] section
        if let Some(width) = config.getuint("view", "width").ok().flatten() {
            match u32::try_from(width) {
                Ok(width) => self.view_width = width,
                Err(_) => warn!("view width {} out of range, keeping {}", width, self.view_width),
            }
        }
        if let Some(height) = config.getuint("view", "height").ok().flatten() {
            match u32::try_from(height) {
                Ok(height) => self.view_height = height,
                Err(_) => warn!("view height {} out of range, keeping {}", height, self.view_height),
            }
        }

        // [update] section
        if let Some(fps) = config.getuint("update", "target_fps").ok().flatten() {
            match u32::try_from(fps) {
                Ok(fps) if fps > 0 => self.target_fps = fps,
                _ => warn!("target_fps must be in 1..={}, keeping {}", u32::MAX, self.target_fps),
            }
        }

        // [animation] section
        if let Some(multiplier) = config.getfloat("animation", "multiplier").ok().flatten() {
            if multiplier.is_finite() && multiplier >= 0.0 {
                self.animation_multiplier = multiplier as f32;
            } else {
                warn!(
                    "animation multiplier must be non-negative, keeping {}",
                    self.animation_multiplier
                );
            }
        }

        // [assets] section
        if let Some(root) = config.get("assets", "root") {
            self.asset_root = PathBuf::from(root);
        }

        info!(
            "Loaded config: {}x{} view, fps={}, multiplier={}, assets={:?}",
            self.view_width,
            self.view_height,
            self.target_fps,
            self.animation_multiplier,
            self.asset_root
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("view", "width", Some(self.view_width.to_string()));
        config.set("view", "height", Some(self.view_height.to_string()));
        config.set("update", "target_fps", Some(self.target_fps.to_string()));
        config.set(
            "animation",
            "multiplier",
            Some(self.animation_multiplier.to_string()),
        );
        config.set(
            "assets",
            "root",
            Some(self.asset_root.to_string_lossy().into_owned()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Fixed update step derived from the target fps.
    pub fn frame_step(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.target_fps.max(1)))
    }

    /// View size as floats.
    pub fn view_size(&self) -> (f32, f32) {
        (self.view_width as f32, self.view_height as f32)
    }
}
