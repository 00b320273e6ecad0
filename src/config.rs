//! Configuration persistence for scrollshot settings

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Serializable color representation for config storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ShapeColor {
    fn default() -> Self {
        // #667eea
        Self {
            r: 102.0 / 255.0,
            g: 126.0 / 255.0,
            b: 234.0 / 255.0,
        }
    }
}

impl ShapeColor {
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            255,
        ]
    }

    /// Format as a `#rrggbb` string
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.to_rgba_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for ShapeColor {
    type Err = anyhow::Error;

    /// Parse a `#rrggbb` (or `rrggbb`) color string
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            anyhow::bail!("invalid color {s:?}, expected #rrggbb");
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
        Ok(Self::from_rgb_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Where downloaded screenshots go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Downloads,
    Pictures,
    Documents,
}

impl SaveLocation {
    /// Resolve the directory, falling back to a folder under $HOME
    pub fn dir(self) -> Option<PathBuf> {
        match self {
            SaveLocation::Downloads => {
                dirs::download_dir().or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
            }
            SaveLocation::Pictures => {
                dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
            }
            SaveLocation::Documents => {
                dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
            }
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollShotConfig {
    pub version: u64,
    /// Wait after each scroll before capturing, in milliseconds
    pub settle_delay_ms: u64,
    /// Maximum number of retained undo snapshots
    pub history_depth: usize,
    /// Pixelation block side in device pixels
    pub pixelation_block_size: u32,
    /// Box blur radius in device pixels
    pub blur_radius: u32,
    /// Initial color for shapes and text
    pub color: ShapeColor,
    pub stroke_width: f32,
    pub font_size: f32,
    /// Whether rectangles and circles are filled
    pub fill_shape: bool,
    pub save_location: SaveLocation,
    /// Whether to also copy to clipboard when downloading
    pub copy_to_clipboard_on_save: bool,
}

impl Default for ScrollShotConfig {
    fn default() -> Self {
        Self {
            version: Self::VERSION,
            settle_delay_ms: 300,
            history_depth: 50,
            pixelation_block_size: 10,
            blur_radius: 5,
            color: ShapeColor::default(),
            stroke_width: 4.0,
            font_size: 16.0,
            fill_shape: false,
            save_location: SaveLocation::Downloads,
            copy_to_clipboard_on_save: false,
        }
    }
}

impl ScrollShotConfig {
    pub const VERSION: u64 = 1;

    /// Default path of the config file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scrollshot").join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Could not locate config directory, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                log::warn!("Could not read config {}: {:?}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&raw) {
            Ok(config) if config.version == Self::VERSION => config,
            Ok(config) => {
                log::warn!(
                    "Config version {} does not match {}, using defaults",
                    config.version,
                    Self::VERSION
                );
                Self::default()
            }
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("Could not locate config directory for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
