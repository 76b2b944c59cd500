//! Configuration and palette management for conpaint.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.conpaint/config.toml`
//! - Built-in 16-colour palettes used to display the 4-bit cell attributes
//!
//! # Configuration File
//!
//! ```toml
//! # Canvas size in cells
//! width = 80
//! height = 40
//!
//! title = "conpaint"
//!
//! # Number of undo snapshots kept (including the live canvas)
//! history_depth = 30
//!
//! # Frame tick in milliseconds (upper bound on input wait per frame)
//! frame_ms = 16
//!
//! # Palette: classic, campbell, vga
//! color_scheme = "campbell"
//!
//! # Log level written to ~/.conpaint/conpaint.log
//! log_level = "info"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::history::DEFAULT_DEPTH;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canvas width in cells
    pub width: u16,
    /// Canvas height in cells
    pub height: u16,
    /// Terminal title
    pub title: String,
    /// Undo ring depth
    pub history_depth: usize,
    /// Frame tick in milliseconds
    pub frame_ms: u64,
    /// Palette name
    pub color_scheme: String,
    /// tracing level filter
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 80,
            height: 40,
            title: "conpaint".to_string(),
            history_depth: DEFAULT_DEPTH,
            frame_ms: 16,
            color_scheme: "classic".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `~/.conpaint/config.toml`, falling back to
    /// defaults when the file is missing or invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get config file path
    fn config_path() -> Option<PathBuf> {
        data_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get the palette
    pub fn palette(&self) -> Palette {
        Palette::by_name(&self.color_scheme)
    }
}

/// Colour definition (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Mapping from 4-bit colour index to terminal colour.
///
/// Indices follow the console attribute layout: bit 0 blue, bit 1 green,
/// bit 2 red, bit 3 intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub name: String,
    /// `None` uses the terminal's own named colours
    pub colors: Option<[Color; 16]>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

impl Palette {
    /// Terminal's named ANSI colours
    pub fn classic() -> Self {
        Self {
            name: "classic".to_string(),
            colors: None,
        }
    }

    /// Windows Terminal "Campbell" scheme
    pub fn campbell() -> Self {
        Self {
            name: "campbell".to_string(),
            colors: Some([
                Color::new(12, 12, 12),
                Color::new(0, 55, 218),
                Color::new(19, 161, 14),
                Color::new(58, 150, 221),
                Color::new(197, 15, 31),
                Color::new(136, 23, 152),
                Color::new(193, 156, 0),
                Color::new(204, 204, 204),
                Color::new(118, 118, 118),
                Color::new(59, 120, 255),
                Color::new(22, 198, 12),
                Color::new(97, 214, 214),
                Color::new(231, 72, 86),
                Color::new(180, 0, 158),
                Color::new(249, 241, 165),
                Color::new(242, 242, 242),
            ]),
        }
    }

    /// Legacy VGA text-mode colours
    pub fn vga() -> Self {
        Self {
            name: "vga".to_string(),
            colors: Some([
                Color::new(0, 0, 0),
                Color::new(0, 0, 170),
                Color::new(0, 170, 0),
                Color::new(0, 170, 170),
                Color::new(170, 0, 0),
                Color::new(170, 0, 170),
                Color::new(170, 85, 0),
                Color::new(170, 170, 170),
                Color::new(85, 85, 85),
                Color::new(85, 85, 255),
                Color::new(85, 255, 85),
                Color::new(85, 255, 255),
                Color::new(255, 85, 85),
                Color::new(255, 85, 255),
                Color::new(255, 255, 85),
                Color::new(255, 255, 255),
            ]),
        }
    }

    /// Get palette by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "campbell" => Self::campbell(),
            "vga" => Self::vga(),
            _ => Self::classic(),
        }
    }

    /// List available palettes
    pub fn list() -> Vec<&'static str> {
        vec!["classic", "campbell", "vga"]
    }

    /// Terminal colour for a 4-bit index
    pub fn color(&self, index: u8) -> crossterm::style::Color {
        use crossterm::style::Color as C;

        let index = index & 0x0F;
        if let Some(colors) = &self.colors {
            return colors[index as usize].to_crossterm();
        }
        match index {
            0x0 => C::Black,
            0x1 => C::DarkBlue,
            0x2 => C::DarkGreen,
            0x3 => C::DarkCyan,
            0x4 => C::DarkRed,
            0x5 => C::DarkMagenta,
            0x6 => C::DarkYellow,
            0x7 => C::Grey,
            0x8 => C::DarkGrey,
            0x9 => C::Blue,
            0xA => C::Green,
            0xB => C::Cyan,
            0xC => C::Red,
            0xD => C::Magenta,
            0xE => C::Yellow,
            _ => C::White,
        }
    }
}

/// `~/.conpaint`, created on first use
pub fn data_dir() -> Option<PathBuf> {
    let dir = home_dir()?.join(".conpaint");
    if !dir.exists() {
        let _ = fs::create_dir_all(&dir);
    }
    Some(dir)
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::style::Color as C;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "width = 120\ncolor_scheme = \"vga\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.width, 120);
        assert_eq!(config.height, 40);
        assert_eq!(config.history_depth, DEFAULT_DEPTH);
        assert_eq!(config.palette().name, "vga");
    }

    #[test]
    fn test_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "width = \"wide\"").unwrap();
        assert!(matches!(Config::load_from(file.path()), Err(ConfigError::Parse { .. })));

        let missing = file.path().with_extension("missing");
        assert!(matches!(Config::load_from(&missing), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            title: "sketch".to_string(),
            frame_ms: 33,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_palette_lookup() {
        let classic = Palette::by_name("unknown");
        assert_eq!(classic.color(0x0), C::Black);
        assert_eq!(classic.color(0xC), C::Red);
        assert_eq!(classic.color(0x1F), C::White);

        let vga = Palette::by_name("VGA");
        assert_eq!(vga.color(6), C::Rgb { r: 170, g: 85, b: 0 });
        assert!(Palette::list().contains(&"campbell"));
    }
}
