//! # Application Configuration
//!
//! Settings for the engine core, the window and text rendering, grouped in
//! [`ApplicationConfig`]. Every section has defaults, so a config file only
//! needs the values it changes.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::foundation::math::Color;
use crate::render::gl::TextureFilter;
use crate::render::text::{FontData, TextResult};

/// Printable ASCII, rasterized when a font context is created
pub const PRINTABLE_ASCII: RangeInclusive<u32> = 32..=126;

/// # Text Configuration
///
/// Font source, raster size and glyph cache behavior for one font context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// TrueType/OpenType font file
    pub font_path: PathBuf,
    /// Font size in pixels
    pub pixel_size: f32,
    /// Upscale factor for high-DPI monitors where content scale is > 1
    pub dpi_scale: f32,
    /// Glyph texture filter
    pub filter: TextureFilter,
    /// Code points rasterized up front, if any
    pub warm_up_range: Option<RangeInclusive<u32>>,
    /// Stop retrying code points the font cannot render
    pub remember_missing: bool,
    /// Read back every vertex upload and compare
    pub verify_uploads: bool,
}

impl TextConfig {
    /// Create a text configuration for a font file
    pub fn new(font_path: impl Into<PathBuf>) -> Self {
        Self {
            font_path: font_path.into(),
            pixel_size: 32.0,
            dpi_scale: 1.0,
            filter: TextureFilter::Linear,
            warm_up_range: Some(PRINTABLE_ASCII),
            remember_missing: true,
            verify_uploads: cfg!(debug_assertions),
        }
    }

    /// Set the font size in pixels
    pub fn with_pixel_size(mut self, pixel_size: f32) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    /// Set the DPI upscale factor
    pub fn with_dpi_scale(mut self, dpi_scale: f32) -> Self {
        self.dpi_scale = dpi_scale;
        self
    }

    /// Set the glyph texture filter
    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set or clear the warm-up range
    pub fn with_warm_up(mut self, range: Option<RangeInclusive<u32>>) -> Self {
        self.warm_up_range = range;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pixel_size.is_finite() && self.pixel_size > 0.0) {
            return Err(ConfigError::Invalid(format!("pixel_size must be positive, got {}", self.pixel_size)));
        }
        if !(self.dpi_scale.is_finite() && self.dpi_scale > 0.0) {
            return Err(ConfigError::Invalid(format!("dpi_scale must be positive, got {}", self.dpi_scale)));
        }
        if let Some(range) = &self.warm_up_range {
            if range.start() > range.end() || *range.end() > u32::from(char::MAX) {
                return Err(ConfigError::Invalid(format!(
                    "warm_up_range {:#X}..={:#X} is not a range of code points",
                    range.start(),
                    range.end()
                )));
            }
        }
        Ok(())
    }

    /// Read and parse the configured font
    pub fn load_font(&self) -> TextResult<FontData> {
        FontData::from_file(&self.font_path)
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self::new("fonts/DejaVuSans.ttf")
    }
}

/// # Window Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Width in screen coordinates
    pub width: u32,
    /// Height in screen coordinates
    pub height: u32,
    /// Wait for vertical sync on buffer swap
    pub vsync: bool,
    /// Whether the user may resize the window
    pub resizable: bool,
    /// Background color
    pub clear_color: Color,
}

impl WindowConfig {
    /// Create a window configuration
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            vsync: true,
            resizable: true,
            clear_color: Color::new(0.1, 0.1, 0.12, 1.0),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("Glyph Engine", 1280, 720)
    }
}

/// # Engine Configuration
///
/// Core behavior: logging and debug features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Window configuration
    pub window: WindowConfig,
    /// Text rendering configuration
    pub text: TextConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;
        self.text.validate()?;
        Ok(())
    }
}

impl Config for ApplicationConfig {}
impl Config for TextConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("glyph_engine_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ApplicationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.text.warm_up_range, Some(32..=126));
        assert!(config.text.remember_missing);
        assert_eq!(config.engine.log_level, "info");
    }

    #[test]
    fn test_text_validation() {
        assert!(TextConfig::default().with_pixel_size(0.0).validate().is_err());
        assert!(TextConfig::default().with_pixel_size(f32::NAN).validate().is_err());
        assert!(TextConfig::default().with_dpi_scale(-1.0).validate().is_err());
        #[allow(clippy::reversed_empty_ranges)]
        let backwards = TextConfig::default().with_warm_up(Some(100..=50));
        assert!(matches!(backwards.validate(), Err(ConfigError::Invalid(_))));
        assert!(TextConfig::default().with_warm_up(Some(0..=0x11_0000)).validate().is_err());
        assert!(TextConfig::default().with_warm_up(None).validate().is_ok());
    }

    #[test]
    fn test_window_validation() {
        assert!(WindowConfig::new("x", 0, 10).validate().is_err());
        assert!(WindowConfig::new("x", 10, 10).validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("config.toml");
        let mut config = ApplicationConfig::default();
        config.text = TextConfig::new("fonts/Mono.ttf").with_pixel_size(18.0).with_filter(TextureFilter::Nearest);
        config.engine = config.engine.with_log_level("debug");

        config.save_to_file(&path).unwrap();
        let loaded = ApplicationConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let path = temp_path("text.ron");
        std::fs::write(&path, "(pixel_size: 12.0, filter: nearest)").unwrap();
        let loaded = TextConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.pixel_size, 12.0);
        assert_eq!(loaded.filter, TextureFilter::Nearest);
        assert_eq!(loaded.dpi_scale, 1.0);
        assert_eq!(loaded.warm_up_range, Some(PRINTABLE_ASCII));
    }

    #[test]
    fn test_format_errors() {
        assert!(matches!(
            ApplicationConfig::default().save_to_file(temp_path("config.yaml")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ApplicationConfig::load_from_file(temp_path("missing.toml")),
            Err(ConfigError::Io(_))
        ));

        let path = temp_path("broken.toml");
        std::fs::write(&path, "[text\npixel_size = ").unwrap();
        let result = ApplicationConfig::load_from_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_or_default() {
        let config = ApplicationConfig::load_or_default(temp_path("absent.toml")).unwrap();
        assert_eq!(config, ApplicationConfig::default());
    }
}
