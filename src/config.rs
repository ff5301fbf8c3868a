//! Scene configuration.
//!
//! Every tunable of the scene lives here. Defaults reproduce the landing
//! page exactly, so an empty JSON object is a valid config and any subset of
//! keys can be overridden:
//!
//! ```json
//! {
//!   "window": { "title": "Night shift", "width": 1600 },
//!   "starfield": { "density": 2500.0, "max_comets": 4 },
//!   "locale": { "secret_word": "sawasdee" }
//! }
//! ```
//!
//! Code can also start from the defaults and chain `with_*` overrides:
//!
//! ```ignore
//! let config = StarfieldConfig::default()
//!     .with_density(3000.0)
//!     .with_attraction(300.0, 0.2);
//! ```

use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::deck::Track;
use crate::error::ConfigError;

/// A closed-open numeric interval `[min, max)` sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Tunables of the particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Surface pixels per drift star.
    pub density: f32,
    /// Static stars are `drift_count / static_divisor`.
    pub static_divisor: u32,
    /// Scroll-reactive stars are `drift_count / scroll_divisor`.
    pub scroll_divisor: u32,

    pub drift_radius: Span,
    pub drift_alpha: Span,
    pub static_radius: Span,
    pub static_alpha: Span,
    /// Initial drift velocity per axis is drawn from `[-v, v)`.
    pub drift_initial_speed: f32,

    pub attraction_radius: f32,
    pub attraction_strength: f32,
    pub drift_damping: f32,

    pub scroll_parallax: f32,
    pub scroll_damping: f32,

    pub comet_spawn_chance: f32,
    pub max_comets: usize,
    pub comet_decay: f32,
    /// Pixels per frame.
    pub comet_speed: Span,
    /// Descent angle below the horizontal, in degrees.
    pub comet_angle: Span,
    pub comet_length: Span,
    pub comet_thickness: Span,
    /// Glow radius as a multiple of the comet thickness.
    pub comet_glow_scale: f32,

    pub star_color: [f32; 3],
    pub comet_color: [f32; 3],
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            density: 4000.0,
            static_divisor: 3,
            scroll_divisor: 2,
            drift_radius: Span::new(0.5, 2.0),
            drift_alpha: Span::new(0.3, 0.8),
            static_radius: Span::new(0.5, 2.5),
            static_alpha: Span::new(0.4, 0.9),
            drift_initial_speed: 0.25,
            attraction_radius: 400.0,
            attraction_strength: 0.15,
            drift_damping: 0.98,
            scroll_parallax: 0.8,
            scroll_damping: 0.95,
            comet_spawn_chance: 0.005,
            max_comets: 2,
            comet_decay: 0.002,
            comet_speed: Span::new(3.0, 7.0),
            comet_angle: Span::new(15.0, 45.0),
            comet_length: Span::new(40.0, 120.0),
            comet_thickness: Span::new(1.0, 2.5),
            comet_glow_scale: 3.0,
            star_color: [1.0, 1.0, 1.0],
            comet_color: [0.85, 0.92, 1.0],
        }
    }
}

impl StarfieldConfig {
    /// Set the surface area (in square pixels) that yields one drift star.
    pub fn with_density(mut self, pixels_per_star: f32) -> Self {
        self.density = pixels_per_star;
        self
    }

    /// Set pointer attraction radius and peak strength.
    pub fn with_attraction(mut self, radius: f32, strength: f32) -> Self {
        self.attraction_radius = radius;
        self.attraction_strength = strength;
        self
    }

    /// Set comet spawn probability per frame and the concurrent cap.
    pub fn with_comets(mut self, spawn_chance: f32, max_comets: usize) -> Self {
        self.comet_spawn_chance = spawn_chance;
        self.max_comets = max_comets;
        self
    }

    /// Set the scroll parallax multiplier.
    pub fn with_scroll_parallax(mut self, parallax: f32) -> Self {
        self.scroll_parallax = parallax;
        self
    }

    pub fn star_color(&self) -> Vec3 {
        Vec3::from_array(self.star_color)
    }

    pub fn comet_color(&self) -> Vec3 {
        Vec3::from_array(self.comet_color)
    }
}

/// Tunables of the infinite carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Length of the transition lock in milliseconds.
    pub transition_ms: u64,
    /// Minimum horizontal travel, in pixels, for a touch to count as a swipe.
    pub swipe_threshold: f32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            transition_ms: 500,
            swipe_threshold: 50.0,
        }
    }
}

impl CarouselConfig {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

/// Locale easter egg settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Word that toggles the Thai persona when typed anywhere on the page.
    pub secret_word: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            secret_word: "thai".to_string(),
        }
    }
}

/// Native window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background: [f32; 3],
    /// Page length in window heights; bounds the scroll position.
    pub page_screens: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Starscape".to_string(),
            width: 1280,
            height: 720,
            background: [0.01, 0.01, 0.04],
            page_screens: 5.0,
        }
    }
}

/// Complete scene configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub starfield: StarfieldConfig,
    pub carousel: CarouselConfig,
    pub locale: LocaleConfig,
    pub playlist: Vec<Track>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            starfield: StarfieldConfig::default(),
            carousel: CarouselConfig::default(),
            locale: LocaleConfig::default(),
            playlist: Track::default_playlist(),
        }
    }
}

impl WindowConfig {
    /// Furthest the page scrolls for a window `height` pixels tall.
    pub fn max_scroll(&self, height: f32) -> f32 {
        ((self.page_screens - 1.0) * height).max(0.0)
    }
}

impl SceneConfig {
    /// Parse a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = SceneConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = SceneConfig::from_json_str(
            r#"{ "starfield": { "density": 2500.0 }, "carousel": { "transition_ms": 300 } }"#,
        )
        .unwrap();
        assert_eq!(config.starfield.density, 2500.0);
        assert_eq!(config.starfield.attraction_radius, 400.0);
        assert_eq!(config.carousel.transition(), Duration::from_millis(300));
        assert_eq!(config.carousel.swipe_threshold, 50.0);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = SceneConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SceneConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_builder_overrides() {
        let config = StarfieldConfig::default()
            .with_density(1000.0)
            .with_attraction(200.0, 0.3)
            .with_comets(0.5, 5);
        assert_eq!(config.density, 1000.0);
        assert_eq!(config.attraction_radius, 200.0);
        assert_eq!(config.attraction_strength, 0.3);
        assert_eq!(config.max_comets, 5);
    }

    #[test]
    fn test_max_scroll_follows_page_length() {
        let window = WindowConfig::default();
        assert_eq!(window.max_scroll(720.0), 4.0 * 720.0);
        let short = WindowConfig {
            page_screens: 0.5,
            ..WindowConfig::default()
        };
        assert_eq!(short.max_scroll(720.0), 0.0);
    }
}
