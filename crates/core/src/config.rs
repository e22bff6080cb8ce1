//! Interaction timing and zoom configuration.
//!
//! Configuration can be built programmatically, loaded from a JSON file, or
//! overridden through environment variables.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use viewer_core::ZoomConfig;

const ENV_HOVER_SHOW_MS: &str = "PDF_HIGHLIGHTER_HOVER_SHOW_MS";
const ENV_HOVER_HIDE_MS: &str = "PDF_HIGHLIGHTER_HOVER_HIDE_MS";
const ENV_FLASH_MS: &str = "PDF_HIGHLIGHTER_FLASH_MS";
const ENV_RESIZE_DEBOUNCE_MS: &str = "PDF_HIGHLIGHTER_RESIZE_DEBOUNCE_MS";
const ENV_WHEEL_SENSITIVITY: &str = "PDF_HIGHLIGHTER_WHEEL_SENSITIVITY";
const ENV_DEBUG: &str = "PDF_HIGHLIGHTER_DEBUG";

/// Settings for a [`Highlighter`](crate::Highlighter).
///
/// All delays are in milliseconds of the controller's clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlighterConfig {
    /// Delay between entering a highlight and showing its hover tip
    pub hover_show_delay_ms: u64,
    /// Grace period after leaving a highlight or tip before the tip hides
    pub hover_hide_delay_ms: u64,
    /// How long the scroll listener stays detached after a programmatic scroll
    pub scroll_reattach_delay_ms: u64,
    /// How long a scrolled-to highlight stays flashed
    pub flash_duration_ms: u64,
    /// Debounce window for resize-driven rescales
    pub resize_debounce_ms: u64,
    /// Delay between pointer-up and processing the finished selection
    pub selection_defer_ms: u64,
    /// Re-render every overlay once all text layers have rendered
    pub force_render_on_load: bool,
    /// Log every hover enter/leave
    pub debug: bool,
    pub zoom: ZoomConfig,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            hover_show_delay_ms: 200,
            hover_hide_delay_ms: 150,
            scroll_reattach_delay_ms: 100,
            flash_duration_ms: 1000,
            resize_debounce_ms: 500,
            selection_defer_ms: 0,
            force_render_on_load: true,
            debug: false,
            zoom: ZoomConfig::default(),
        }
    }
}

impl HighlighterConfig {
    pub fn with_hover_delays(mut self, show_ms: u64, hide_ms: u64) -> Self {
        self.hover_show_delay_ms = show_ms;
        self.hover_hide_delay_ms = hide_ms;
        self
    }

    pub fn with_flash_duration(mut self, ms: u64) -> Self {
        self.flash_duration_ms = ms;
        self
    }

    pub fn with_resize_debounce(mut self, ms: u64) -> Self {
        self.resize_debounce_ms = ms;
        self
    }

    pub fn with_force_render_on_load(mut self, enabled: bool) -> Self {
        self.force_render_on_load = enabled;
        self
    }

    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn with_zoom(mut self, zoom: ZoomConfig) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn hover_show_delay(&self) -> Duration {
        Duration::from_millis(self.hover_show_delay_ms)
    }

    pub fn hover_hide_delay(&self) -> Duration {
        Duration::from_millis(self.hover_hide_delay_ms)
    }

    pub fn scroll_reattach_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_reattach_delay_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn selection_defer(&self) -> Duration {
        Duration::from_millis(self.selection_defer_ms)
    }

    /// Loads configuration from environment variables on top of the defaults.
    ///
    /// Environment variables:
    /// - `PDF_HIGHLIGHTER_HOVER_SHOW_MS`: hover show delay (default: 200)
    /// - `PDF_HIGHLIGHTER_HOVER_HIDE_MS`: hover hide grace period (default: 150)
    /// - `PDF_HIGHLIGHTER_FLASH_MS`: scroll-to flash duration (default: 1000)
    /// - `PDF_HIGHLIGHTER_RESIZE_DEBOUNCE_MS`: resize debounce (default: 500)
    /// - `PDF_HIGHLIGHTER_WHEEL_SENSITIVITY`: wheel zoom sensitivity (default: 0.0008)
    /// - `PDF_HIGHLIGHTER_DEBUG`: `true`/`false`, `1`/`0`
    ///
    /// # Errors
    /// Returns an error if any variable holds a value that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Applies environment overrides to an existing configuration.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(ms) = env_value(ENV_HOVER_SHOW_MS)? {
            self.hover_show_delay_ms = ms;
        }
        if let Some(ms) = env_value(ENV_HOVER_HIDE_MS)? {
            self.hover_hide_delay_ms = ms;
        }
        if let Some(ms) = env_value(ENV_FLASH_MS)? {
            self.flash_duration_ms = ms;
        }
        if let Some(ms) = env_value(ENV_RESIZE_DEBOUNCE_MS)? {
            self.resize_debounce_ms = ms;
        }
        if let Some(sensitivity) = env_value::<f64>(ENV_WHEEL_SENSITIVITY)? {
            if !sensitivity.is_finite() || sensitivity <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: ENV_WHEEL_SENSITIVITY.to_owned(),
                    value: sensitivity.to_string(),
                });
            }
            self.zoom.wheel_sensitivity = sensitivity;
        }
        if let Ok(raw) = std::env::var(ENV_DEBUG) {
            self.debug = parse_flag(ENV_DEBUG, &raw)?;
        }

        self.validate()
    }

    /// Rejects zoom settings a controller cannot work with.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first bad `zoom.*` key.
    pub fn validate(self) -> Result<Self, ConfigError> {
        match self.zoom.invalid_setting() {
            Some((key, value)) => Err(ConfigError::InvalidValue {
                key: format!("zoom.{key}"),
                value: value.to_string(),
            }),
            None => Ok(self),
        }
    }

    /// Loads configuration from a JSON file. Missing keys keep their defaults.
    ///
    /// ```json
    /// { "hover_show_delay_ms": 300, "zoom": { "max_scale": 4.0 } }
    /// ```
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Saves configuration to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_owned(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_owned(),
            value: raw.to_owned(),
        }),
    }
}
