//! Zoom level state: symbolic fit-width or a clamped numeric factor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 3.0;
pub const BUTTON_STEP: f64 = 0.1;
pub const WHEEL_SENSITIVITY: f64 = 0.0008;

const FIT_WIDTH_KEYWORD: &str = "page-width";

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("invalid scale value '{0}'")]
pub struct ParseScaleError(String);

/// Scale handed to the renderer.
///
/// `FitWidth` is resolved by the renderer against the container width on every
/// layout pass, so it is never frozen into a number here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ScaleValue {
    #[default]
    FitWidth,
    Factor(f64),
}

impl ScaleValue {
    /// Numeric value used as the base for relative zoom; fit-width counts as 1.0.
    pub fn as_factor(&self) -> f64 {
        match self {
            Self::FitWidth => 1.0,
            Self::Factor(factor) => *factor,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::FitWidth => "Fit".to_owned(),
            Self::Factor(factor) => format!("{}%", (factor * 100.0).round() as i64),
        }
    }
}

impl fmt::Display for ScaleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FitWidth => f.write_str(FIT_WIDTH_KEYWORD),
            Self::Factor(factor) => write!(f, "{factor:.2}"),
        }
    }
}

impl FromStr for ScaleValue {
    type Err = ParseScaleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case(FIT_WIDTH_KEYWORD) || trimmed.eq_ignore_ascii_case("fit") {
            return Ok(Self::FitWidth);
        }

        match trimmed.parse::<f64>() {
            Ok(factor) if factor.is_finite() && factor > 0.0 => Ok(Self::Factor(factor)),
            _ => Err(ParseScaleError(value.to_owned())),
        }
    }
}

/// Unit of a wheel delta as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    /// Host-level numeric delta mode (0 = pixel, 1 = line, 2 = page).
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelInput {
    pub delta_y: f64,
    pub delta_mode: DeltaMode,
    pub ctrl_key: bool,
    pub meta_key: bool,
}

impl WheelInput {
    pub fn zoom_gesture(&self) -> bool {
        self.ctrl_key || self.meta_key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub button_step: f64,
    pub wheel_sensitivity: f64,
    pub line_delta_px: f64,
    pub page_delta_px: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            button_step: BUTTON_STEP,
            wheel_sensitivity: WHEEL_SENSITIVITY,
            line_delta_px: 16.0,
            page_delta_px: 800.0,
        }
    }
}

impl ZoomConfig {
    pub fn with_range(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.min_scale = min_scale.min(max_scale);
        self.max_scale = max_scale.max(min_scale);
        self
    }

    pub fn with_button_step(mut self, step: f64) -> Self {
        self.button_step = step;
        self
    }

    pub fn with_wheel_sensitivity(mut self, sensitivity: f64) -> Self {
        self.wheel_sensitivity = sensitivity;
        self
    }

    /// First setting that is not a positive finite number, or `min_scale`
    /// when the range is inverted.
    pub fn invalid_setting(&self) -> Option<(&'static str, f64)> {
        let settings = [
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("button_step", self.button_step),
            ("wheel_sensitivity", self.wheel_sensitivity),
            ("line_delta_px", self.line_delta_px),
            ("page_delta_px", self.page_delta_px),
        ];
        if let Some(invalid) = settings
            .into_iter()
            .find(|(_, value)| !value.is_finite() || *value <= 0.0)
        {
            return Some(invalid);
        }

        (self.min_scale > self.max_scale).then_some(("min_scale", self.min_scale))
    }

    /// Unusable bounds fall back to the defaults and the range is ordered.
    pub fn normalized(self) -> Self {
        let usable = |value: f64| value.is_finite() && value > 0.0;
        let min_scale = if usable(self.min_scale) { self.min_scale } else { MIN_SCALE };
        let max_scale = if usable(self.max_scale) { self.max_scale } else { MAX_SCALE };
        self.with_range(min_scale, max_scale)
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Owns the current scale and applies wheel and step zoom to it.
#[derive(Debug, Clone)]
pub struct ZoomController {
    config: ZoomConfig,
    scale: ScaleValue,
}

impl ZoomController {
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            config: config.normalized(),
            scale: ScaleValue::FitWidth,
        }
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    pub fn scale(&self) -> ScaleValue {
        self.scale
    }

    pub fn label(&self) -> String {
        self.scale.label()
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.config.min_scale, self.config.max_scale)
    }

    fn apply_factor(&mut self, value: f64) -> ScaleValue {
        let next = round_to_hundredths(self.clamp(value));
        self.scale = ScaleValue::Factor(self.clamp(next));
        log::debug!("zoom scale -> {}", self.scale);
        self.scale
    }

    /// Wheel delta converted to pixels.
    pub fn normalize_delta(&self, input: &WheelInput) -> f64 {
        match input.delta_mode {
            DeltaMode::Pixel => input.delta_y,
            DeltaMode::Line => input.delta_y * self.config.line_delta_px,
            DeltaMode::Page => input.delta_y * self.config.page_delta_px,
        }
    }

    /// Multiplicative zoom factor for a wheel event.
    pub fn wheel_factor(&self, input: &WheelInput) -> f64 {
        (-self.normalize_delta(input) * self.config.wheel_sensitivity).exp()
    }

    /// Continuous zoom. Returns `None` (scale untouched) unless a zoom modifier
    /// is held.
    pub fn wheel(&mut self, input: &WheelInput) -> Option<ScaleValue> {
        if !input.zoom_gesture() {
            return None;
        }

        let factor = self.wheel_factor(input);
        Some(self.apply_factor(self.scale.as_factor() * factor))
    }

    /// Discrete zoom by an arbitrary signed step.
    pub fn step(&mut self, step: f64) -> ScaleValue {
        self.apply_factor(self.scale.as_factor() + step)
    }

    pub fn zoom_in(&mut self) -> ScaleValue {
        self.step(self.config.button_step)
    }

    pub fn zoom_out(&mut self) -> ScaleValue {
        self.step(-self.config.button_step)
    }

    pub fn fit_width(&mut self) -> ScaleValue {
        self.scale = ScaleValue::FitWidth;
        self.scale
    }

    /// Replace the scale; numeric values are clamped and rounded.
    pub fn set(&mut self, scale: ScaleValue) -> ScaleValue {
        match scale {
            ScaleValue::FitWidth => self.fit_width(),
            ScaleValue::Factor(factor) => self.apply_factor(factor),
        }
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}
