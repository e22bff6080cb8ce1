//! Viewer geometry: coordinate engine, zoom controller and scroll math.
//!
//! Everything in this crate is pure and renderer-agnostic. The renderer supplies
//! a [`PageViewport`] per page; the functions here convert highlight geometry
//! against it.

pub mod coordinates;
pub mod geometry;
pub mod scroll;
pub mod zoom;

pub use coordinates::{
    scaled_position_to_viewport, to_scaled, to_viewport, viewport_position_to_scaled, PageViewport,
};
pub use geometry::{bounding_rect, optimize_client_rects};
pub use scroll::{centered_scroll_top, ScrollMetrics};
pub use zoom::{
    DeltaMode, ParseScaleError, ScaleValue, WheelInput, ZoomConfig, ZoomController, BUTTON_STEP,
    MAX_SCALE, MIN_SCALE, WHEEL_SENSITIVITY,
};
