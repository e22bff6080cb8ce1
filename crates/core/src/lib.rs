//! PDF Highlighter Core Library
//!
//! Interaction layer for highlighting PDF documents: selection capture, page
//! partitioning, hover and selection tips, scroll-to navigation, zoom and the
//! glue that draws highlight overlays through a [`DocumentRenderer`].

pub mod config;
pub mod error;
pub mod highlighter;
pub mod navigator;
pub mod overlay;
pub mod partition;
pub mod render;
pub mod renderer;
pub mod selection;
pub mod store;
pub mod tip;

pub use config::HighlighterConfig;
pub use error::{ConfigError, HighlighterError, Result};
pub use highlighter::{Highlighter, HighlighterHooks, PointerTarget, ScrollHandle, TimerKind};
pub use navigator::{scroll_action, ScrollAction, ScrollNavigator};
pub use overlay::OverlayCache;
pub use partition::{
    find_overlapping, partition, OverlapPolicy, PageGroups, PageHighlight, RectIntersection,
};
pub use render::{
    area_resize_patch, default_highlight_transform, page_shapes, HighlightShape, RenderHelpers,
    ViewportHighlight,
};
pub use renderer::{DocumentRenderer, OverlayHandle, OverlayHost, PageBox, PageGeometry};
pub use selection::{
    capture_area, capture_text, client_rects_on_pages, AreaDrag, CapturedSelection,
    NativeTextSelection,
};
pub use store::HighlightStore;
pub use tip::{
    apply_tip_event, tip_placement, InteractionState, PopupContent, Tip, TipEffect, TipEvent,
    TipMode, TipPhase, TipPlacement, TipSide,
};
