//! Interface to the external document renderer.

use doc_model::Rect;
use viewer_core::{PageViewport, ScaleValue, ScrollMetrics};

/// Opaque handle to a page's overlay layer, owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(pub u64);

/// Where a mounted page sits.
///
/// `offset_left`/`offset_top` are relative to the scrollable content of the
/// viewer container. `client` is the page's box in client coordinates at the
/// time of the query, and `scroll_left`/`scroll_top` are the page element's own
/// scroll offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageBox {
    pub offset_left: f64,
    pub offset_top: f64,
    pub width: f64,
    pub height: f64,
    pub client: Rect,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

impl PageBox {
    /// Page box in container content coordinates.
    pub fn content_rect(&self) -> Rect {
        Rect::new(self.offset_left, self.offset_top, self.width, self.height)
    }
}

/// Page geometry as currently laid out by the renderer.
///
/// Pages are 1-based. A page that is not currently mounted reports `None` from
/// [`page_box`](Self::page_box).
pub trait PageGeometry {
    /// Current viewport of `page`, or `None` when the page is unknown.
    fn page_viewport(&self, page: u32) -> Option<PageViewport>;

    fn page_box(&self, page: u32) -> Option<PageBox>;
}

/// Host of the per-page overlay layers.
pub trait OverlayHost {
    /// Create the overlay layer above the page's text layer. Returns `None`
    /// when the page has no text layer yet.
    fn create_overlay(&mut self, page: u32) -> Option<OverlayHandle>;

    /// Whether a previously created overlay is still attached to its page.
    fn is_overlay_attached(&self, handle: OverlayHandle) -> bool;
}

/// The document renderer the highlighter is mounted on.
pub trait DocumentRenderer: PageGeometry + OverlayHost {
    /// Renderable produced for each highlight and drawn into an overlay.
    type Shape;

    /// Whether the viewer container exists. Initializing without one is a
    /// precondition violation.
    fn has_container(&self) -> bool;

    fn page_count(&self) -> u32;

    fn scroll_metrics(&self) -> ScrollMetrics;

    fn set_scroll_top(&mut self, scroll_top: f64);

    /// Bring an unmounted page into view at a destination in PDF points.
    fn scroll_page_into_view(&mut self, page: u32, destination: (f64, f64));

    fn set_scale_value(&mut self, scale: ScaleValue);

    /// Capture the pixels of `rect` (page-relative viewport pixels) as an
    /// encoded image.
    fn capture(&mut self, page: u32, rect: &Rect) -> Option<String>;

    fn clear_native_selection(&mut self);

    /// Toggle native text selection, disabled while an area drag is active.
    fn set_text_selection_enabled(&mut self, enabled: bool);

    fn draw_overlay(&mut self, handle: OverlayHandle, shapes: Vec<Self::Shape>);
}
