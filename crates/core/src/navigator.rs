//! Scroll-to-highlight navigation and the transient flash state.

use crate::renderer::PageBox;
use doc_model::{HighlightId, ScaledPosition};
use viewer_core::{centered_scroll_top, to_viewport, PageViewport, ScrollMetrics};

/// What the renderer has to do to bring a highlight into view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollAction {
    /// The page is mounted: set the container's scroll offset directly.
    SetScrollTop(f64),
    /// The page is not mounted: let the renderer scroll to a destination in
    /// PDF points on that page.
    ScrollPageIntoView { page: u32, destination: (f64, f64) },
}

/// Scroll action that vertically centres `position`'s bounding rect.
pub fn scroll_action(
    position: &ScaledPosition,
    viewport: &PageViewport,
    page_box: Option<&PageBox>,
    metrics: &ScrollMetrics,
) -> ScrollAction {
    let rect = to_viewport(&position.bounding_rect, viewport, position.use_pdf_coordinates);

    match page_box {
        Some(page_box) => {
            ScrollAction::SetScrollTop(centered_scroll_top(page_box.offset_top, &rect, metrics))
        }
        None => ScrollAction::ScrollPageIntoView {
            page: position.page_number,
            destination: viewport.convert_to_pdf_point(0.0, rect.top),
        },
    }
}

/// Tracks the scrolled-to highlight and whether user scrolls are observed.
///
/// The scroll listener starts detached: only a programmatic navigation arms it
/// (after the re-attach delay), so that the navigation's own scroll does not
/// immediately clear the flash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollNavigator {
    scrolled_to: Option<HighlightId>,
    listening: bool,
}

impl ScrollNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scrolled_to(&self) -> Option<&HighlightId> {
        self.scrolled_to.as_ref()
    }

    pub fn is_scrolled_to(&self, id: &HighlightId) -> bool {
        self.scrolled_to.as_ref() == Some(id)
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Start a navigation: flash `id` and stop observing scrolls.
    pub fn begin(&mut self, id: HighlightId) {
        log::debug!("scrolling to highlight {id}");
        self.listening = false;
        self.scrolled_to = Some(id);
    }

    pub fn reattach(&mut self) {
        self.listening = true;
    }

    /// Flash expiry. Returns `true` if a highlight was flashed.
    pub fn clear_flash(&mut self) -> bool {
        self.scrolled_to.take().is_some()
    }

    /// A scroll event from the container. Returns `true` when the listener
    /// was attached; the flash is then cleared and the listener detached.
    pub fn on_scroll(&mut self) -> bool {
        if !self.listening {
            return false;
        }

        self.listening = false;
        self.scrolled_to = None;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Rect, ScaledRect};

    fn position(page: u32, top: f64) -> ScaledPosition {
        ScaledPosition {
            bounding_rect: ScaledRect {
                x1: 100.0,
                y1: top,
                x2: 300.0,
                y2: top + 100.0,
                width: 800.0,
                height: 1000.0,
                page_number: Some(page),
            },
            rects: Vec::new(),
            page_number: page,
            use_pdf_coordinates: false,
        }
    }

    fn metrics() -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: 0.0,
            client_height: 600.0,
            scroll_height: 3030.0,
        }
    }

    #[test]
    fn mounted_page_scrolls_container() {
        let viewport = PageViewport::for_page(800.0, 1000.0, 1.0);
        let page_box = PageBox {
            offset_top: 1010.0,
            width: 800.0,
            height: 1000.0,
            ..PageBox::default()
        };

        let action = scroll_action(&position(2, 400.0), &viewport, Some(&page_box), &metrics());
        assert_eq!(action, ScrollAction::SetScrollTop(1010.0 + 400.0 - 250.0));
    }

    #[test]
    fn target_is_clamped_to_scroll_range() {
        let viewport = PageViewport::for_page(800.0, 1000.0, 1.0);
        let page_box = PageBox {
            offset_top: 2020.0,
            ..PageBox::default()
        };

        let action = scroll_action(&position(3, 900.0), &viewport, Some(&page_box), &metrics());
        assert_eq!(action, ScrollAction::SetScrollTop(3030.0 - 600.0));

        let first_page = PageBox::default();
        let top = scroll_action(&position(1, 0.0), &viewport, Some(&first_page), &metrics());
        assert_eq!(top, ScrollAction::SetScrollTop(0.0));
    }

    #[test]
    fn unmounted_page_uses_pdf_destination() {
        let viewport = PageViewport::for_page(800.0, 1000.0, 1.0);

        let action = scroll_action(&position(3, 400.0), &viewport, None, &metrics());
        assert_eq!(
            action,
            ScrollAction::ScrollPageIntoView {
                page: 3,
                destination: (0.0, 600.0),
            }
        );
    }

    #[test]
    fn listener_is_armed_only_after_reattach() {
        let mut navigator = ScrollNavigator::new();
        assert!(!navigator.on_scroll());

        navigator.begin(HighlightId::from("h1"));
        assert!(navigator.is_scrolled_to(&HighlightId::from("h1")));
        assert!(!navigator.on_scroll());
        assert!(navigator.scrolled_to().is_some());

        navigator.reattach();
        assert!(navigator.on_scroll());
        assert!(navigator.scrolled_to().is_none());
        assert!(!navigator.is_listening());
    }

    #[test]
    fn flash_clear_reports_previous_state() {
        let mut navigator = ScrollNavigator::new();
        assert!(!navigator.clear_flash());

        navigator.begin(HighlightId::from("h1"));
        assert!(navigator.clear_flash());
        assert_eq!(navigator.scrolled_to(), None);
    }

    #[test]
    fn centring_uses_viewport_rect_height() {
        let rect = Rect::new(0.0, 400.0, 200.0, 100.0);
        assert_eq!(centered_scroll_top(1010.0, &rect, &metrics()), 1160.0);
    }
}
