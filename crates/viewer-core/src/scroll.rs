//! Scroll offset math for bringing a highlight into view.

use doc_model::Rect;

/// Scroll state of the viewer container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

/// Scroll offset that vertically centres `rect` (page-relative viewport pixels)
/// within the container, clamped to the scrollable range.
pub fn centered_scroll_top(page_offset_top: f64, rect: &Rect, metrics: &ScrollMetrics) -> f64 {
    let target = page_offset_top + rect.top - (metrics.client_height - rect.height) / 2.0;
    target.min(metrics.max_scroll_top()).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: 0.0,
            client_height: 600.0,
            scroll_height: 3000.0,
        }
    }

    #[test]
    fn centres_rect_in_container() {
        let rect = Rect::new(0.0, 400.0, 100.0, 100.0);
        assert_eq!(centered_scroll_top(1000.0, &rect, &metrics()), 1150.0);
    }

    #[test]
    fn clamps_near_document_start() {
        let rect = Rect::new(0.0, 20.0, 100.0, 20.0);
        assert_eq!(centered_scroll_top(0.0, &rect, &metrics()), 0.0);
    }

    #[test]
    fn clamps_near_document_end() {
        let rect = Rect::new(0.0, 900.0, 100.0, 20.0);
        assert_eq!(centered_scroll_top(2000.0, &rect, &metrics()), 2400.0);
    }

    #[test]
    fn content_shorter_than_container_never_scrolls() {
        let short = ScrollMetrics {
            scroll_top: 0.0,
            client_height: 800.0,
            scroll_height: 500.0,
        };
        let rect = Rect::new(0.0, 300.0, 10.0, 10.0);
        assert_eq!(centered_scroll_top(0.0, &rect, &short), 0.0);
    }
}
