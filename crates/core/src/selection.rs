//! Turning native text selections and drawn rectangles into highlight
//! positions.
//!
//! Capture is a pure transform: nothing here mutates the renderer or the
//! highlight collection. The controller decides what to do with the result.

use crate::renderer::{PageBox, PageGeometry};
use doc_model::{Content, Position, Rect, ScaledPosition};
use viewer_core::{bounding_rect, optimize_client_rects, viewport_position_to_scaled};

/// Snapshot of the host's native text selection.
///
/// `client_rects` are in client coordinates, as reported by the host for the
/// selected range.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NativeTextSelection {
    pub is_collapsed: bool,
    /// Whether the range lies inside the viewer container.
    pub inside_container: bool,
    /// Page holding the start of the range, if it starts inside a page.
    pub start_page: Option<u32>,
    /// Page holding the end of the range, if it ends inside a page.
    pub end_page: Option<u32>,
    pub client_rects: Vec<Rect>,
    pub text: String,
}

impl NativeTextSelection {
    /// Every page from the start page to the end page, inclusive.
    pub fn pages(&self) -> Vec<u32> {
        match (self.start_page, self.end_page) {
            (Some(start), Some(end)) if start <= end => (start..=end).collect(),
            (Some(start), Some(end)) => (end..=start).collect(),
            _ => Vec::new(),
        }
    }
}

/// A finished selection, in both coordinate spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSelection {
    /// Position in the current viewport, used to anchor the selection tip.
    pub viewport_position: Position,
    pub position: ScaledPosition,
    pub content: Content,
}

fn inside_page(rect: &Rect, page: &Rect) -> bool {
    rect.top >= page.top
        && rect.bottom() <= page.bottom()
        && rect.left >= page.left
        && rect.right() <= page.right()
}

/// Assign client rects to pages and convert them to page-relative pixels.
///
/// A rect is kept for a page when it lies within the page's client box, has a
/// positive size, and is smaller than the page itself (which filters out
/// container-sized rects some hosts report for block elements). The result is
/// run through [`optimize_client_rects`].
pub fn client_rects_on_pages(client_rects: &[Rect], pages: &[(u32, PageBox)]) -> Vec<Rect> {
    let mut rects = Vec::new();

    for client_rect in client_rects {
        for (page_number, page) in pages {
            let page_rect = &page.client;
            let accepted = inside_page(client_rect, page_rect)
                && client_rect.top >= 0.0
                && client_rect.bottom() >= 0.0
                && !client_rect.is_empty()
                && client_rect.width < page_rect.width
                && client_rect.height < page_rect.height;

            if accepted {
                rects.push(Rect {
                    left: client_rect.left + page.scroll_left - page_rect.left,
                    top: client_rect.top + page.scroll_top - page_rect.top,
                    width: client_rect.width,
                    height: client_rect.height,
                    page_number: Some(*page_number),
                });
                break;
            }
        }
    }

    optimize_client_rects(rects)
}

/// Capture a text selection.
///
/// Returns `None` for a collapsed selection, one outside the viewer container,
/// one that does not start and end inside pages, or one that yields no usable
/// client rects. The bounding rect covers only the first page of a multi-page
/// selection and the whole position is normalized against that page's viewport.
pub fn capture_text<G: PageGeometry + ?Sized>(
    geometry: &G,
    selection: &NativeTextSelection,
) -> Option<CapturedSelection> {
    if selection.is_collapsed || !selection.inside_container {
        return None;
    }

    let pages: Vec<(u32, PageBox)> = selection
        .pages()
        .into_iter()
        .filter_map(|page| geometry.page_box(page).map(|page_box| (page, page_box)))
        .collect();
    let first_page = pages.first()?.0;

    let rects = client_rects_on_pages(&selection.client_rects, &pages);
    let bounds = bounding_rect(&rects)?;
    let viewport = geometry.page_viewport(first_page)?;

    let viewport_position = Position {
        bounding_rect: bounds,
        rects,
        page_number: first_page,
    };
    let position = viewport_position_to_scaled(&viewport_position, &viewport);
    log::debug!(
        "captured text selection on page {first_page} with {} rects",
        viewport_position.rects.len()
    );

    Some(CapturedSelection {
        viewport_position,
        position,
        content: Content::text(selection.text.clone()),
    })
}

/// In-progress rectangle drag, in container content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaDrag {
    page: u32,
    start: (f64, f64),
    end: Option<(f64, f64)>,
}

impl AreaDrag {
    pub fn begin(page: u32, point: (f64, f64)) -> Self {
        Self {
            page,
            start: point,
            end: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn update(&mut self, point: (f64, f64)) {
        self.end = Some(point);
    }

    /// The drag rectangle is drawn once the pointer has moved.
    pub fn is_visible(&self) -> bool {
        self.end.is_some()
    }

    pub fn rect(&self) -> Rect {
        let (x0, y0) = self.start;
        let (x1, y1) = self.end.unwrap_or(self.start);
        Rect::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }

    /// Finish the drag. Drags under one pixel in either axis produce nothing.
    pub fn finish(self) -> Option<(u32, Rect)> {
        let rect = self.rect();
        if rect.width < 1.0 || rect.height < 1.0 {
            return None;
        }
        Some((self.page, rect))
    }
}

/// Convert a finished drag rectangle into a page-relative area position.
///
/// The rect arrives in container content coordinates and is shifted by the
/// page's offset. `rects` stays empty for area highlights. Content is left
/// empty; the caller fills in the captured image.
pub fn capture_area<G: PageGeometry + ?Sized>(
    geometry: &G,
    page: u32,
    rect: &Rect,
) -> Option<CapturedSelection> {
    let page_box = geometry.page_box(page)?;
    let viewport = geometry.page_viewport(page)?;

    let bounds = Rect {
        left: rect.left - page_box.offset_left,
        top: rect.top - page_box.offset_top,
        width: rect.width,
        height: rect.height,
        page_number: Some(page),
    };
    let viewport_position = Position {
        bounding_rect: bounds,
        rects: Vec::new(),
        page_number: page,
    };
    let position = viewport_position_to_scaled(&viewport_position, &viewport);

    Some(CapturedSelection {
        viewport_position,
        position,
        content: Content::default(),
    })
}
