//! Highlight rendering glue.
//!
//! Each page group is converted to viewport space and handed, highlight by
//! highlight, to a transform that produces whatever the renderer draws. The
//! built-in transform yields a [`HighlightShape`].

use crate::partition::PageHighlight;
use doc_model::{
    Content, HighlightId, HighlightKind, HighlightPatch, Position, PositionPatch, Rect, ScaledRect,
};
use viewer_core::{scaled_position_to_viewport, to_scaled, PageViewport};

/// A page-local highlight converted to the page's current viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportHighlight {
    pub id: Option<HighlightId>,
    pub position: Position,
    pub content: Content,
    pub comment: Option<String>,
}

impl ViewportHighlight {
    pub fn from_page_highlight(highlight: &PageHighlight, viewport: &PageViewport) -> Self {
        Self {
            id: highlight.id.clone(),
            position: scaled_position_to_viewport(&highlight.position, viewport),
            content: highlight.content.clone(),
            comment: highlight.comment.clone(),
        }
    }

    pub fn kind(&self) -> HighlightKind {
        self.content.kind()
    }
}

/// Context handed to the highlight transform.
#[derive(Debug, Clone, Copy)]
pub struct RenderHelpers<'a> {
    pub page_number: u32,
    /// Index of the highlight within its page group.
    pub index: usize,
    pub is_scrolled_to: bool,
    pub viewport: &'a PageViewport,
}

impl RenderHelpers<'_> {
    pub fn viewport_to_scaled(&self, rect: &Rect) -> ScaledRect {
        to_scaled(rect, self.viewport)
    }
}

/// Built-in renderable for text and area highlights.
#[derive(Debug, Clone, PartialEq)]
pub enum HighlightShape {
    Text {
        id: Option<HighlightId>,
        rects: Vec<Rect>,
        comment: Option<String>,
        is_scrolled_to: bool,
    },
    Area {
        id: Option<HighlightId>,
        bounding_rect: Rect,
        image: Option<String>,
        is_scrolled_to: bool,
    },
}

impl HighlightShape {
    pub fn id(&self) -> Option<&HighlightId> {
        match self {
            Self::Text { id, .. } | Self::Area { id, .. } => id.as_ref(),
        }
    }

    pub fn is_scrolled_to(&self) -> bool {
        match self {
            Self::Text { is_scrolled_to, .. } | Self::Area { is_scrolled_to, .. } => {
                *is_scrolled_to
            }
        }
    }
}

pub fn default_highlight_transform(
    highlight: &ViewportHighlight,
    helpers: &RenderHelpers<'_>,
) -> HighlightShape {
    match highlight.kind() {
        HighlightKind::Text => HighlightShape::Text {
            id: highlight.id.clone(),
            rects: highlight.position.rects.clone(),
            comment: highlight.comment.clone(),
            is_scrolled_to: helpers.is_scrolled_to,
        },
        HighlightKind::Area => HighlightShape::Area {
            id: highlight.id.clone(),
            bounding_rect: highlight.position.bounding_rect,
            image: highlight.content.image.clone(),
            is_scrolled_to: helpers.is_scrolled_to,
        },
    }
}

/// Run `transform` over one page group.
pub fn page_shapes<S, F>(
    group: &[PageHighlight],
    page_number: u32,
    viewport: &PageViewport,
    scrolled_to: Option<&HighlightId>,
    mut transform: F,
) -> Vec<S>
where
    F: FnMut(&ViewportHighlight, &RenderHelpers<'_>) -> S,
{
    group
        .iter()
        .enumerate()
        .map(|(index, highlight)| {
            let viewport_highlight = ViewportHighlight::from_page_highlight(highlight, viewport);
            let helpers = RenderHelpers {
                page_number,
                index,
                is_scrolled_to: scrolled_to.is_some() && highlight.id.as_ref() == scrolled_to,
                viewport,
            };
            transform(&viewport_highlight, &helpers)
        })
        .collect()
}

/// Update payload for an area highlight resized to `bounding_rect`.
///
/// The new bounding rect and the existing rects are normalized against the
/// page's current viewport, which always yields top-left-origin coordinates,
/// so the patch also resets `use_pdf_coordinates`.
pub fn area_resize_patch(
    highlight: &ViewportHighlight,
    bounding_rect: &Rect,
    viewport: &PageViewport,
    image: Option<String>,
) -> HighlightPatch {
    let scaled_bounds = to_scaled(bounding_rect, viewport);
    let scaled_rects = highlight
        .position
        .rects
        .iter()
        .map(|rect| to_scaled(rect, viewport))
        .collect();

    HighlightPatch {
        position: Some(PositionPatch {
            bounding_rect: Some(scaled_bounds),
            rects: Some(scaled_rects),
            page_number: Some(highlight.position.page_number),
            use_pdf_coordinates: Some(false),
        }),
        content: image.map(Content::image),
        ..HighlightPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::ScaledPosition;

    fn page_highlight(id: Option<&str>, content: Content) -> PageHighlight {
        let rect = ScaledRect {
            x1: 10.0,
            y1: 20.0,
            x2: 110.0,
            y2: 40.0,
            width: 400.0,
            height: 500.0,
            page_number: Some(1),
        };
        PageHighlight {
            id: id.map(HighlightId::from),
            position: ScaledPosition {
                bounding_rect: rect,
                rects: vec![rect],
                page_number: 1,
                use_pdf_coordinates: false,
            },
            content,
            comment: Some("remember".to_owned()),
        }
    }

    #[test]
    fn shapes_are_projected_to_current_zoom() {
        let viewport = PageViewport::for_page(800.0, 1000.0, 1.0);
        let group = vec![page_highlight(Some("h1"), Content::text("hello"))];

        let shapes = page_shapes(&group, 1, &viewport, None, default_highlight_transform);
        let HighlightShape::Text {
            rects,
            comment,
            is_scrolled_to,
            ..
        } = &shapes[0]
        else {
            panic!("text shape expected");
        };
        assert_eq!(rects, &vec![Rect::new(20.0, 40.0, 200.0, 40.0).on_page(1)]);
        assert_eq!(comment.as_deref(), Some("remember"));
        assert!(!is_scrolled_to);
    }

    #[test]
    fn scrolled_to_flag_matches_by_id() {
        let viewport = PageViewport::for_page(400.0, 500.0, 1.0);
        let group = vec![
            page_highlight(None, Content::default()),
            page_highlight(Some("h1"), Content::image("png")),
        ];
        let target = HighlightId::from("h1");

        let shapes = page_shapes(&group, 1, &viewport, Some(&target), default_highlight_transform);
        assert!(!shapes[0].is_scrolled_to());
        assert!(shapes[1].is_scrolled_to());
        assert!(
            matches!(shapes[1], HighlightShape::Area { ref image, .. } if image.as_deref() == Some("png"))
        );
    }

    #[test]
    fn custom_transform_sees_index_and_page() {
        let viewport = PageViewport::for_page(400.0, 500.0, 1.0);
        let group = vec![
            page_highlight(Some("a"), Content::text("a")),
            page_highlight(Some("b"), Content::text("b")),
        ];

        let label = |highlight: &ViewportHighlight, helpers: &RenderHelpers<'_>| {
            let text = highlight.content.text.as_deref().unwrap_or("");
            format!("{}:{}:{}", helpers.page_number, helpers.index, text)
        };
        let labels = page_shapes(&group, 7, &viewport, None, label);
        assert_eq!(labels, vec!["7:0:a", "7:1:b"]);
    }

    #[test]
    fn resize_patch_rescales_and_recaptures() {
        let viewport = PageViewport::for_page(800.0, 1000.0, 1.0);
        let highlight = ViewportHighlight {
            id: Some(HighlightId::from("area")),
            position: Position {
                bounding_rect: Rect::new(10.0, 10.0, 50.0, 50.0),
                rects: Vec::new(),
                page_number: 2,
            },
            content: Content::image("old"),
            comment: None,
        };

        let resized = Rect::new(20.0, 30.0, 100.0, 60.0);
        let patch = area_resize_patch(&highlight, &resized, &viewport, Some("new".to_owned()));
        let position = patch.position.expect("position patch expected");
        let bounds = position.bounding_rect.expect("bounding rect expected");
        assert_eq!((bounds.x1, bounds.y1, bounds.x2, bounds.y2), (20.0, 30.0, 120.0, 90.0));
        assert_eq!((bounds.width, bounds.height), (800.0, 1000.0));
        assert_eq!(position.page_number, Some(2));
        assert_eq!(position.use_pdf_coordinates, Some(false));
        assert_eq!(patch.content, Some(Content::image("new")));
        assert_eq!(patch.comment, None);
    }
}
