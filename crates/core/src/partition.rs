//! Per-page grouping of highlights.
//!
//! A highlight whose rects span several pages is split into one page-local copy
//! per page, each holding only the rects that belong to that page. The bounding
//! rect is passed through unchanged.

use doc_model::{Content, GhostHighlight, Highlight, HighlightId, Rect, ScaledPosition};
use std::collections::{BTreeMap, BTreeSet};
use viewer_core::{to_viewport, PageViewport};

/// Page-local copy of a committed highlight or of the ghost.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHighlight {
    /// `None` for the ghost highlight.
    pub id: Option<HighlightId>,
    pub position: ScaledPosition,
    pub content: Content,
    pub comment: Option<String>,
}

impl PageHighlight {
    pub fn is_ghost(&self) -> bool {
        self.id.is_none()
    }
}

pub type PageGroups = BTreeMap<u32, Vec<PageHighlight>>;

struct Candidate<'a> {
    id: Option<&'a HighlightId>,
    position: &'a ScaledPosition,
    content: Option<&'a Content>,
    comment: Option<&'a String>,
}

impl<'a> From<&'a Highlight> for Candidate<'a> {
    fn from(highlight: &'a Highlight) -> Self {
        Self {
            id: Some(&highlight.id),
            position: &highlight.position,
            content: Some(&highlight.content),
            comment: highlight.comment.as_ref(),
        }
    }
}

impl<'a> From<&'a GhostHighlight> for Candidate<'a> {
    fn from(ghost: &'a GhostHighlight) -> Self {
        Self {
            id: None,
            position: &ghost.position,
            content: ghost.content.as_ref(),
            comment: None,
        }
    }
}

impl Candidate<'_> {
    fn on_page(&self, page: u32) -> Option<PageHighlight> {
        let rects: Vec<_> = self
            .position
            .rects
            .iter()
            .filter(|rect| self.position.page_of(rect) == page)
            .copied()
            .collect();

        if rects.is_empty() && self.position.page_number != page {
            return None;
        }

        Some(PageHighlight {
            id: self.id.cloned(),
            position: ScaledPosition {
                bounding_rect: self.position.bounding_rect,
                rects,
                page_number: page,
                use_pdf_coordinates: self.position.use_pdf_coordinates,
            },
            content: self.content.cloned().unwrap_or_default(),
            comment: self.comment.cloned(),
        })
    }
}

/// Group `highlights` (and the ghost, if any) by page.
///
/// Every page named by a highlight's own page or by one of its rects gets a
/// group. The ghost always comes first in each group it appears in.
pub fn partition(highlights: &[Highlight], ghost: Option<&GhostHighlight>) -> PageGroups {
    let candidates: Vec<Candidate<'_>> = ghost
        .map(Candidate::from)
        .into_iter()
        .chain(highlights.iter().map(Candidate::from))
        .collect();

    let pages: BTreeSet<u32> = candidates
        .iter()
        .flat_map(|candidate| {
            std::iter::once(candidate.position.page_number)
                .chain(candidate.position.rects.iter().filter_map(|rect| rect.page_number))
        })
        .collect();

    pages
        .into_iter()
        .map(|page| {
            let group = candidates.iter().filter_map(|candidate| candidate.on_page(page)).collect();
            (page, group)
        })
        .collect()
}

/// Decides whether a candidate highlight overlaps an existing one.
///
/// Both sides are the page-local rects in the page's current viewport pixels.
pub trait OverlapPolicy {
    fn overlaps(&self, candidate: &[Rect], existing: &[Rect]) -> bool;
}

impl<F> OverlapPolicy for F
where
    F: Fn(&[Rect], &[Rect]) -> bool,
{
    fn overlaps(&self, candidate: &[Rect], existing: &[Rect]) -> bool {
        self(candidate, existing)
    }
}

/// Overlap when any candidate rect intersects any existing rect.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectIntersection;

impl OverlapPolicy for RectIntersection {
    fn overlaps(&self, candidate: &[Rect], existing: &[Rect]) -> bool {
        candidate.iter().any(|a| existing.iter().any(|b| a.intersects(b)))
    }
}

fn viewport_rects(highlight: &PageHighlight, viewport: &PageViewport) -> Vec<Rect> {
    let use_pdf = highlight.position.use_pdf_coordinates;
    if highlight.position.rects.is_empty() {
        return vec![to_viewport(&highlight.position.bounding_rect, viewport, use_pdf)];
    }

    highlight.position.rects.iter().map(|rect| to_viewport(rect, viewport, use_pdf)).collect()
}

/// Ids of the committed highlights in `group` that overlap `candidate`.
///
/// Highlights without rects (area highlights) are compared by their bounding
/// rect. Ghosts in the group are skipped.
pub fn find_overlapping<P: OverlapPolicy + ?Sized>(
    group: &[PageHighlight],
    candidate: &PageHighlight,
    viewport: &PageViewport,
    policy: &P,
) -> Vec<HighlightId> {
    let candidate_rects = viewport_rects(candidate, viewport);

    group
        .iter()
        .filter(|existing| existing.id.is_some() && existing.id != candidate.id)
        .filter(|existing| policy.overlaps(&candidate_rects, &viewport_rects(existing, viewport)))
        .filter_map(|existing| existing.id.clone())
        .collect()
}
