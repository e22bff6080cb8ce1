//! Caller-side highlight collection.
//!
//! The highlighter never persists anything itself; hosts keep their
//! highlights in a [`HighlightStore`] (or their own storage) and feed them
//! back in after every change.

use crate::error::{HighlighterError, Result};
use doc_model::{Highlight, HighlightId, HighlightPatch, ModelError, NewHighlight};
use std::fmt;

type IdGenerator = Box<dyn FnMut() -> HighlightId>;

/// Ordered highlight collection, newest first.
pub struct HighlightStore {
    highlights: Vec<Highlight>,
    next_id: IdGenerator,
}

impl HighlightStore {
    /// Empty store assigning UUID v4 ids.
    pub fn new() -> Self {
        Self {
            highlights: Vec::new(),
            next_id: Box::new(HighlightId::generate),
        }
    }

    pub fn with_highlights(mut self, highlights: Vec<Highlight>) -> Self {
        self.highlights = highlights;
        self
    }

    /// Replace the id generator, e.g. with a deterministic counter.
    pub fn with_id_generator<F>(mut self, generator: F) -> Self
    where
        F: FnMut() -> HighlightId + 'static,
    {
        self.next_id = Box::new(generator);
        self
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, ModelError> {
        Ok(Self::new().with_highlights(doc_model::highlights_from_json(json)?))
    }

    pub fn to_json(&self) -> std::result::Result<String, ModelError> {
        doc_model::highlights_to_json(&self.highlights)
    }

    /// Commit a new highlight at the front of the collection and return its id.
    pub fn add(&mut self, highlight: NewHighlight) -> HighlightId {
        let id = (self.next_id)();
        self.highlights.insert(0, highlight.into_highlight(id.clone()));
        log::debug!("added highlight {id}");
        id
    }

    /// Merge `patch` into the highlight with `id`.
    pub fn update(&mut self, id: &HighlightId, patch: HighlightPatch) -> Result<()> {
        let highlight = self
            .get_mut(id)
            .ok_or_else(|| HighlighterError::UnknownHighlight(id.clone()))?;
        highlight.apply_patch(patch);
        Ok(())
    }

    pub fn delete(&mut self, id: &HighlightId) -> Option<Highlight> {
        let index = self.highlights.iter().position(|highlight| &highlight.id == id)?;
        Some(self.highlights.remove(index))
    }

    /// Set the comment of a highlight. Blank comments remove it.
    pub fn save_comment(&mut self, id: &HighlightId, comment: &str) -> Result<()> {
        let trimmed = comment.trim();
        let comment = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self.update(id, HighlightPatch {
            comment: Some(comment),
            ..HighlightPatch::default()
        })
    }

    pub fn reset(&mut self, highlights: Vec<Highlight>) {
        self.highlights = highlights;
    }

    pub fn get(&self, id: &HighlightId) -> Option<&Highlight> {
        self.highlights.iter().find(|highlight| &highlight.id == id)
    }

    fn get_mut(&mut self, id: &HighlightId) -> Option<&mut Highlight> {
        self.highlights.iter_mut().find(|highlight| &highlight.id == id)
    }

    pub fn as_slice(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn iter(&self) -> impl Iterator<Item = &Highlight> {
        self.highlights.iter()
    }

    pub fn len(&self) -> usize {
        self.highlights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }
}

impl Default for HighlightStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HighlightStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightStore")
            .field("highlights", &self.highlights)
            .finish_non_exhaustive()
    }
}
