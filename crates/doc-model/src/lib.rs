//! Highlight data model shared by every crate in the workspace.
//!
//! Two coordinate spaces are represented here:
//! - viewport space ([`Rect`], [`Position`]): pixels relative to a page as it is
//!   currently rendered
//! - scaled space ([`ScaledRect`], [`ScaledPosition`]): the persisted,
//!   resolution-independent form that survives zoom changes
//!
//! The serde representation (camelCase keys) is the wire contract with any
//! storage layer.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid highlight JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighlightId(pub String);

impl HighlightId {
    /// Fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HighlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HighlightId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for HighlightId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Rectangle in viewport pixels (left, top, width, height).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            page_number: None,
        }
    }

    pub fn on_page(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// True when the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Axis-aligned intersection test; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }
}

/// Rectangle normalized against a reference viewport.
///
/// `width` and `height` are the dimensions of the viewport the rectangle was
/// captured in, not the size of the rectangle itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

/// Viewport-space geometry of a highlight.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub bounding_rect: Rect,
    #[serde(default)]
    pub rects: Vec<Rect>,
    pub page_number: u32,
}

/// Persisted geometry of a highlight.
///
/// `use_pdf_coordinates` is decided once at capture time and must be handed to
/// every later transform of this position unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledPosition {
    pub bounding_rect: ScaledRect,
    #[serde(default)]
    pub rects: Vec<ScaledRect>,
    pub page_number: u32,
    #[serde(default)]
    pub use_pdf_coordinates: bool,
}

impl ScaledPosition {
    /// Page a rect belongs to, falling back to the position's own page.
    pub fn page_of(&self, rect: &ScaledRect) -> u32 {
        rect.page_number.unwrap_or(self.page_number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Text,
    Area,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    pub fn image(image: impl Into<String>) -> Self {
        Self {
            text: None,
            image: Some(image.into()),
        }
    }

    /// Area highlights carry an image; everything else is a text highlight.
    pub fn kind(&self) -> HighlightKind {
        if self.image.is_some() {
            HighlightKind::Area
        } else {
            HighlightKind::Text
        }
    }
}

pub type HighlightMeta = BTreeMap<String, serde_json::Value>;

/// A committed highlight record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: HighlightId,
    pub position: ScaledPosition,
    #[serde(default)]
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<HighlightMeta>,
}

impl Highlight {
    pub fn kind(&self) -> HighlightKind {
        self.content.kind()
    }

    /// Merge a patch into this highlight. The id is never touched.
    pub fn apply_patch(&mut self, patch: HighlightPatch) {
        if let Some(position) = patch.position {
            if let Some(bounding_rect) = position.bounding_rect {
                self.position.bounding_rect = bounding_rect;
            }
            if let Some(rects) = position.rects {
                self.position.rects = rects;
            }
            if let Some(page_number) = position.page_number {
                self.position.page_number = page_number;
            }
            if let Some(use_pdf_coordinates) = position.use_pdf_coordinates {
                self.position.use_pdf_coordinates = use_pdf_coordinates;
            }
        }

        if let Some(content) = patch.content {
            if content.text.is_some() {
                self.content.text = content.text;
            }
            if content.image.is_some() {
                self.content.image = content.image;
            }
        }

        if let Some(comment) = patch.comment {
            self.comment = comment;
        }

        if let Some(meta) = patch.meta {
            self.meta = Some(meta);
        }
    }
}

/// Payload handed to the caller when a new highlight should be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHighlight {
    pub position: ScaledPosition,
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl NewHighlight {
    pub fn into_highlight(self, id: HighlightId) -> Highlight {
        Highlight {
            id,
            position: self.position,
            content: self.content,
            comment: self.comment,
            meta: None,
        }
    }
}

/// Uncommitted, id-less highlight representing an in-progress selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostHighlight {
    pub position: ScaledPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

/// Position fields of a [`HighlightPatch`].
///
/// Area resizes recapture the whole position in viewport space, so they carry
/// `use_pdf_coordinates: Some(false)` rather than leaving the flag as captured.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_rect: Option<ScaledRect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rects: Option<Vec<ScaledRect>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_pdf_coordinates: Option<bool>,
}

/// Partial update for [`Highlight::apply_patch`].
///
/// `comment: Some(None)` removes the comment and travels as `"comment": null`;
/// an absent key leaves it alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub comment: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<HighlightMeta>,
}

// Only runs for keys that are present, so `null` becomes `Some(None)`.
fn present_or_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn highlights_from_json(json: &str) -> Result<Vec<Highlight>, ModelError> {
    Ok(serde_json::from_str(json)?)
}

pub fn highlights_to_json(highlights: &[Highlight]) -> Result<String, ModelError> {
    Ok(serde_json::to_string_pretty(highlights)?)
}
