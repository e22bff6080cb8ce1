//! Lazily created per-page overlay layers.

use crate::renderer::{OverlayHandle, OverlayHost};
use std::collections::BTreeMap;

/// Cache of overlay handles keyed by page.
///
/// The renderer may unmount a page at any time, detaching its overlay. A cached
/// handle is reused only while it is still attached; otherwise a new overlay is
/// created in its place.
#[derive(Debug, Clone, Default)]
pub struct OverlayCache {
    handles: BTreeMap<u32, OverlayHandle>,
}

impl OverlayCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attached overlay for `page`, creating one if needed. `None` when the
    /// page cannot host an overlay yet.
    pub fn resolve<H: OverlayHost + ?Sized>(
        &mut self,
        host: &mut H,
        page: u32,
    ) -> Option<OverlayHandle> {
        if let Some(handle) = self.handles.get(&page).copied() {
            if host.is_overlay_attached(handle) {
                return Some(handle);
            }
            log::debug!("overlay for page {page} was detached, recreating");
        }

        match host.create_overlay(page) {
            Some(handle) => {
                self.handles.insert(page, handle);
                Some(handle)
            }
            None => {
                self.handles.remove(&page);
                None
            }
        }
    }

    pub fn get(&self, page: u32) -> Option<OverlayHandle> {
        self.handles.get(&page).copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}
