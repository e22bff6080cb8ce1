//! The highlighter controller.
//!
//! [`Highlighter`] sits between host events and a [`DocumentRenderer`]. It
//! captures selections, keeps the interaction state, drives every delay through
//! a virtual-clock timer queue and redraws the per-page overlays. Hosts feed it
//! events and call [`Highlighter::advance_to`] with the current time.

use crate::config::HighlighterConfig;
use crate::error::{HighlighterError, Result};
use crate::navigator::{scroll_action, ScrollAction, ScrollNavigator};
use crate::overlay::OverlayCache;
use crate::partition::{partition, PageGroups};
use crate::render::{
    area_resize_patch, default_highlight_transform, page_shapes, HighlightShape, RenderHelpers,
    ViewportHighlight,
};
use crate::renderer::DocumentRenderer;
use crate::selection::{
    capture_area, capture_text, AreaDrag, CapturedSelection, NativeTextSelection,
};
use crate::tip::{
    apply_tip_event, InteractionState, PopupContent, Tip, TipEffect, TipEvent, TipPhase,
    TipPlacement,
};
use doc_model::{
    Content, GhostHighlight, Highlight, HighlightId, HighlightPatch, NewHighlight, Rect,
    ScaledPosition,
};
use pdf_highlighter_scheduler::KeyedTimers;
use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;
use viewer_core::{scaled_position_to_viewport, ScaleValue, WheelInput, ZoomController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    HoverShow,
    HoverHide,
    ScrollReattach,
    FlashClear,
    ResizeDebounce,
    DeferredSelection,
}

/// Where a pointer-down landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Tip,
    Highlight,
    Elsewhere,
}

/// Deferred scroll-to entry point handed to the host once the document is
/// ready. Requests are carried out on the next [`Highlighter::advance_to`].
#[derive(Debug, Clone, Default)]
pub struct ScrollHandle {
    requests: Rc<RefCell<VecDeque<Highlight>>>,
}

impl ScrollHandle {
    pub fn scroll_to(&self, highlight: &Highlight) {
        self.requests.borrow_mut().push_back(highlight.clone());
    }

    pub fn pending(&self) -> usize {
        self.requests.borrow().len()
    }

    fn take(&self) -> Vec<Highlight> {
        self.requests.borrow_mut().drain(..).collect()
    }
}

type Callback<T> = Option<Box<dyn FnMut(T)>>;
type Transform<S> = Box<dyn FnMut(&ViewportHighlight, &RenderHelpers<'_>) -> S>;

/// Callbacks into the host. Every hook is optional.
pub struct HighlighterHooks<P> {
    on_create: Callback<NewHighlight>,
    on_update: Option<Box<dyn FnMut(&HighlightId, HighlightPatch)>>,
    on_selection_finished: Option<Box<dyn FnMut(&ScaledPosition, &Content) -> Option<P>>>,
    render_popup: Option<Box<dyn FnMut(&ViewportHighlight) -> Option<P>>>,
    on_highlight_hover: Option<Box<dyn FnMut(&ViewportHighlight)>>,
    on_highlight_blur: Option<Box<dyn FnMut(&ViewportHighlight)>>,
    on_highlight_context_menu: Option<Box<dyn FnMut(&ViewportHighlight)>>,
    on_scroll_change: Option<Box<dyn FnMut()>>,
    on_text_layer_ready: Callback<u32>,
    on_document_ready: Option<Box<dyn FnMut()>>,
    scroll_ref: Callback<ScrollHandle>,
}

impl<P> Default for HighlighterHooks<P> {
    fn default() -> Self {
        Self {
            on_create: None,
            on_update: None,
            on_selection_finished: None,
            render_popup: None,
            on_highlight_hover: None,
            on_highlight_blur: None,
            on_highlight_context_menu: None,
            on_scroll_change: None,
            on_text_layer_ready: None,
            on_document_ready: None,
            scroll_ref: None,
        }
    }
}

/// Overlay controller for one document.
///
/// `P` is the popup content type produced by the host's hooks.
pub struct Highlighter<R: DocumentRenderer, P> {
    renderer: R,
    config: HighlighterConfig,
    hooks: HighlighterHooks<P>,
    transform: Transform<R::Shape>,
    highlights: Vec<Highlight>,
    interaction: InteractionState<P>,
    navigator: ScrollNavigator,
    zoom: ZoomController,
    timers: KeyedTimers<TimerKind>,
    overlays: OverlayCache,
    scroll_handle: ScrollHandle,
    native_selection: Option<NativeTextSelection>,
    pending_selection: Option<CapturedSelection>,
    drag: Option<AreaDrag>,
    area_selection_enabled: bool,
    text_layer_pages: BTreeSet<u32>,
    rendered_on_load: bool,
    initialized: bool,
}

fn default_shape<S: From<HighlightShape>>(
    highlight: &ViewportHighlight,
    helpers: &RenderHelpers<'_>,
) -> S {
    default_highlight_transform(highlight, helpers).into()
}

impl<R, P> Highlighter<R, P>
where
    R: DocumentRenderer,
    R::Shape: From<HighlightShape> + 'static,
{
    /// Controller drawing the built-in text and area shapes.
    pub fn new(renderer: R, config: HighlighterConfig) -> Self {
        Self::with_transform(renderer, config, default_shape::<R::Shape>)
    }
}

impl<R: DocumentRenderer, P> Highlighter<R, P> {
    /// Controller drawing whatever `transform` produces per highlight.
    pub fn with_transform<F>(renderer: R, config: HighlighterConfig, transform: F) -> Self
    where
        F: FnMut(&ViewportHighlight, &RenderHelpers<'_>) -> R::Shape + 'static,
    {
        let zoom = ZoomController::new(config.zoom.clone());

        Self {
            renderer,
            config,
            hooks: HighlighterHooks::default(),
            transform: Box::new(transform),
            highlights: Vec::new(),
            interaction: InteractionState::default(),
            navigator: ScrollNavigator::new(),
            zoom,
            timers: KeyedTimers::new(),
            overlays: OverlayCache::new(),
            scroll_handle: ScrollHandle::default(),
            native_selection: None,
            pending_selection: None,
            drag: None,
            area_selection_enabled: false,
            text_layer_pages: BTreeSet::new(),
            rendered_on_load: false,
            initialized: false,
        }
    }

    pub fn on_create(mut self, hook: impl FnMut(NewHighlight) + 'static) -> Self {
        self.hooks.on_create = Some(Box::new(hook));
        self
    }

    pub fn on_update(mut self, hook: impl FnMut(&HighlightId, HighlightPatch) + 'static) -> Self {
        self.hooks.on_update = Some(Box::new(hook));
        self
    }

    /// Without this hook a finished selection is committed immediately.
    pub fn on_selection_finished(
        mut self,
        hook: impl FnMut(&ScaledPosition, &Content) -> Option<P> + 'static,
    ) -> Self {
        self.hooks.on_selection_finished = Some(Box::new(hook));
        self
    }

    /// Without this hook hover tips show the highlight's comment.
    pub fn render_popup(
        mut self,
        hook: impl FnMut(&ViewportHighlight) -> Option<P> + 'static,
    ) -> Self {
        self.hooks.render_popup = Some(Box::new(hook));
        self
    }

    pub fn on_highlight_hover(mut self, hook: impl FnMut(&ViewportHighlight) + 'static) -> Self {
        self.hooks.on_highlight_hover = Some(Box::new(hook));
        self
    }

    pub fn on_highlight_blur(mut self, hook: impl FnMut(&ViewportHighlight) + 'static) -> Self {
        self.hooks.on_highlight_blur = Some(Box::new(hook));
        self
    }

    pub fn on_highlight_context_menu(
        mut self,
        hook: impl FnMut(&ViewportHighlight) + 'static,
    ) -> Self {
        self.hooks.on_highlight_context_menu = Some(Box::new(hook));
        self
    }

    pub fn on_scroll_change(mut self, hook: impl FnMut() + 'static) -> Self {
        self.hooks.on_scroll_change = Some(Box::new(hook));
        self
    }

    pub fn on_text_layer_ready(mut self, hook: impl FnMut(u32) + 'static) -> Self {
        self.hooks.on_text_layer_ready = Some(Box::new(hook));
        self
    }

    pub fn on_document_ready(mut self, hook: impl FnMut() + 'static) -> Self {
        self.hooks.on_document_ready = Some(Box::new(hook));
        self
    }

    pub fn scroll_ref(mut self, hook: impl FnMut(ScrollHandle) + 'static) -> Self {
        self.hooks.scroll_ref = Some(Box::new(hook));
        self
    }

    pub fn with_area_selection(mut self, enabled: bool) -> Self {
        self.area_selection_enabled = enabled;
        self
    }

    pub fn config(&self) -> &HighlighterConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn interaction(&self) -> &InteractionState<P> {
        &self.interaction
    }

    pub fn phase(&self) -> TipPhase {
        self.interaction.phase()
    }

    pub fn tip(&self) -> Option<&Tip<P>> {
        self.interaction.tip.as_ref()
    }

    pub fn ghost(&self) -> Option<&GhostHighlight> {
        self.interaction.ghost.as_ref()
    }

    pub fn scrolled_to(&self) -> Option<&HighlightId> {
        self.navigator.scrolled_to()
    }

    pub fn scale(&self) -> ScaleValue {
        self.zoom.scale()
    }

    pub fn zoom_label(&self) -> String {
        self.zoom.label()
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Selection awaiting a commit decision from the selection tip.
    pub fn pending_selection(&self) -> Option<&CapturedSelection> {
        self.pending_selection.as_ref()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn is_timer_pending(&self, kind: TimerKind) -> bool {
        self.timers.is_pending(kind)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn scroll_handle(&self) -> ScrollHandle {
        self.scroll_handle.clone()
    }

    /// Mount on the renderer's container.
    ///
    /// # Errors
    /// Returns [`HighlighterError::ContainerUnavailable`] when the renderer has
    /// no container to mount on.
    pub fn init(&mut self) -> Result<()> {
        if !self.renderer.has_container() {
            return Err(HighlighterError::ContainerUnavailable);
        }

        self.text_layer_pages.clear();
        self.rendered_on_load = false;
        self.overlays.clear();
        self.initialized = true;
        log::info!("highlighter initialized for {} pages", self.renderer.page_count());
        Ok(())
    }

    /// Document finished loading: apply the scale and hand out the scroll
    /// handle.
    pub fn document_ready(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(HighlighterError::NotInitialized);
        }

        self.renderer.set_scale_value(self.zoom.scale());
        if let Some(hook) = self.hooks.scroll_ref.as_mut() {
            hook(self.scroll_handle.clone());
        }
        if let Some(hook) = self.hooks.on_document_ready.as_mut() {
            hook();
        }
        Ok(())
    }

    pub fn set_highlights(&mut self, highlights: Vec<Highlight>) {
        self.highlights = highlights;
        self.render_highlight_layers();
    }

    pub fn on_text_layer_rendered(&mut self, page: u32) {
        if page > 0 {
            self.text_layer_pages.insert(page);
            if let Some(hook) = self.hooks.on_text_layer_ready.as_mut() {
                hook(page);
            }
        }

        self.render_highlight_layers();

        let all_rendered = self.text_layer_pages.len() == self.renderer.page_count() as usize;
        if self.config.force_render_on_load && !self.rendered_on_load && all_rendered {
            self.rendered_on_load = true;
            log::debug!("all text layers rendered, forcing overlay render");
            self.render_highlight_layers();
        }
    }

    pub fn page_groups(&self) -> PageGroups {
        partition(&self.highlights, self.interaction.ghost.as_ref())
    }

    /// Redraw every mounted page's overlay.
    pub fn render_highlight_layers(&mut self) {
        if !self.initialized {
            return;
        }

        let groups = self.page_groups();
        let scrolled_to = self.navigator.scrolled_to().cloned();

        for page in 1..=self.renderer.page_count() {
            let Some(handle) = self.overlays.resolve(&mut self.renderer, page) else {
                continue;
            };
            let Some(viewport) = self.renderer.page_viewport(page) else {
                log::trace!("no viewport for page {page}");
                continue;
            };

            let group = groups.get(&page).map(Vec::as_slice).unwrap_or_default();
            let transform = &mut self.transform;
            let shapes = page_shapes(
                group,
                page,
                &viewport,
                scrolled_to.as_ref(),
                |highlight, helpers| transform(highlight, helpers),
            );
            self.renderer.draw_overlay(handle, shapes);
        }
    }

    /// Native selection changed.
    pub fn on_selection_change(&mut self, selection: NativeTextSelection) {
        if selection.is_collapsed {
            self.native_selection = None;
            self.apply(TipEvent::SelectionCollapsed(true));
            return;
        }

        if !selection.inside_container {
            return;
        }

        self.apply(TipEvent::SelectionCollapsed(false));
        self.native_selection = Some(selection);
    }

    /// Pointer released: process an uncollapsed selection on the next tick.
    pub fn on_pointer_up(&mut self) {
        if !self.interaction.is_selection_collapsed && self.native_selection.is_some() {
            self.timers.schedule(TimerKind::DeferredSelection, self.config.selection_defer());
        }
    }

    pub fn on_pointer_down(&mut self, target: PointerTarget) {
        if target == PointerTarget::Elsewhere {
            self.hide_tip_and_selection();
        }
    }

    pub fn on_key_down(&mut self, key: &str) {
        if key == "Escape" {
            self.hide_tip_and_selection();
        }
    }

    fn after_selection(&mut self) {
        if self.interaction.is_selection_collapsed {
            return;
        }
        let Some(selection) = self.native_selection.as_ref() else {
            return;
        };

        if let Some(captured) = capture_text(&self.renderer, selection) {
            self.finish_selection(captured);
        }
    }

    fn finish_selection(&mut self, captured: CapturedSelection) {
        let Some(hook) = self.hooks.on_selection_finished.as_mut() else {
            self.emit_create(NewHighlight {
                position: captured.position,
                content: captured.content,
                comment: None,
            });
            self.hide_tip_and_selection();
            return;
        };

        let popup = hook(&captured.position, &captured.content);
        let anchor = captured.viewport_position.clone();
        self.pending_selection = Some(captured);

        if let Some(popup) = popup {
            self.apply(TipEvent::SelectionFinished(Tip::selection(anchor, popup)));
        }
    }

    fn emit_create(&mut self, highlight: NewHighlight) {
        log::debug!("creating highlight on page {}", highlight.position.page_number);
        if let Some(hook) = self.hooks.on_create.as_mut() {
            hook(highlight);
        }
    }

    /// Commit the pending selection with an optional comment and dismiss the
    /// selection tip. Returns the committed payload.
    pub fn commit_and_hide(&mut self, comment: Option<String>) -> Option<NewHighlight> {
        let captured = self.pending_selection.take()?;
        let comment = comment.map(|text| text.trim().to_owned()).filter(|text| !text.is_empty());
        let highlight = NewHighlight {
            position: captured.position,
            content: captured.content,
            comment,
        };

        self.emit_create(highlight.clone());
        self.renderer.clear_native_selection();
        self.apply(TipEvent::SelectionCollapsed(true));
        self.native_selection = None;
        self.hide_tip_and_selection();
        Some(highlight)
    }

    /// Turn the pending selection into a ghost highlight and keep the
    /// selection tip open.
    pub fn commit_and_keep_selecting(&mut self) -> bool {
        let Some(captured) = self.pending_selection.as_ref() else {
            return false;
        };

        let ghost = GhostHighlight {
            position: captured.position.clone(),
            content: Some(captured.content.clone()),
        };
        self.renderer.clear_native_selection();
        self.native_selection = None;
        self.apply(TipEvent::SelectionCollapsed(true));
        self.apply(TipEvent::SetGhost(ghost));
        true
    }

    /// Drop the tip, the ghost and any selection awaiting processing.
    pub fn hide_tip_and_selection(&mut self) {
        self.timers.cancel(TimerKind::DeferredSelection);
        self.pending_selection = None;
        self.apply(TipEvent::Dismiss);
    }

    fn viewport_highlight(&self, id: &HighlightId) -> Option<ViewportHighlight> {
        let highlight = self.highlights.iter().find(|highlight| &highlight.id == id)?;
        let viewport = self.renderer.page_viewport(highlight.position.page_number)?;

        Some(ViewportHighlight {
            id: Some(highlight.id.clone()),
            position: scaled_position_to_viewport(&highlight.position, &viewport),
            content: highlight.content.clone(),
            comment: highlight.comment.clone(),
        })
    }

    pub fn on_highlight_enter(&mut self, id: &HighlightId) {
        let Some(highlight) = self.viewport_highlight(id) else {
            log::trace!("hover on unknown highlight {id}");
            return;
        };

        if self.config.debug {
            log::debug!("hover enter {id} on page {}", highlight.position.page_number);
        }
        if let Some(hook) = self.hooks.on_highlight_hover.as_mut() {
            hook(&highlight);
        }

        let popup = match self.hooks.render_popup.as_mut() {
            Some(render) => render(&highlight).map(PopupContent::Custom),
            None => highlight.comment.clone().map(PopupContent::Comment),
        };

        if let Some(popup) = popup {
            self.apply(TipEvent::HighlightEnter(Tip::hover(highlight.position, popup)));
        }
    }

    pub fn on_highlight_leave(&mut self, id: &HighlightId) {
        if let Some(highlight) = self.viewport_highlight(id) {
            if self.config.debug {
                log::debug!("hover leave {id} on page {}", highlight.position.page_number);
            }
            if let Some(hook) = self.hooks.on_highlight_blur.as_mut() {
                hook(&highlight);
            }
        }

        self.apply(TipEvent::HighlightLeave);
    }

    /// Context menu inside the container. The native menu is always
    /// suppressed; returns `true` when the event was forwarded for a highlight.
    pub fn on_context_menu(&mut self, id: Option<&HighlightId>) -> bool {
        let Some(highlight) = id.and_then(|id| self.viewport_highlight(id)) else {
            return false;
        };

        match self.hooks.on_highlight_context_menu.as_mut() {
            Some(hook) => {
                hook(&highlight);
                true
            }
            None => false,
        }
    }

    pub fn on_tip_enter(&mut self) {
        self.apply(TipEvent::TipEnter);
    }

    pub fn on_tip_leave(&mut self) {
        self.apply(TipEvent::TipLeave);
    }

    /// Placement of the current tip once the host has measured it.
    pub fn tip_placement(&self, tip_size: (f64, f64)) -> Option<TipPlacement> {
        let tip = self.interaction.tip.as_ref()?;
        let page_box = self.renderer.page_box(tip.page_number())?;
        let scroll_top = self.renderer.scroll_metrics().scroll_top;

        Some(crate::tip::tip_placement(
            &tip.position.bounding_rect,
            &page_box,
            tip_size,
            scroll_top,
        ))
    }

    /// Start an area drag at `point` (container content coordinates).
    /// Returns `false` when area selection is disabled.
    pub fn on_area_drag_start(&mut self, page: u32, point: (f64, f64)) -> bool {
        if !self.area_selection_enabled {
            return false;
        }

        self.renderer.set_text_selection_enabled(false);
        self.drag = Some(AreaDrag::begin(page, point));
        true
    }

    pub fn on_area_drag_move(&mut self, point: (f64, f64)) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };

        let was_visible = drag.is_visible();
        drag.update(point);
        if !was_visible {
            self.apply(TipEvent::AreaSelectionInProgress(true));
        }
    }

    pub fn on_area_drag_end(&mut self, point: (f64, f64)) {
        let Some(mut drag) = self.drag.take() else {
            return;
        };

        drag.update(point);
        self.renderer.set_text_selection_enabled(true);
        self.apply(TipEvent::AreaSelectionInProgress(false));

        let Some((page, rect)) = drag.finish() else {
            return;
        };
        let Some(mut captured) = capture_area(&self.renderer, page, &rect) else {
            return;
        };
        let bounds = captured.viewport_position.bounding_rect;
        let Some(image) = self.renderer.capture(page, &bounds) else {
            log::warn!("could not capture area on page {page}");
            return;
        };

        captured.content = Content::image(image);
        self.finish_selection(captured);
    }

    pub fn on_area_drag_cancel(&mut self) {
        if self.drag.take().is_some() {
            self.renderer.set_text_selection_enabled(true);
            self.apply(TipEvent::AreaSelectionInProgress(false));
        }
    }

    /// An area highlight was resized to `bounding_rect` (page-relative viewport
    /// pixels). Emits `on_update` and returns the patch.
    ///
    /// # Errors
    /// Returns [`HighlighterError::UnknownHighlight`] for an unknown id.
    pub fn resize_area_highlight(
        &mut self,
        id: &HighlightId,
        bounding_rect: Rect,
    ) -> Result<Option<HighlightPatch>> {
        let page = self
            .highlights
            .iter()
            .find(|highlight| &highlight.id == id)
            .map(|highlight| highlight.position.page_number)
            .ok_or_else(|| HighlighterError::UnknownHighlight(id.clone()))?;

        let Some(highlight) = self.viewport_highlight(id) else {
            return Ok(None);
        };
        let Some(viewport) = self.renderer.page_viewport(page) else {
            return Ok(None);
        };

        let image = self.renderer.capture(page, &bounding_rect);
        let patch = area_resize_patch(&highlight, &bounding_rect, &viewport, image);
        if let Some(hook) = self.hooks.on_update.as_mut() {
            hook(id, patch.clone());
        }
        Ok(Some(patch))
    }

    /// Ctrl/Cmd wheel zoom. Returns the new scale when the event zoomed.
    pub fn on_wheel(&mut self, input: &WheelInput) -> Option<ScaleValue> {
        let scale = self.zoom.wheel(input)?;
        self.apply_scale();
        Some(scale)
    }

    pub fn zoom_in(&mut self) -> ScaleValue {
        let scale = self.zoom.zoom_in();
        self.apply_scale();
        scale
    }

    pub fn zoom_out(&mut self) -> ScaleValue {
        let scale = self.zoom.zoom_out();
        self.apply_scale();
        scale
    }

    pub fn fit_width(&mut self) -> ScaleValue {
        let scale = self.zoom.fit_width();
        self.apply_scale();
        scale
    }

    pub fn set_scale(&mut self, scale: ScaleValue) -> ScaleValue {
        let scale = self.zoom.set(scale);
        self.apply_scale();
        scale
    }

    fn apply_scale(&mut self) {
        self.renderer.set_scale_value(self.zoom.scale());
        self.render_highlight_layers();
    }

    /// Container or window resized; the scale is re-applied after the
    /// debounce window.
    pub fn on_resize(&mut self) {
        self.timers.schedule(TimerKind::ResizeDebounce, self.config.resize_debounce());
    }

    pub fn on_scroll(&mut self) {
        if !self.navigator.on_scroll() {
            return;
        }

        self.timers.cancel(TimerKind::FlashClear);
        if let Some(hook) = self.hooks.on_scroll_change.as_mut() {
            hook();
        }
        self.render_highlight_layers();
    }

    /// Scroll `highlight` into view and flash it. Ignored until [`init`](Self::init).
    pub fn scroll_to(&mut self, highlight: &Highlight) {
        if !self.initialized {
            log::debug!("ignoring scroll to {} before init", highlight.id);
            return;
        }

        let page = highlight.position.page_number;
        let Some(viewport) = self.renderer.page_viewport(page) else {
            log::warn!("cannot scroll to highlight {}: page {page} has no viewport", highlight.id);
            return;
        };

        let page_box = self.renderer.page_box(page);
        let metrics = self.renderer.scroll_metrics();
        match scroll_action(&highlight.position, &viewport, page_box.as_ref(), &metrics) {
            ScrollAction::SetScrollTop(top) => self.renderer.set_scroll_top(top),
            ScrollAction::ScrollPageIntoView { page, destination } => {
                self.renderer.scroll_page_into_view(page, destination)
            }
        }

        self.navigator.begin(highlight.id.clone());
        self.timers.schedule(TimerKind::ScrollReattach, self.config.scroll_reattach_delay());
        self.timers.schedule(TimerKind::FlashClear, self.config.flash_duration());
        self.render_highlight_layers();
    }

    /// Look up a committed highlight by id and scroll to it.
    pub fn scroll_to_id(&mut self, id: &HighlightId) -> Result<()> {
        let highlight = self
            .highlights
            .iter()
            .find(|highlight| &highlight.id == id)
            .cloned()
            .ok_or_else(|| HighlighterError::UnknownHighlight(id.clone()))?;

        self.scroll_to(&highlight);
        Ok(())
    }

    /// Move the clock to `now`: fire every timer that came due, in deadline
    /// order, then carry out queued scroll requests at `now`.
    pub fn advance_to(&mut self, now: Duration) {
        if !self.initialized {
            self.drop_scroll_requests();
            self.timers.settle(now);
            return;
        }

        while let Some(kind) = self.timers.pop_due(now) {
            log::trace!("{kind:?} timer fired at {:?}", self.timers.now());
            self.on_timer(kind);
        }
        self.timers.settle(now);

        for highlight in self.scroll_handle.take() {
            self.scroll_to(&highlight);
        }
    }

    fn drop_scroll_requests(&mut self) {
        let dropped = self.scroll_handle.take().len();
        if dropped > 0 {
            log::debug!("dropping {dropped} queued scroll requests");
        }
    }

    /// Advance the clock by `delta`.
    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.timers.now() + delta);
    }

    fn on_timer(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::HoverShow => self.apply(TipEvent::ShowTimerElapsed),
            TimerKind::HoverHide => self.apply(TipEvent::HideTimerElapsed),
            TimerKind::ScrollReattach => self.navigator.reattach(),
            TimerKind::FlashClear => {
                if self.navigator.clear_flash() {
                    self.render_highlight_layers();
                }
            }
            TimerKind::ResizeDebounce => self.apply_scale(),
            TimerKind::DeferredSelection => self.after_selection(),
        }
    }

    fn apply(&mut self, event: TipEvent<P>) {
        for effect in apply_tip_event(&mut self.interaction, event) {
            match effect {
                TipEffect::ScheduleShow => {
                    self.timers.schedule(TimerKind::HoverShow, self.config.hover_show_delay());
                }
                TipEffect::CancelShow => {
                    self.timers.cancel(TimerKind::HoverShow);
                }
                TipEffect::ScheduleHide => {
                    self.timers.schedule(TimerKind::HoverHide, self.config.hover_hide_delay());
                }
                TipEffect::CancelHide => {
                    self.timers.cancel(TimerKind::HoverHide);
                }
                TipEffect::Rerender => self.render_highlight_layers(),
            }
        }
    }

    /// Tear down: cancel every timer and forget all overlays. Returns the
    /// number of timers that were still pending.
    pub fn shutdown(&mut self) -> usize {
        let cancelled = self.timers.cancel_all();
        self.drop_scroll_requests();
        self.overlays.clear();
        self.drag = None;
        self.native_selection = None;
        self.pending_selection = None;
        self.navigator.reset();
        self.interaction = InteractionState::default();
        self.initialized = false;
        log::debug!("highlighter shut down, {cancelled} timers cancelled");
        cancelled
    }
}
