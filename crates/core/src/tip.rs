//! Hover and selection tip state.
//!
//! The interaction state is a single value updated by [`apply_tip_event`]. The
//! reducer never touches timers itself; it returns the timer and render
//! effects the controller has to carry out.

use crate::renderer::PageBox;
use doc_model::{GhostHighlight, Position, Rect};

/// Vertical gap between a highlight and its tip.
const TIP_GAP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipMode {
    Hover,
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipPhase {
    Idle,
    HoverPending,
    HoverShown,
    SelectionShown,
}

/// What a tip displays: the highlight's comment, or caller-rendered content.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent<P> {
    Comment(String),
    Custom(P),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tip<P> {
    /// Viewport position of the highlight the tip is anchored to.
    pub position: Position,
    pub content: PopupContent<P>,
    pub mode: TipMode,
}

impl<P> Tip<P> {
    pub fn hover(position: Position, content: PopupContent<P>) -> Self {
        Self {
            position,
            content,
            mode: TipMode::Hover,
        }
    }

    pub fn selection(position: Position, content: P) -> Self {
        Self {
            position,
            content: PopupContent::Custom(content),
            mode: TipMode::Selection,
        }
    }

    /// Page the tip is drawn on: the bounding rect's page, else the position's.
    pub fn page_number(&self) -> u32 {
        self.position.bounding_rect.page_number.unwrap_or(self.position.page_number)
    }
}

/// Transient interaction state shared by the tip machinery.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState<P> {
    pub tip: Option<Tip<P>>,
    /// Hover tip waiting for the show timer.
    pub pending_hover: Option<Tip<P>>,
    pub ghost: Option<GhostHighlight>,
    pub is_selection_collapsed: bool,
    pub is_area_selection_in_progress: bool,
    pub is_tip_hovered: bool,
    pub is_highlight_hovered: bool,
}

impl<P> Default for InteractionState<P> {
    fn default() -> Self {
        Self {
            tip: None,
            pending_hover: None,
            ghost: None,
            is_selection_collapsed: true,
            is_area_selection_in_progress: false,
            is_tip_hovered: false,
            is_highlight_hovered: false,
        }
    }
}

impl<P> InteractionState<P> {
    pub fn phase(&self) -> TipPhase {
        match (&self.tip, &self.pending_hover) {
            (Some(tip), _) if tip.mode == TipMode::Selection => TipPhase::SelectionShown,
            (Some(_), _) => TipPhase::HoverShown,
            (None, Some(_)) => TipPhase::HoverPending,
            (None, None) => TipPhase::Idle,
        }
    }

    pub fn tip_mode(&self) -> Option<TipMode> {
        self.tip.as_ref().map(|tip| tip.mode)
    }

    /// A highlight is being created: an uncollapsed selection or a ghost.
    pub fn highlight_in_progress(&self) -> bool {
        !self.is_selection_collapsed || self.ghost.is_some()
    }

    /// Hover tips are suppressed while a highlight is in progress, an area
    /// drag is active, or a selection tip is up.
    pub fn hover_suppressed(&self) -> bool {
        self.highlight_in_progress()
            || self.is_area_selection_in_progress
            || self.tip_mode() == Some(TipMode::Selection)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TipEvent<P> {
    /// Pointer entered a highlight that has popup content.
    HighlightEnter(Tip<P>),
    HighlightLeave,
    TipEnter,
    TipLeave,
    ShowTimerElapsed,
    HideTimerElapsed,
    /// A text or area selection finished and produced popup content.
    SelectionFinished(Tip<P>),
    SelectionCollapsed(bool),
    AreaSelectionInProgress(bool),
    SetGhost(GhostHighlight),
    /// Escape, outside click or an explicit hide.
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipEffect {
    ScheduleShow,
    CancelShow,
    ScheduleHide,
    CancelHide,
    /// Ghost changed; the highlight layers must be re-partitioned and redrawn.
    Rerender,
}

pub fn apply_tip_event<P>(state: &mut InteractionState<P>, event: TipEvent<P>) -> Vec<TipEffect> {
    match event {
        TipEvent::HighlightEnter(candidate) => {
            state.is_highlight_hovered = true;
            if state.hover_suppressed() {
                log::trace!("hover tip suppressed");
                return vec![TipEffect::CancelHide];
            }

            state.pending_hover = Some(candidate);
            vec![TipEffect::CancelHide, TipEffect::ScheduleShow]
        }
        TipEvent::HighlightLeave => {
            state.is_highlight_hovered = false;

            let mut effects = Vec::new();
            if state.pending_hover.take().is_some() {
                effects.push(TipEffect::CancelShow);
            }
            if state.tip_mode() == Some(TipMode::Hover) {
                effects.push(TipEffect::ScheduleHide);
            }
            effects
        }
        TipEvent::TipEnter => {
            state.is_tip_hovered = true;
            vec![TipEffect::CancelHide]
        }
        TipEvent::TipLeave => {
            state.is_tip_hovered = false;
            if state.tip_mode() == Some(TipMode::Hover) {
                vec![TipEffect::ScheduleHide]
            } else {
                Vec::new()
            }
        }
        TipEvent::ShowTimerElapsed => {
            let Some(candidate) = state.pending_hover.take() else {
                return Vec::new();
            };

            let still_hovered = state.is_highlight_hovered || state.is_tip_hovered;
            if still_hovered && !state.hover_suppressed() {
                state.tip = Some(candidate);
            }
            Vec::new()
        }
        TipEvent::HideTimerElapsed => {
            let idle = !state.is_highlight_hovered && !state.is_tip_hovered;
            if idle && state.tip_mode() == Some(TipMode::Hover) {
                state.tip = None;
            }
            Vec::new()
        }
        TipEvent::SelectionFinished(tip) => {
            state.pending_hover = None;
            state.tip = Some(tip);
            vec![TipEffect::CancelShow, TipEffect::CancelHide]
        }
        TipEvent::SelectionCollapsed(collapsed) => {
            state.is_selection_collapsed = collapsed;
            Vec::new()
        }
        TipEvent::AreaSelectionInProgress(in_progress) => {
            state.is_area_selection_in_progress = in_progress;
            Vec::new()
        }
        TipEvent::SetGhost(ghost) => {
            state.ghost = Some(ghost);
            vec![TipEffect::Rerender]
        }
        TipEvent::Dismiss => {
            state.tip = None;
            state.pending_hover = None;
            state.ghost = None;
            state.is_tip_hovered = false;
            state.is_highlight_hovered = false;
            vec![TipEffect::CancelShow, TipEffect::CancelHide, TipEffect::Rerender]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipSide {
    Above,
    Below,
}

/// Where a tip of a given size is drawn, in container content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipPlacement {
    pub left: f64,
    pub top: f64,
    pub side: TipSide,
    /// `false` until the tip has been measured.
    pub visible: bool,
}

/// Place a tip of `tip_size` (width, height) next to `anchor`.
///
/// `anchor` is the highlight's bounding rect relative to its page. The tip goes
/// above the highlight unless that would cross `scroll_top`, then below. It is
/// centred on the highlight and kept within the page horizontally.
pub fn tip_placement(
    anchor: &Rect,
    page: &PageBox,
    tip_size: (f64, f64),
    scroll_top: f64,
) -> TipPlacement {
    let (width, height) = tip_size;

    let highlight_left = page.offset_left + anchor.left;
    let highlight_top = page.offset_top + anchor.top;
    let highlight_bottom = highlight_top + anchor.height;

    let below = highlight_top - height - TIP_GAP < scroll_top;
    let top = if below {
        highlight_bottom + TIP_GAP
    } else {
        highlight_top - height - TIP_GAP
    };

    let ideal_left = highlight_left + anchor.width / 2.0 - width / 2.0;
    let page_right = page.offset_left + page.width;
    let left = ideal_left.min((page_right - width).max(page.offset_left)).max(page.offset_left);

    TipPlacement {
        left,
        top,
        side: if below { TipSide::Below } else { TipSide::Above },
        visible: !(width == 0.0 && height == 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::ScaledPosition;

    type State = InteractionState<&'static str>;

    fn anchor() -> Position {
        Position {
            bounding_rect: Rect::new(100.0, 300.0, 200.0, 20.0).on_page(1),
            rects: vec![Rect::new(100.0, 300.0, 200.0, 20.0).on_page(1)],
            page_number: 1,
        }
    }

    fn hover_tip() -> Tip<&'static str> {
        Tip::hover(anchor(), PopupContent::Comment("note".to_owned()))
    }

    #[test]
    fn enter_then_timer_shows_hover_tip() {
        let mut state = State::default();

        let effects = apply_tip_event(&mut state, TipEvent::HighlightEnter(hover_tip()));
        assert_eq!(effects, vec![TipEffect::CancelHide, TipEffect::ScheduleShow]);
        assert_eq!(state.phase(), TipPhase::HoverPending);

        apply_tip_event(&mut state, TipEvent::ShowTimerElapsed);
        assert_eq!(state.phase(), TipPhase::HoverShown);
    }

    #[test]
    fn leaving_before_timer_returns_to_idle() {
        let mut state = State::default();
        apply_tip_event(&mut state, TipEvent::HighlightEnter(hover_tip()));

        let effects = apply_tip_event(&mut state, TipEvent::HighlightLeave);
        assert_eq!(effects, vec![TipEffect::CancelShow]);
        assert_eq!(state.phase(), TipPhase::Idle);

        apply_tip_event(&mut state, TipEvent::ShowTimerElapsed);
        assert_eq!(state.phase(), TipPhase::Idle);
    }

    #[test]
    fn moving_onto_tip_keeps_it_open() {
        let mut state = State::default();
        apply_tip_event(&mut state, TipEvent::HighlightEnter(hover_tip()));
        apply_tip_event(&mut state, TipEvent::ShowTimerElapsed);

        let effects = apply_tip_event(&mut state, TipEvent::HighlightLeave);
        assert_eq!(effects, vec![TipEffect::ScheduleHide]);
        let effects = apply_tip_event(&mut state, TipEvent::TipEnter);
        assert_eq!(effects, vec![TipEffect::CancelHide]);
        apply_tip_event(&mut state, TipEvent::HideTimerElapsed);
        assert_eq!(state.phase(), TipPhase::HoverShown);

        apply_tip_event(&mut state, TipEvent::TipLeave);
        apply_tip_event(&mut state, TipEvent::HideTimerElapsed);
        assert_eq!(state.phase(), TipPhase::Idle);
    }

    #[test]
    fn ghost_suppresses_hover() {
        let mut state = State::default();
        let ghost = GhostHighlight {
            position: ScaledPosition::default(),
            content: None,
        };
        let effects = apply_tip_event(&mut state, TipEvent::SetGhost(ghost));
        assert_eq!(effects, vec![TipEffect::Rerender]);

        let effects = apply_tip_event(&mut state, TipEvent::HighlightEnter(hover_tip()));
        assert_eq!(effects, vec![TipEffect::CancelHide]);
        assert_eq!(state.phase(), TipPhase::Idle);
    }

    #[test]
    fn suppression_is_rechecked_when_show_timer_fires() {
        let mut state = State::default();
        apply_tip_event(&mut state, TipEvent::HighlightEnter(hover_tip()));
        apply_tip_event(&mut state, TipEvent::SelectionCollapsed(false));

        apply_tip_event(&mut state, TipEvent::ShowTimerElapsed);
        assert_eq!(state.phase(), TipPhase::Idle);
    }

    #[test]
    fn selection_tip_ignores_hover_timers() {
        let mut state = State::default();
        let finished = TipEvent::SelectionFinished(Tip::selection(anchor(), "actions"));
        apply_tip_event(&mut state, finished);
        assert_eq!(state.phase(), TipPhase::SelectionShown);

        let effects = apply_tip_event(&mut state, TipEvent::HighlightEnter(hover_tip()));
        assert_eq!(effects, vec![TipEffect::CancelHide]);
        assert!(apply_tip_event(&mut state, TipEvent::HighlightLeave).is_empty());
        apply_tip_event(&mut state, TipEvent::HideTimerElapsed);
        assert_eq!(state.phase(), TipPhase::SelectionShown);

        apply_tip_event(&mut state, TipEvent::Dismiss);
        assert_eq!(state.phase(), TipPhase::Idle);
    }

    #[test]
    fn dismiss_clears_ghost_and_flags() {
        let mut state = State::default();
        apply_tip_event(
            &mut state,
            TipEvent::SetGhost(GhostHighlight {
                position: ScaledPosition::default(),
                content: None,
            }),
        );
        apply_tip_event(&mut state, TipEvent::TipEnter);

        let effects = apply_tip_event(&mut state, TipEvent::Dismiss);
        assert_eq!(
            effects,
            vec![TipEffect::CancelShow, TipEffect::CancelHide, TipEffect::Rerender]
        );
        assert!(state.ghost.is_none());
        assert!(!state.is_tip_hovered);
    }

    fn page() -> PageBox {
        PageBox {
            offset_left: 20.0,
            offset_top: 1000.0,
            width: 800.0,
            height: 1000.0,
            ..PageBox::default()
        }
    }

    fn place(anchor: Rect, tip_size: (f64, f64), scroll_top: f64) -> TipPlacement {
        tip_placement(&anchor, &page(), tip_size, scroll_top)
    }

    #[test]
    fn tip_goes_above_when_there_is_room() {
        let placement = place(Rect::new(100.0, 300.0, 200.0, 20.0), (100.0, 40.0), 0.0);
        assert_eq!(placement.side, TipSide::Above);
        assert_eq!(placement.top, 1000.0 + 300.0 - 40.0 - 5.0);
        assert_eq!(placement.left, 20.0 + 100.0 + 100.0 - 50.0);
        assert!(placement.visible);
    }

    #[test]
    fn tip_flips_below_near_scroll_top() {
        let placement = place(Rect::new(100.0, 10.0, 200.0, 20.0), (100.0, 40.0), 1000.0);
        assert_eq!(placement.side, TipSide::Below);
        assert_eq!(placement.top, 1000.0 + 10.0 + 20.0 + 5.0);
    }

    #[test]
    fn tip_is_clamped_to_page_edges() {
        let left_edge = place(Rect::new(0.0, 300.0, 10.0, 20.0), (300.0, 40.0), 0.0);
        assert_eq!(left_edge.left, 20.0);

        let right_edge = place(Rect::new(790.0, 300.0, 10.0, 20.0), (300.0, 40.0), 0.0);
        assert_eq!(right_edge.left, 20.0 + 800.0 - 300.0);

        let unmeasured = place(Rect::new(10.0, 300.0, 10.0, 20.0), (0.0, 0.0), 0.0);
        assert!(!unmeasured.visible);
    }
}
