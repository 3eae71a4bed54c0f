#![forbid(unsafe_code)]

//! Gesture recognition: classifies pointer transitions into clicks and drags.
//!
//! [`GestureStateMachine`] keeps one [`ButtonState`] per [`MouseButton`] and
//! turns `down → move → up` sequences into semantic events. It never
//! dispatches anything itself: [`process`](GestureStateMachine::process)
//! returns the synthesized follow-up events in the order they must be
//! dispatched.
//!
//! # State Machine
//!
//! ```text
//!            down                move > threshold
//!   Idle ──────────▶ Down ───────────────────────▶ Dragging
//!    ▲                │  move <= threshold           │  move → DragMove
//!    │                │  (suppressed)                │
//!    │        up      ▼                      up      ▼
//!    └──── MouseUp [+ Click] ◀──── DragMove, DragEnd, MouseUp [+ Click]
//! ```
//!
//! # Invariants
//!
//! 1. `is_dragging ⇒ is_down` for every state produced by pointer input.
//! 2. A drag sequence is `DragStart`, one or more `DragMove`, then `DragEnd`.
//! 3. Click fires only when the up location is within `click_distance` of
//!    the down location.
//! 4. Two clicks on the same button inside `double_click_window` become one
//!    `Click` followed by one `DblClick`; the click timer then resets.
//! 5. A move that resolves to no button ends every button's down/drag state
//!    and emits at most one `DragEnd`.
//!
//! # Chorded buttons
//!
//! [`resolve_buttons`] maps a (button code, held mask) pair to the button
//! identities it implies. The table is reproduced as observed from browsers
//! during rapid multi-button presses. Codes outside `{0, 1, 2}` resolve to
//! no identity at all; callers should drop the notification and log it.

use web_time::{Duration, Instant};

use crate::event::{ButtonMask, MouseButton, PointerEventKind};
use crate::normalizer::NormalizedPointer;
use crate::semantic_event::{EventKind, SemanticEvent};

#[cfg(feature = "tracing")]
use crate::logging::trace;
#[cfg(not(feature = "tracing"))]
use crate::trace;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for gesture classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Maximum Euclidean distance (surface units) between down and up for a
    /// click; moves farther than this start a drag (default: 3.0).
    pub click_distance: f64,
    /// Window for double-click elevation (default: 300ms).
    pub double_click_window: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_distance: 3.0,
            double_click_window: Duration::from_millis(300),
        }
    }
}

// ---------------------------------------------------------------------------
// Chord resolution
// ---------------------------------------------------------------------------

/// Button identities implied by a (code, mask) pair.
///
/// Each entry becomes one semantic event; `None` means "no button held" and
/// only occurs for moves.
pub fn resolve_buttons(
    kind: PointerEventKind,
    code: Option<i16>,
    mask: Option<ButtonMask>,
) -> Vec<Option<MouseButton>> {
    use MouseButton::{Left, Middle, Right};

    let code = code.unwrap_or(0);
    if MouseButton::from_code(code).is_none() {
        return Vec::new();
    }
    let Some(mask) = mask else {
        return vec![MouseButton::from_code(code)];
    };

    match (code, mask.bits()) {
        (1, 0) | (1, 4) => vec![Some(Middle)],
        (2, 0) | (2, 2) | (2, 1) => vec![Some(Right)],
        (0, 4) => vec![Some(Left), Some(Middle)],
        (0, 2) => vec![Some(Left), Some(Right)],
        (1, 2) => vec![Some(Middle), Some(Right)],
        (0, 6) => vec![Some(Left), Some(Middle), Some(Right)],
        (0, 0) if kind == PointerEventKind::Move => vec![None],
        _ => vec![Some(Left)],
    }
}

// ---------------------------------------------------------------------------
// Per-button state
// ---------------------------------------------------------------------------

/// Down/drag state for one button.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonState {
    pub is_down: bool,
    pub is_dragging: bool,
    /// The `MouseDown` event that started the current interaction.
    pub down_context: Option<SemanticEvent>,
}

impl ButtonState {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// GestureStateMachine
// ---------------------------------------------------------------------------

/// Stateful pointer gesture classifier.
pub struct GestureStateMachine {
    config: GestureConfig,
    buttons: [ButtonState; 3],
    last_click: Option<(Option<MouseButton>, Instant)>,
}

impl std::fmt::Debug for GestureStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureStateMachine")
            .field("dragging", &self.is_dragging())
            .field("click_pending", &self.last_click.is_some())
            .finish()
    }
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureStateMachine {
    /// Create a state machine with every button idle.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            buttons: Default::default(),
            last_click: None,
        }
    }

    /// Whether this machine handles events of `kind`.
    #[must_use]
    pub const fn supports(kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::MouseDown
                | EventKind::MouseUp
                | EventKind::MouseMove
                | EventKind::Click
                | EventKind::DblClick
                | EventKind::DragStart
                | EventKind::DragMove
                | EventKind::DragEnd
                | EventKind::Wheel
                | EventKind::MouseOver
                | EventKind::MouseOut
        )
    }

    /// Split a normalized pointer notification into one semantic event per
    /// implied button identity.
    ///
    /// Returns an empty vector when the chord cannot be classified.
    #[must_use]
    pub fn classify(&self, pointer: &NormalizedPointer) -> Vec<SemanticEvent> {
        let kind = pointer.event_kind();
        let identities = match pointer.kind {
            PointerEventKind::Down | PointerEventKind::Up | PointerEventKind::Move => {
                resolve_buttons(pointer.kind, pointer.code, pointer.mask)
            }
            PointerEventKind::Wheel | PointerEventKind::Over | PointerEventKind::Out => {
                vec![pointer.args.button]
            }
        };
        identities
            .into_iter()
            .map(|button| {
                let mut args = pointer.args.clone();
                args.button = button;
                SemanticEvent::mouse(kind, args)
            })
            .collect()
    }

    /// Feed one pointer event and return the events to dispatch, in order.
    pub fn process(&mut self, event: &SemanticEvent, now: Instant) -> Vec<SemanticEvent> {
        let mut out = Vec::new();
        let Some(args) = event.mouse_args() else {
            return out;
        };
        let button = args.button;

        match event.kind {
            EventKind::MouseDown => self.on_mouse_down(event, button, &mut out),
            EventKind::MouseUp => self.on_mouse_up(event, button, now, &mut out),
            EventKind::MouseMove => self.on_mouse_move(event, button, &mut out),
            EventKind::Click => self.on_click(event, button, now, &mut out),
            EventKind::DragStart => self.on_drag_start(event, button, &mut out),
            EventKind::DragMove => self.on_drag_move(event, button, &mut out),
            EventKind::DragEnd => self.on_drag_end(event, button, now, &mut out),
            EventKind::DblClick | EventKind::Wheel | EventKind::MouseOver | EventKind::MouseOut => {
                out.push(event.retarget(event.kind));
            }
            _ => {}
        }
        out
    }

    /// State of one button.
    #[must_use]
    pub fn button_state(&self, button: MouseButton) -> &ButtonState {
        &self.buttons[button.index()]
    }

    /// Whether `button` is currently down.
    #[must_use]
    pub fn is_down(&self, button: MouseButton) -> bool {
        self.button_state(button).is_down
    }

    /// Whether any button is dragging.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.buttons.iter().any(|s| s.is_dragging)
    }

    /// Return every button to idle and forget the last click.
    pub fn reset(&mut self) {
        for state in &mut self.buttons {
            state.clear();
        }
        self.last_click = None;
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Replace the configuration. Button state is kept.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }
}

// ---------------------------------------------------------------------------
// Transition handlers
// ---------------------------------------------------------------------------

impl GestureStateMachine {
    fn state_mut(&mut self, button: Option<MouseButton>) -> Option<&mut ButtonState> {
        button.map(|b| &mut self.buttons[b.index()])
    }

    fn on_mouse_down(
        &mut self,
        event: &SemanticEvent,
        button: Option<MouseButton>,
        out: &mut Vec<SemanticEvent>,
    ) {
        let Some(state) = self.state_mut(button) else {
            return;
        };
        *state = ButtonState {
            is_down: true,
            is_dragging: false,
            down_context: Some(event.retarget(EventKind::MouseDown)),
        };
        out.push(event.retarget(EventKind::MouseDown));
    }

    fn on_mouse_move(
        &mut self,
        event: &SemanticEvent,
        button: Option<MouseButton>,
        out: &mut Vec<SemanticEvent>,
    ) {
        let button = match button {
            Some(button) => button,
            None => {
                let any_dragging = self.is_dragging();
                for state in &mut self.buttons {
                    state.clear();
                }
                if any_dragging {
                    trace!(target: "trellis.gesture", "buttons released mid-drag");
                    out.push(event.retarget(EventKind::DragEnd));
                }
                MouseButton::Left
            }
        };

        let click_distance = self.config.click_distance;
        let state = &mut self.buttons[button.index()];
        if state.is_dragging {
            out.push(event.retarget(EventKind::DragMove));
            return;
        }

        if state.is_down
            && let Some(down) = &state.down_context
        {
            let moved = down_position(down).distance(event_position(event));
            if moved <= click_distance {
                return;
            }
            state.is_dragging = true;
            trace!(target: "trellis.gesture", ?button, moved, "drag started");
            out.push(down.retarget(EventKind::DragStart));
            out.push(down.retarget(EventKind::DragMove));
            return;
        }

        out.push(event.retarget(EventKind::MouseMove));
    }

    fn on_mouse_up(
        &mut self,
        event: &SemanticEvent,
        button: Option<MouseButton>,
        now: Instant,
        out: &mut Vec<SemanticEvent>,
    ) {
        let Some(state) = self.state_mut(button) else {
            return;
        };
        if state.is_dragging {
            out.push(event.retarget(EventKind::DragMove));
            self.on_drag_end(event, button, now, out);
            return;
        }

        state.is_down = false;
        out.push(event.retarget(EventKind::MouseUp));
        if self.needs_click(event, button) {
            self.on_click(event, button, now, out);
        }
        if let Some(state) = self.state_mut(button) {
            state.down_context = None;
        }
    }

    fn on_click(
        &mut self,
        event: &SemanticEvent,
        button: Option<MouseButton>,
        now: Instant,
        out: &mut Vec<SemanticEvent>,
    ) {
        match self.last_click {
            Some((previous, at))
                if previous == button
                    && now.saturating_duration_since(at) < self.config.double_click_window =>
            {
                self.last_click = None;
                out.push(event.retarget(EventKind::DblClick));
            }
            _ => {
                self.last_click = Some((button, now));
                out.push(event.retarget(EventKind::Click));
            }
        }
    }

    /// Externally injected drag-start.
    fn on_drag_start(
        &mut self,
        event: &SemanticEvent,
        button: Option<MouseButton>,
        out: &mut Vec<SemanticEvent>,
    ) {
        let Some(state) = self.state_mut(button) else {
            return;
        };
        if !state.is_dragging {
            return;
        }
        if !state.is_down {
            state.is_down = true;
            out.push(event.retarget(EventKind::MouseDown));
            return;
        }
        out.push(event.retarget(EventKind::DragStart));
    }

    /// Externally injected drag-move; synthesizes a missing drag-start.
    fn on_drag_move(
        &mut self,
        event: &SemanticEvent,
        button: Option<MouseButton>,
        out: &mut Vec<SemanticEvent>,
    ) {
        let Some(state) = self.state_mut(button) else {
            return;
        };
        if !state.is_down {
            return;
        }
        if !state.is_dragging {
            state.is_dragging = true;
            let start = state.down_context.as_ref().unwrap_or(event);
            out.push(start.retarget(EventKind::DragStart));
        }
        out.push(event.retarget(EventKind::DragMove));
    }

    /// Ends a drag: `DragEnd`, then `MouseUp` and a trailing click if the
    /// button was still down.
    fn on_drag_end(
        &mut self,
        event: &SemanticEvent,
        button: Option<MouseButton>,
        now: Instant,
        out: &mut Vec<SemanticEvent>,
    ) {
        let Some(state) = self.state_mut(button) else {
            return;
        };
        if !state.is_dragging {
            return;
        }
        state.is_dragging = false;
        out.push(event.retarget(EventKind::DragEnd));

        if !state.is_down {
            return;
        }
        state.is_down = false;
        out.push(event.retarget(EventKind::MouseUp));
        if self.needs_click(event, button) {
            self.on_click(event, button, now, out);
        }
        if let Some(state) = self.state_mut(button) {
            state.down_context = None;
        }
    }

    fn needs_click(&self, event: &SemanticEvent, button: Option<MouseButton>) -> bool {
        let Some(button) = button else {
            return false;
        };
        self.buttons[button.index()]
            .down_context
            .as_ref()
            .is_some_and(|down| {
                down_position(down).distance(event_position(event)) <= self.config.click_distance
            })
    }
}

fn event_position(event: &SemanticEvent) -> crate::semantic_event::Position {
    event.mouse_args().map(|a| a.position()).unwrap_or_default()
}

fn down_position(down: &SemanticEvent) -> crate::semantic_event::Position {
    event_position(down)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{PointerEventKind, RawPointerEvent};
    use crate::normalizer::InputNormalizer;
    use crate::semantic_event::{MouseArgs, Position};

    const MS_50: Duration = Duration::from_millis(50);
    const MS_500: Duration = Duration::from_millis(500);

    fn gsm() -> GestureStateMachine {
        GestureStateMachine::default()
    }

    fn ev(kind: EventKind, x: f64, y: f64, button: MouseButton) -> SemanticEvent {
        SemanticEvent::mouse(kind, MouseArgs::at(button, x, y))
    }

    fn down(x: f64, y: f64) -> SemanticEvent {
        ev(EventKind::MouseDown, x, y, MouseButton::Left)
    }

    fn up(x: f64, y: f64) -> SemanticEvent {
        ev(EventKind::MouseUp, x, y, MouseButton::Left)
    }

    fn mv(x: f64, y: f64) -> SemanticEvent {
        ev(EventKind::MouseMove, x, y, MouseButton::Left)
    }

    fn released_move(x: f64, y: f64) -> SemanticEvent {
        let mut args = MouseArgs::at(MouseButton::Left, x, y);
        args.button = None;
        SemanticEvent::mouse(EventKind::MouseMove, args)
    }

    fn kinds(events: &[SemanticEvent]) -> Vec<EventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    fn location(event: &SemanticEvent) -> Position {
        event.mouse_args().map(|a| a.position()).unwrap_or_default()
    }

    fn click_at(g: &mut GestureStateMachine, x: f64, y: f64, t: Instant) -> Vec<SemanticEvent> {
        let mut out = g.process(&down(x, y), t);
        out.extend(g.process(&up(x, y), t));
        out
    }

    // --- Click tests ---

    #[test]
    fn single_click() {
        let mut g = gsm();
        let t = Instant::now();
        assert_eq!(kinds(&g.process(&down(5.0, 5.0), t)), vec![EventKind::MouseDown]);
        assert!(g.is_down(MouseButton::Left));
        let out = g.process(&up(6.0, 6.0), t + MS_50);
        assert_eq!(kinds(&out), vec![EventKind::MouseUp, EventKind::Click]);
        assert_eq!(g.button_state(MouseButton::Left), &ButtonState::default());
    }

    #[test]
    fn double_click_within_window() {
        let mut g = gsm();
        let t = Instant::now();
        let first = click_at(&mut g, 5.0, 5.0, t);
        assert_eq!(kinds(&first).last(), Some(&EventKind::Click));
        let second = click_at(&mut g, 5.0, 5.0, t + MS_50);
        assert_eq!(
            kinds(&second),
            vec![EventKind::MouseDown, EventKind::MouseUp, EventKind::DblClick]
        );
    }

    #[test]
    fn click_timer_resets_after_double_click() {
        let mut g = gsm();
        let t = Instant::now();
        click_at(&mut g, 0.0, 0.0, t);
        click_at(&mut g, 0.0, 0.0, t + MS_50);
        let third = click_at(&mut g, 0.0, 0.0, t + MS_50 * 2);
        assert_eq!(kinds(&third).last(), Some(&EventKind::Click));
    }

    #[test]
    fn double_click_timeout_stays_single() {
        let mut g = gsm();
        let t = Instant::now();
        click_at(&mut g, 0.0, 0.0, t);
        let late = click_at(&mut g, 0.0, 0.0, t + MS_500);
        assert_eq!(kinds(&late).last(), Some(&EventKind::Click));
    }

    #[test]
    fn different_button_does_not_elevate() {
        let mut g = gsm();
        let t = Instant::now();
        click_at(&mut g, 0.0, 0.0, t);
        g.process(&ev(EventKind::MouseDown, 0.0, 0.0, MouseButton::Right), t + MS_50);
        let out = g.process(&ev(EventKind::MouseUp, 0.0, 0.0, MouseButton::Right), t + MS_50);
        assert_eq!(kinds(&out), vec![EventKind::MouseUp, EventKind::Click]);
    }

    #[test]
    fn up_beyond_click_distance_without_move_has_no_click() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(0.0, 0.0), t);
        let out = g.process(&up(10.0, 0.0), t);
        assert_eq!(kinds(&out), vec![EventKind::MouseUp]);
    }

    #[test]
    fn up_without_down_has_no_click() {
        let mut g = gsm();
        let out = g.process(&up(0.0, 0.0), Instant::now());
        assert_eq!(kinds(&out), vec![EventKind::MouseUp]);
    }

    // --- Drag tests ---

    #[test]
    fn small_move_is_suppressed() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(0.0, 0.0), t);
        assert!(g.process(&mv(2.0, 2.0), t).is_empty());
        assert!(!g.is_dragging());
    }

    #[test]
    fn threshold_exactly_met_does_not_drag() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(0.0, 0.0), t);
        assert!(g.process(&mv(3.0, 0.0), t).is_empty());
        assert!(!g.is_dragging());
    }

    #[test]
    fn drag_starts_beyond_threshold_with_down_location() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(1.0, 1.0), t);
        let out = g.process(&mv(10.0, 1.0), t);
        assert_eq!(kinds(&out), vec![EventKind::DragStart, EventKind::DragMove]);
        assert_eq!(location(&out[0]), Position::new(1.0, 1.0));
        assert_eq!(location(&out[1]), Position::new(1.0, 1.0));
        let state = g.button_state(MouseButton::Left);
        assert!(state.is_down && state.is_dragging);
    }

    #[test]
    fn moves_while_dragging_are_drag_moves() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(0.0, 0.0), t);
        g.process(&mv(10.0, 0.0), t);
        let out = g.process(&mv(11.0, 0.0), t);
        assert_eq!(kinds(&out), vec![EventKind::DragMove]);
        assert_eq!(location(&out[0]), Position::new(11.0, 0.0));
    }

    #[test]
    fn drag_end_on_mouse_up_far_away() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(0.0, 0.0), t);
        g.process(&mv(10.0, 0.0), t);
        let out = g.process(&up(20.0, 0.0), t);
        assert_eq!(
            kinds(&out),
            vec![EventKind::DragMove, EventKind::DragEnd, EventKind::MouseUp]
        );
        assert_eq!(g.button_state(MouseButton::Left), &ButtonState::default());
    }

    #[test]
    fn drag_returning_home_gets_trailing_click() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(0.0, 0.0), t);
        g.process(&mv(10.0, 0.0), t);
        let out = g.process(&up(1.0, 0.0), t);
        assert_eq!(
            kinds(&out),
            vec![
                EventKind::DragMove,
                EventKind::DragEnd,
                EventKind::MouseUp,
                EventKind::Click
            ]
        );
    }

    #[test]
    fn move_with_no_buttons_ends_all_drags() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(0.0, 0.0), t);
        g.process(&mv(10.0, 0.0), t);
        g.process(&ev(EventKind::MouseDown, 0.0, 0.0, MouseButton::Right), t);
        let out = g.process(&released_move(30.0, 0.0), t);
        assert_eq!(kinds(&out), vec![EventKind::DragEnd, EventKind::MouseMove]);
        for button in MouseButton::ALL {
            assert_eq!(g.button_state(button), &ButtonState::default());
        }
    }

    #[test]
    fn move_with_no_buttons_while_idle_is_plain_move() {
        let mut g = gsm();
        let out = g.process(&released_move(3.0, 3.0), Instant::now());
        assert_eq!(kinds(&out), vec![EventKind::MouseMove]);
    }

    #[test]
    fn hover_move_is_passed_on() {
        let mut g = gsm();
        let out = g.process(&mv(3.0, 3.0), Instant::now());
        assert_eq!(kinds(&out), vec![EventKind::MouseMove]);
    }

    // --- Injected gesture events ---

    #[test]
    fn injected_drag_move_synthesizes_drag_start() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(2.0, 2.0), t);
        let out = g.process(&ev(EventKind::DragMove, 4.0, 4.0, MouseButton::Left), t);
        assert_eq!(kinds(&out), vec![EventKind::DragStart, EventKind::DragMove]);
        assert_eq!(location(&out[0]), Position::new(2.0, 2.0));
        assert!(g.is_dragging());
    }

    #[test]
    fn injected_drag_move_on_idle_button_is_dropped() {
        let mut g = gsm();
        let out = g.process(
            &ev(EventKind::DragMove, 4.0, 4.0, MouseButton::Left),
            Instant::now(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn injected_drag_start_requires_dragging() {
        let mut g = gsm();
        let t = Instant::now();
        let start = ev(EventKind::DragStart, 0.0, 0.0, MouseButton::Left);
        assert!(g.process(&start, t).is_empty());

        g.process(&down(0.0, 0.0), t);
        g.process(&mv(10.0, 0.0), t);
        assert_eq!(kinds(&g.process(&start, t)), vec![EventKind::DragStart]);
    }

    #[test]
    fn injected_drag_end_runs_full_tail() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(0.0, 0.0), t);
        g.process(&mv(10.0, 0.0), t);
        let out = g.process(&ev(EventKind::DragEnd, 0.0, 0.0, MouseButton::Left), t);
        assert_eq!(
            kinds(&out),
            vec![EventKind::DragEnd, EventKind::MouseUp, EventKind::Click]
        );
        let again = g.process(&ev(EventKind::DragEnd, 0.0, 0.0, MouseButton::Left), t);
        assert!(again.is_empty());
    }

    #[test]
    fn injected_click_participates_in_double_click() {
        let mut g = gsm();
        let t = Instant::now();
        let click = ev(EventKind::Click, 0.0, 0.0, MouseButton::Left);
        assert_eq!(kinds(&g.process(&click, t)), vec![EventKind::Click]);
        assert_eq!(kinds(&g.process(&click, t + MS_50)), vec![EventKind::DblClick]);
    }

    #[test]
    fn passthrough_kinds() {
        let mut g = gsm();
        let t = Instant::now();
        for kind in [
            EventKind::Wheel,
            EventKind::MouseOver,
            EventKind::MouseOut,
            EventKind::DblClick,
        ] {
            let out = g.process(&ev(kind, 1.0, 1.0, MouseButton::Left), t);
            assert_eq!(kinds(&out), vec![kind]);
        }
    }

    #[test]
    fn non_pointer_events_are_ignored() {
        let mut g = gsm();
        let key = SemanticEvent::key(EventKind::KeyDown, Default::default());
        assert!(g.process(&key, Instant::now()).is_empty());
        assert!(!GestureStateMachine::supports(EventKind::KeyDown));
        assert!(GestureStateMachine::supports(EventKind::DragEnd));
    }

    #[test]
    fn reset_clears_state() {
        let mut g = gsm();
        let t = Instant::now();
        g.process(&down(0.0, 0.0), t);
        g.process(&mv(10.0, 0.0), t);
        g.reset();
        assert!(!g.is_dragging());
        assert!(!g.is_down(MouseButton::Left));
    }

    #[test]
    fn custom_click_distance() {
        let mut g = GestureStateMachine::new(GestureConfig {
            click_distance: 10.0,
            ..GestureConfig::default()
        });
        let t = Instant::now();
        g.process(&down(0.0, 0.0), t);
        assert!(g.process(&mv(6.0, 8.0), t).is_empty());
        let out = g.process(&mv(6.0, 9.0), t);
        assert_eq!(kinds(&out), vec![EventKind::DragStart, EventKind::DragMove]);
    }

    #[test]
    fn debug_format() {
        let dbg = format!("{:?}", gsm());
        assert!(dbg.contains("GestureStateMachine"));
    }

    // --- Chord table ---

    #[test]
    fn chord_table() {
        use MouseButton::{Left, Middle, Right};
        let m = ButtonMask::from_bits_truncate;
        let down = PointerEventKind::Down;
        assert_eq!(resolve_buttons(down, Some(1), Some(m(0))), vec![Some(Middle)]);
        assert_eq!(resolve_buttons(down, Some(1), Some(m(4))), vec![Some(Middle)]);
        assert_eq!(resolve_buttons(down, Some(2), Some(m(1))), vec![Some(Right)]);
        assert_eq!(resolve_buttons(down, Some(0), Some(m(4))), vec![Some(Left), Some(Middle)]);
        assert_eq!(resolve_buttons(down, Some(0), Some(m(2))), vec![Some(Left), Some(Right)]);
        assert_eq!(resolve_buttons(down, Some(1), Some(m(2))), vec![Some(Middle), Some(Right)]);
        assert_eq!(
            resolve_buttons(down, Some(0), Some(m(6))),
            vec![Some(Left), Some(Middle), Some(Right)]
        );
        assert_eq!(resolve_buttons(down, Some(0), Some(m(1))), vec![Some(Left)]);
        assert_eq!(resolve_buttons(down, Some(0), Some(m(0))), vec![Some(Left)]);
        assert_eq!(
            resolve_buttons(PointerEventKind::Move, Some(0), Some(m(0))),
            vec![None]
        );
    }

    #[test]
    fn chord_missing_fields() {
        let down = PointerEventKind::Down;
        assert_eq!(resolve_buttons(down, None, None), vec![Some(MouseButton::Left)]);
        assert_eq!(resolve_buttons(down, Some(2), None), vec![Some(MouseButton::Right)]);
    }

    #[test]
    fn unknown_code_resolves_to_nothing() {
        assert!(resolve_buttons(PointerEventKind::Down, Some(3), Some(ButtonMask::BACK)).is_empty());
        assert!(resolve_buttons(PointerEventKind::Up, Some(-1), None).is_empty());
    }

    #[test]
    fn classify_splits_chords() {
        let g = gsm();
        let raw = RawPointerEvent::new(PointerEventKind::Up)
            .at(1.0, 1.0)
            .with_button(0)
            .with_buttons(ButtonMask::SECONDARY | ButtonMask::AUXILIARY);
        let events = g.classify(&InputNormalizer::default().pointer(&raw));
        let buttons: Vec<_> = events
            .iter()
            .map(|e| e.mouse_args().and_then(|a| a.button))
            .collect();
        assert_eq!(
            buttons,
            vec![
                Some(MouseButton::Left),
                Some(MouseButton::Middle),
                Some(MouseButton::Right)
            ]
        );
        assert!(events.iter().all(|e| e.kind == EventKind::MouseUp));
    }

    #[test]
    fn classify_wheel_skips_chords() {
        let g = gsm();
        let raw = RawPointerEvent::new(PointerEventKind::Wheel)
            .with_button(0)
            .with_buttons(ButtonMask::SECONDARY)
            .with_wheel_delta(3.0);
        let events = g.classify(&InputNormalizer::default().pointer(&raw));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Wheel);
    }
}
