#![forbid(unsafe_code)]

//! Semantic events dispatched through the router.
//!
//! A [`SemanticEvent`] is the application-level counterpart of a raw device
//! notification: it names *what happened* (an [`EventKind`] from a closed
//! catalogue), carries a typed argument payload, records the lifecycle
//! [`Timing`] phase for command/transaction notifications, and holds the
//! cooperative `handled` flag that stops propagation.
//!
//! # Invariants
//! 1. Every [`EventKind`] has exactly one catalogue identifier and one
//!    [`EventCategory`].
//! 2. `handled` only ever goes from `false` to `true` during a dispatch.

use std::fmt;

use crate::event::{FocusTarget, KeyCode, ModifierFlags, MouseButton};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A 2D location on the interaction surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Event catalogue
// ---------------------------------------------------------------------------

/// Broad family an [`EventKind`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Mouse,
    Keyboard,
    Command,
    Transaction,
}

/// The closed vocabulary of semantic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Mouse ===
    MouseDown,
    MouseUp,
    MouseMove,
    Click,
    DblClick,
    DragStart,
    DragMove,
    DragEnd,
    Wheel,
    MouseOver,
    MouseOut,

    // === Keyboard ===
    KeyDown,
    KeyUp,
    KeyPressed,

    // === Command lifecycle ===
    CommandStarted,
    CommandSuspended,
    CommandResumed,
    CommandTerminated,
    CommandCanceled,

    // === Transaction log ===
    TransactionCommitted,
    TransactionUndoing,
    TransactionRedoing,
    TransactionUndone,
    TransactionRedone,
    UndoRedoStateChanged,
}

impl EventKind {
    /// Every kind, in catalogue order.
    pub const ALL: [Self; 25] = [
        Self::MouseDown,
        Self::MouseUp,
        Self::MouseMove,
        Self::Click,
        Self::DblClick,
        Self::DragStart,
        Self::DragMove,
        Self::DragEnd,
        Self::Wheel,
        Self::MouseOver,
        Self::MouseOut,
        Self::KeyDown,
        Self::KeyUp,
        Self::KeyPressed,
        Self::CommandStarted,
        Self::CommandSuspended,
        Self::CommandResumed,
        Self::CommandTerminated,
        Self::CommandCanceled,
        Self::TransactionCommitted,
        Self::TransactionUndoing,
        Self::TransactionRedoing,
        Self::TransactionUndone,
        Self::TransactionRedone,
        Self::UndoRedoStateChanged,
    ];

    /// Stable catalogue identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MouseDown => "event.mouse.down",
            Self::MouseUp => "event.mouse.up",
            Self::MouseMove => "event.mouse.move",
            Self::Click => "event.mouse.click",
            Self::DblClick => "event.mouse.dblclick",
            Self::DragStart => "dragstart",
            Self::DragMove => "dragmove",
            Self::DragEnd => "dragend",
            Self::Wheel => "event.mouse.wheel",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::KeyDown => "event.keyboard.keydown",
            Self::KeyUp => "event.keyboard.keyup",
            Self::KeyPressed => "event.keyboard.keypressed",
            Self::CommandStarted => "event.command.started",
            Self::CommandSuspended => "event.command.suspended",
            Self::CommandResumed => "event.command.resumed",
            Self::CommandTerminated => "event.command.terminated",
            Self::CommandCanceled => "event.command.canceled",
            Self::TransactionCommitted => "event.transaction.committed",
            Self::TransactionUndoing => "event.transaction.undoing",
            Self::TransactionRedoing => "event.transaction.redoing",
            Self::TransactionUndone => "event.transaction.undone",
            Self::TransactionRedone => "event.transaction.redone",
            Self::UndoRedoStateChanged => "event.transaction.undoredostatechanged",
        }
    }

    /// Look up a kind by its catalogue identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == id)
    }

    /// Family this kind belongs to.
    #[must_use]
    pub const fn category(self) -> EventCategory {
        match self {
            Self::MouseDown
            | Self::MouseUp
            | Self::MouseMove
            | Self::Click
            | Self::DblClick
            | Self::DragStart
            | Self::DragMove
            | Self::DragEnd
            | Self::Wheel
            | Self::MouseOver
            | Self::MouseOut => EventCategory::Mouse,
            Self::KeyDown | Self::KeyUp | Self::KeyPressed => EventCategory::Keyboard,
            Self::CommandStarted
            | Self::CommandSuspended
            | Self::CommandResumed
            | Self::CommandTerminated
            | Self::CommandCanceled => EventCategory::Command,
            Self::TransactionCommitted
            | Self::TransactionUndoing
            | Self::TransactionRedoing
            | Self::TransactionUndone
            | Self::TransactionRedone
            | Self::UndoRedoStateChanged => EventCategory::Transaction,
        }
    }

    /// Returns true for drag-related kinds.
    #[must_use]
    pub const fn is_drag(self) -> bool {
        matches!(self, Self::DragStart | Self::DragMove | Self::DragEnd)
    }

    /// Returns true for click-like kinds.
    #[must_use]
    pub const fn is_click(self) -> bool {
        matches!(self, Self::Click | Self::DblClick)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase of a notification relative to the state change it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timing {
    #[default]
    None,
    Before,
    After,
}

// ---------------------------------------------------------------------------
// Argument payloads
// ---------------------------------------------------------------------------

/// Identifier of a command instance on the command stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub u64);

/// Identifier of a transaction in the transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub u64);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd#{}", self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn#{}", self.0)
    }
}

/// Pointer event arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MouseArgs {
    /// Resolved button identity; `None` means no button is involved.
    pub button: Option<MouseButton>,
    /// Location relative to the interaction surface.
    pub location: Option<Position>,
    pub page: Option<Position>,
    pub client: Option<Position>,
    pub screen: Option<Position>,
    pub wheel_delta: Option<f64>,
    pub modifiers: ModifierFlags,
}

impl MouseArgs {
    /// Arguments for `button` at `(x, y)`.
    #[must_use]
    pub fn at(button: MouseButton, x: f64, y: f64) -> Self {
        Self {
            button: Some(button),
            location: Some(Position::new(x, y)),
            ..Self::default()
        }
    }

    /// Surface location, with a missing location read as the origin.
    #[must_use]
    pub fn position(&self) -> Position {
        self.location.unwrap_or_default()
    }
}

/// Keyboard event arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyArgs {
    /// Physical key; `None` for keys the platform remap ignores.
    pub code: Option<KeyCode>,
    pub modifiers: ModifierFlags,
    pub target: FocusTarget,
}

impl KeyArgs {
    /// Arguments for `code` on the surface with no modifier information.
    #[must_use]
    pub fn new(code: impl Into<KeyCode>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }
}

/// Command lifecycle arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArgs {
    pub id: CommandId,
    pub command_type: String,
}

/// Transaction log arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionArgs {
    /// Transaction the notification is about, if any.
    pub id: Option<TransactionId>,
    pub description: Option<String>,
    /// Undo availability after the notification's state change.
    pub can_undo: bool,
    /// Redo availability after the notification's state change.
    pub can_redo: bool,
}

/// Typed payload of a [`SemanticEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventArgs {
    Mouse(MouseArgs),
    Key(KeyArgs),
    Command(CommandArgs),
    Transaction(TransactionArgs),
}

// ---------------------------------------------------------------------------
// SemanticEvent
// ---------------------------------------------------------------------------

/// An application-level event moving through the router.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticEvent {
    pub kind: EventKind,
    pub args: EventArgs,
    pub timing: Timing,
    handled: bool,
}

impl SemanticEvent {
    /// Create an unhandled event.
    #[must_use]
    pub const fn new(kind: EventKind, args: EventArgs, timing: Timing) -> Self {
        Self {
            kind,
            args,
            timing,
            handled: false,
        }
    }

    /// A pointer event.
    #[must_use]
    pub const fn mouse(kind: EventKind, args: MouseArgs) -> Self {
        Self::new(kind, EventArgs::Mouse(args), Timing::None)
    }

    /// A keyboard event.
    #[must_use]
    pub const fn key(kind: EventKind, args: KeyArgs) -> Self {
        Self::new(kind, EventArgs::Key(args), Timing::None)
    }

    /// A command lifecycle notification.
    #[must_use]
    pub const fn command(kind: EventKind, args: CommandArgs, timing: Timing) -> Self {
        Self::new(kind, EventArgs::Command(args), timing)
    }

    /// A transaction log notification.
    #[must_use]
    pub const fn transaction(kind: EventKind, args: TransactionArgs, timing: Timing) -> Self {
        Self::new(kind, EventArgs::Transaction(args), timing)
    }

    /// A fresh, unhandled copy of this event with a different kind.
    #[must_use]
    pub fn retarget(&self, kind: EventKind) -> Self {
        Self::new(kind, self.args.clone(), self.timing)
    }

    /// Stop further propagation.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    /// Whether a handler has claimed this event.
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        self.handled
    }

    /// Pointer arguments, if this is a pointer event.
    #[must_use]
    pub fn mouse_args(&self) -> Option<&MouseArgs> {
        match &self.args {
            EventArgs::Mouse(args) => Some(args),
            _ => None,
        }
    }

    /// Keyboard arguments, if this is a keyboard event.
    #[must_use]
    pub fn key_args(&self) -> Option<&KeyArgs> {
        match &self.args {
            EventArgs::Key(args) => Some(args),
            _ => None,
        }
    }

    /// Command arguments, if this is a command notification.
    #[must_use]
    pub fn command_args(&self) -> Option<&CommandArgs> {
        match &self.args {
            EventArgs::Command(args) => Some(args),
            _ => None,
        }
    }

    /// Transaction arguments, if this is a transaction notification.
    #[must_use]
    pub fn transaction_args(&self) -> Option<&TransactionArgs> {
        match &self.args {
            EventArgs::Transaction(args) => Some(args),
            _ => None,
        }
    }

    /// Modifier flags carried by pointer and keyboard events.
    #[must_use]
    pub fn modifiers(&self) -> Option<ModifierFlags> {
        match &self.args {
            EventArgs::Mouse(args) => Some(args.modifiers),
            EventArgs::Key(args) => Some(args.modifiers),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_ids_are_unique() {
        let mut ids: Vec<&str> = EventKind::ALL.iter().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EventKind::ALL.len());
    }

    #[test]
    fn from_id_round_trips_catalogue() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_id(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::from_id("event.mouse.triple"), None);
    }

    #[test]
    fn categories() {
        assert_eq!(EventKind::DragEnd.category(), EventCategory::Mouse);
        assert_eq!(EventKind::KeyPressed.category(), EventCategory::Keyboard);
        assert_eq!(EventKind::CommandResumed.category(), EventCategory::Command);
        assert_eq!(
            EventKind::UndoRedoStateChanged.category(),
            EventCategory::Transaction
        );
    }

    #[test]
    fn drag_and_click_helpers() {
        assert!(EventKind::DragMove.is_drag());
        assert!(!EventKind::MouseMove.is_drag());
        assert!(EventKind::DblClick.is_click());
        assert!(!EventKind::MouseUp.is_click());
    }

    #[test]
    fn euclidean_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_location_reads_as_origin() {
        let args = MouseArgs::default();
        assert_eq!(args.position(), Position::default());
    }

    #[test]
    fn handled_flag_and_retarget() {
        let mut ev = SemanticEvent::mouse(
            EventKind::MouseDown,
            MouseArgs::at(MouseButton::Left, 1.0, 2.0),
        );
        assert!(!ev.is_handled());
        ev.mark_handled();
        assert!(ev.is_handled());

        let up = ev.retarget(EventKind::MouseUp);
        assert_eq!(up.kind, EventKind::MouseUp);
        assert!(!up.is_handled());
        assert_eq!(up.mouse_args(), ev.mouse_args());
        assert!(up.key_args().is_none());
    }
}
