#![forbid(unsafe_code)]

//! Core: input normalization, gesture classification, and hotkey tracking.
//!
//! # Role in Trellis
//! `trellis-core` is the input layer. It turns raw pointer and keyboard
//! notifications into [`SemanticEvent`](semantic_event::SemanticEvent)s and
//! owns the two stateful classifiers that sit in front of the router.
//!
//! # Primary responsibilities
//! - **InputNormalizer**: raw payload → semantic arguments, with the
//!   Meta-as-Ctrl platform remap.
//! - **GestureStateMachine**: per-button down/drag state, click and
//!   double-click detection, chorded-button resolution.
//! - **KeyStateTracker**: held-key set, canonical hotkey strings, scoped
//!   hotkey lookup, stuck-key reconciliation.
//! - **DispatchLatch**: scoped re-entrancy guard used by the router.
//!
//! # How it fits in the system
//! The runtime (`trellis-runtime`) owns one of each classifier and feeds them
//! from its `EventRouter`. Nothing in this crate dispatches events itself;
//! every stateful operation returns the events the caller must dispatch.

pub mod dispatch_guard;
pub mod event;
pub mod gesture;
pub mod keybinding;
pub mod logging;
pub mod normalizer;
pub mod semantic_event;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, trace, warn};

pub use dispatch_guard::{DispatchLatch, DispatchToken};
pub use event::{
    ButtonMask, FocusTarget, KeyCode, KeyEventKind, ModifierFlags, Modifiers, MouseButton,
    Platform, PointerEventKind, RawKeyEvent, RawPointerEvent,
};
pub use gesture::{ButtonState, GestureConfig, GestureStateMachine};
pub use keybinding::{HotkeyRegistry, KeyConfig, KeyDownOutcome, KeyStateTracker};
pub use normalizer::{InputNormalizer, NormalizedPointer};
pub use semantic_event::{
    CommandArgs, CommandId, EventArgs, EventCategory, EventKind, KeyArgs, MouseArgs, Position,
    SemanticEvent, Timing, TransactionArgs, TransactionId,
};
