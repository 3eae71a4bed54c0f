#![forbid(unsafe_code)]

//! Trellis public facade crate.
//!
//! Re-exports the types an editor needs to wire raw input into Trellis and
//! offers a prelude for day-to-day use.
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut router = EventRouter::new(RouterConfig::default());
//! router.register_hotkey("Ctrl+Z", |r| r.undo().map(|_| ()), None);
//! assert_eq!(router.hotkey_environment(), "default");
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use trellis_core::event::{
    ButtonMask, FocusTarget, KeyCode, KeyEventKind, ModifierFlags, Modifiers, MouseButton,
    Platform, PointerEventKind, RawKeyEvent, RawPointerEvent,
};
pub use trellis_core::gesture::{GestureConfig, GestureStateMachine};
pub use trellis_core::keybinding::{KeyConfig, KeyStateTracker, canonical_hotkey};
pub use trellis_core::semantic_event::{
    CommandArgs, CommandId, EventArgs, EventCategory, EventKind, KeyArgs, MouseArgs, Position,
    SemanticEvent, Timing, TransactionArgs, TransactionId,
};

// --- Runtime re-exports ----------------------------------------------------

pub use trellis_runtime::{
    Command, CommandCx, CommandState, CommitResult, ConfigError, EventRouter, GroupTransaction,
    HistoryConfig, ListenerId, RouterConfig, Termination, Transaction, TransactionLog,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Trellis embedders.
#[derive(Debug)]
pub enum Error {
    /// Runtime API misuse.
    Runtime(trellis_runtime::Error),
    /// Configuration could not be loaded or validated.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Runtime(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<trellis_runtime::Error> for Error {
    fn from(err: trellis_runtime::Error) -> Self {
        Self::Runtime(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for Trellis embedders.
pub type Result<T> = std::result::Result<T, Error>;

/// Build a router from `TRELLIS_*` environment overrides, rejecting invalid
/// values.
pub fn router_from_env() -> Result<EventRouter> {
    let config = RouterConfig::from_env().into_validated()?;
    Ok(EventRouter::new(config))
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Command, CommandCx, Error, EventKind, EventRouter, KeyCode, ModifierFlags, MouseButton,
        RawKeyEvent, RawPointerEvent, Result, RouterConfig, SemanticEvent, Termination,
        Transaction,
    };

    pub use crate::{core, runtime};
}

pub use trellis_core as core;
pub use trellis_runtime as runtime;
