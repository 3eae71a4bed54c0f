#![forbid(unsafe_code)]

//! Error types for the runtime.
//!
//! [`Error`] covers misuse of the runtime API: ending a command that is not
//! the active one, registering a factory twice, or talking to a listener set
//! about an event kind it does not carry. These are programming errors and are
//! always returned to the caller, never logged and dropped.
//!
//! Expected conditions (undo on an empty history, committing a sequence when
//! only the base sequence exists) are reported with `bool`/`Option` instead.

use std::fmt;
use std::io;

use trellis_core::semantic_event::{CommandId, EventKind};

/// Runtime API misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `end`/`cancel` targeted a command that is not the active one.
    NotActive {
        requested: CommandId,
        active: Option<CommandId>,
    },
    /// A factory was already registered under this type string.
    DuplicateFactory(String),
    /// The listener set does not carry this event kind.
    UnsupportedEvent { set: &'static str, kind: EventKind },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotActive {
                requested,
                active: Some(active),
            } => write!(f, "{requested} is not the active command ({active} is)"),
            Self::NotActive {
                requested,
                active: None,
            } => write!(f, "{requested} is not the active command (none is active)"),
            Self::DuplicateFactory(ty) => {
                write!(f, "a factory for type '{ty}' is already registered")
            }
            Self::UnsupportedEvent { set, kind } => {
                write!(f, "listener set '{set}' does not support {kind}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Failure to load or validate a [`RouterConfig`](crate::config::RouterConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the config file failed.
    Io(io::Error),
    /// TOML parse failure.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse failure.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// The config parsed but holds out-of-range values.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "config TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "config JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "config validation failed: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_active_names_both_commands() {
        let err = Error::NotActive {
            requested: CommandId(3),
            active: Some(CommandId(5)),
        };
        assert_eq!(err.to_string(), "cmd#3 is not the active command (cmd#5 is)");
        let err = Error::NotActive {
            requested: CommandId(3),
            active: None,
        };
        assert!(err.to_string().contains("none is active"));
    }

    #[test]
    fn unsupported_event_display() {
        let err = Error::UnsupportedEvent {
            set: "events.command",
            kind: EventKind::MouseDown,
        };
        assert_eq!(
            err.to_string(),
            "listener set 'events.command' does not support event.mouse.down"
        );
    }

    #[test]
    fn validation_joins_messages() {
        let err = ConfigError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "config validation failed: a; b");
    }
}
