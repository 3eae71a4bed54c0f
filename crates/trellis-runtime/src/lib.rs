#![forbid(unsafe_code)]

//! Runtime: event routing, the command stack, and transaction history.
//!
//! # Role in Trellis
//! `trellis-runtime` sits on top of `trellis-core`'s classifiers and decides
//! where every semantic event goes. It owns the single-active-command
//! discipline and the nested undo/redo log.
//!
//! # Primary responsibilities
//! - **EventRouter**: gesture tier, key tier, active command, listener sets.
//! - **CommandStack**: one active command, LIFO suspend stack, before/after
//!   lifecycle notifications.
//! - **TransactionLog**: bounded sequences, previews, merged or replayed
//!   sequence commits, undo/redo.
//! - **ListenerSet** / **FactoryRegistry**: typed observers and explicit,
//!   non-global constructor tables.
//! - **RouterConfig**: defaults, environment overrides, optional TOML/JSON.
//!
//! # Logging
//! Structured `tracing` events use the targets `trellis.router`,
//! `trellis.command` and `trellis.transaction`.

pub mod command;
pub mod config;
pub mod error;
pub mod listener;
pub mod registry;
pub mod router;
pub mod undo;

pub use command::{Command, CommandCx, CommandStack, CommandState, Termination};
pub use config::{GesturePolicy, HistoryConfig, KeyPolicy, RouterConfig};
pub use error::{ConfigError, Error, Result};
pub use listener::{Listener, ListenerId, ListenerSet};
pub use registry::{CommandRegistry, FactoryRegistry, TransactionRegistry};
pub use router::{EventRouter, HotkeyHandler};
pub use undo::{
    CommitResult, GroupTransaction, Transaction, TransactionLog, TransactionRecord,
    TransactionSequence,
};
