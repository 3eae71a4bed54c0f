#![forbid(unsafe_code)]

//! Typed listener sets.
//!
//! A [`ListenerSet`] carries the observers for one [`EventCategory`]. Each
//! listener subscribes to a single [`EventKind`] and receives the event by
//! mutable reference so it can mark it handled. Listeners for a kind run in
//! subscription order and every one of them runs; the handled flag does not
//! short-circuit a set.
//!
//! Subscribing to, unsubscribing from, or emitting a kind outside the set's
//! category is an API error ([`Error::UnsupportedEvent`]).

use std::fmt;

use trellis_core::semantic_event::{EventCategory, EventKind, SemanticEvent};

use crate::error::{Error, Result};

/// Observer callback.
pub type Listener = Box<dyn FnMut(&mut SemanticEvent)>;

/// Handle returned by [`ListenerSet::listen`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered observers for the event kinds of one category.
pub struct ListenerSet {
    name: &'static str,
    category: EventCategory,
    listeners: Vec<(ListenerId, EventKind, Listener)>,
    next_id: u64,
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ListenerSet {
    /// Create an empty set named `name` carrying `category`.
    #[must_use]
    pub const fn new(name: &'static str, category: EventCategory) -> Self {
        Self {
            name,
            category,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub const fn mouse() -> Self {
        Self::new("events.mouse", EventCategory::Mouse)
    }

    #[must_use]
    pub const fn keyboard() -> Self {
        Self::new("events.keyboard", EventCategory::Keyboard)
    }

    #[must_use]
    pub const fn command() -> Self {
        Self::new("events.command", EventCategory::Command)
    }

    #[must_use]
    pub const fn transaction() -> Self {
        Self::new("events.transaction", EventCategory::Transaction)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this set carries `kind`.
    #[must_use]
    pub fn supports(&self, kind: EventKind) -> bool {
        kind.category() == self.category
    }

    fn check(&self, kind: EventKind) -> Result<()> {
        if self.supports(kind) {
            Ok(())
        } else {
            Err(Error::UnsupportedEvent {
                set: self.name,
                kind,
            })
        }
    }

    /// Subscribe `listener` to `kind`.
    pub fn listen(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&mut SemanticEvent) + 'static,
    ) -> Result<ListenerId> {
        self.check(kind)?;
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, Box::new(listener)));
        Ok(id)
    }

    /// Remove one subscription. Returns whether it was present.
    pub fn unlisten(&mut self, kind: EventKind, id: ListenerId) -> Result<bool> {
        self.check(kind)?;
        let before = self.listeners.len();
        self.listeners.retain(|(i, k, _)| !(*i == id && *k == kind));
        Ok(self.listeners.len() != before)
    }

    /// Remove every subscription to `kind`, or every subscription in the set
    /// when `kind` is `None`. Returns how many were removed.
    pub fn unlisten_all(&mut self, kind: Option<EventKind>) -> Result<usize> {
        let before = self.listeners.len();
        match kind {
            Some(kind) => {
                self.check(kind)?;
                self.listeners.retain(|(_, k, _)| *k != kind);
            }
            None => self.listeners.clear(),
        }
        Ok(before - self.listeners.len())
    }

    /// Run every listener subscribed to `event.kind`, in subscription order.
    /// Returns the event's handled flag afterwards.
    pub fn emit(&mut self, event: &mut SemanticEvent) -> Result<bool> {
        self.check(event.kind)?;
        Ok(self.broadcast(event))
    }

    /// [`emit`](Self::emit) for callers that already know the kind is
    /// supported.
    pub(crate) fn broadcast(&mut self, event: &mut SemanticEvent) -> bool {
        for (_, kind, listener) in &mut self.listeners {
            if *kind == event.kind {
                listener(event);
            }
        }
        event.is_handled()
    }

    /// Number of listeners subscribed to `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.iter().filter(|(_, k, _)| *k == kind).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
