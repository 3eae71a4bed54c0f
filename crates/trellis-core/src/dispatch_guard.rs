#![forbid(unsafe_code)]

//! Scoped re-entrancy guard for dispatch.
//!
//! A subsystem that synthesizes follow-up events must not receive those
//! events again while it is still producing them. [`DispatchLatch::try_enter`]
//! hands out a [`DispatchToken`] only when the latch is free; the latch stays
//! held until the token is dropped, on every exit path including `?` returns
//! and unwinding.
//!
//! The token does not borrow the latch, so the owner can keep dispatching
//! through `&mut self` while holding it.

use std::cell::Cell;
use std::rc::Rc;

/// Busy flag for one subsystem.
#[derive(Debug, Default)]
pub struct DispatchLatch {
    busy: Rc<Cell<bool>>,
}

impl DispatchLatch {
    /// Create a free latch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a token is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Acquire the latch, or `None` if it is already held.
    #[must_use]
    pub fn try_enter(&self) -> Option<DispatchToken> {
        if self.busy.replace(true) {
            return None;
        }
        Some(DispatchToken {
            busy: Rc::clone(&self.busy),
        })
    }
}

/// Proof that a latch is held. Releases the latch on drop.
#[derive(Debug)]
#[must_use = "the latch is released as soon as the token is dropped"]
pub struct DispatchToken {
    busy: Rc<Cell<bool>>,
}

impl Drop for DispatchToken {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}
