#![forbid(unsafe_code)]

//! Factory registries for commands and transactions.
//!
//! A registry maps a unique type string to a constructor. Registries are
//! plain values owned by whoever builds commands or transactions (normally
//! the [`EventRouter`](crate::router::EventRouter)); there is no global
//! table, so each test can start from an empty one.
//!
//! Factories take their construction arguments as `&dyn Any` and downcast
//! to the type they expect.

use std::any::Any;
use std::fmt;

use ahash::AHashMap;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::undo::Transaction;

/// Constructor stored in a [`FactoryRegistry`].
pub type Factory<T> = Box<dyn Fn(&dyn Any) -> T>;

/// Type-string keyed constructors producing `T`.
pub struct FactoryRegistry<T> {
    factories: AHashMap<String, Factory<T>>,
}

/// Registry of [`Command`] constructors.
pub type CommandRegistry = FactoryRegistry<Box<dyn Command>>;

/// Registry of [`Transaction`] constructors.
pub type TransactionRegistry = FactoryRegistry<Box<dyn Transaction>>;

impl<T> Default for FactoryRegistry<T> {
    fn default() -> Self {
        Self {
            factories: AHashMap::new(),
        }
    }
}

impl<T> fmt::Debug for FactoryRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("FactoryRegistry")
            .field("types", &types)
            .finish()
    }
}

impl<T> FactoryRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `type_name`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateFactory`] if the type string is already taken; the
    /// existing factory is kept.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        factory: impl Fn(&dyn Any) -> T + 'static,
    ) -> Result<()> {
        let type_name = type_name.into();
        if self.factories.contains_key(&type_name) {
            return Err(Error::DuplicateFactory(type_name));
        }
        self.factories.insert(type_name, Box::new(factory));
        Ok(())
    }

    /// Build an instance of `type_name`, or `None` if nothing is registered.
    #[must_use]
    pub fn create(&self, type_name: &str, args: &dyn Any) -> Option<T> {
        self.factories.get(type_name).map(|factory| factory(args))
    }

    #[must_use]
    pub fn is_available(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
