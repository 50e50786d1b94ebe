//! CommandBus - name-keyed synchronous invocation routing.
//!
//! Commands are registered with a name and dispatched with a JSON object of
//! keyword arguments. The bus is a pure router: dispatch of an unknown name
//! fails with `NotRegistered`, and a registered handler's error propagates
//! unmodified to the caller. Fault handling (user feedback, failure events)
//! belongs to the orchestration layer around a dispatched command, not here.
//!
//! Registration is last-write-wins; re-registering a name replaces the prior
//! handler and logs a warning. Like event subscription, registration belongs
//! to the single-threaded setup phase.

use crate::types::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Keyword arguments for one command invocation.
pub type CommandArgs = serde_json::Map<String, Value>;

/// Registered command handler.
pub type CommandHandler = Box<dyn Fn(&CommandArgs) -> Result<Value> + Send + Sync>;

/// Synchronous command bus for named invocations.
pub struct CommandBus {
    handlers: RwLock<HashMap<String, CommandHandler>>,
}

impl CommandBus {
    /// Create a new CommandBus with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a command handler under a name.
    ///
    /// A duplicate name silently replaces the prior handler (last-write-wins)
    /// but leaves a warn-level diagnostic so the collision is observable.
    pub fn register<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&CommandArgs) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if handlers.insert(name.clone(), Box::new(handler)).is_some() {
            tracing::warn!(command = name, "handler re-registered, replacing previous");
        } else {
            tracing::debug!(command = name, "handler registered");
        }
    }

    /// Dispatch a command by name, synchronously, on the caller's thread.
    ///
    /// Fails with `NotRegistered` for an unknown name without invoking
    /// anything; otherwise returns whatever the handler returns.
    pub fn dispatch(&self, name: &str, args: CommandArgs) -> Result<Value> {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let handler = handlers
            .get(name)
            .ok_or_else(|| Error::not_registered(format!("command '{name}' is not registered")))?;

        tracing::debug!(command = name, "dispatching");
        handler(&args)
    }

    /// Whether a handler is registered for a name.
    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("CommandBus")
            .field("commands", &handlers.len())
            .finish()
    }
}
