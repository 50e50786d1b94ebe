//! Tool context - the value bundle handed to every tool instantiation.

use crate::bus::{CommandBus, EventBus};
use crate::jobs::JobCenter;
use crate::tools::host::HostFacade;
use crate::tools::settings::SettingsStore;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Named external collaborator handle carried in the context.
///
/// Services are independently versioned (AIGC clients, bridge processes, ...)
/// and opaque to the runtime; tools that know a concrete type downcast via
/// `as_any`.
pub trait Service: Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

/// In-memory session state. Lives for the application session, never
/// persisted; tools use it to remember values across invocations
/// (last-used parameters, active panel, ...).
#[derive(Debug, Default)]
pub struct StateStore {
    data: RwLock<HashMap<String, Value>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}

/// Context object passed to tools, containing all system components.
///
/// Constructed once by the session glue and shared read-mostly by every tool
/// instance for the lifetime of the application session. Exactly these seven
/// handles are available; tools must not assume any other ambient state.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Host application facade.
    pub host: Arc<dyn HostFacade>,
    /// Persistent settings.
    pub settings: Arc<dyn SettingsStore>,
    /// Session-scoped key/value state.
    pub state: Arc<StateStore>,
    /// Command bus handle.
    pub commands: Arc<CommandBus>,
    /// Event bus handle.
    pub events: Arc<EventBus>,
    /// Background job center, when the session runs one.
    pub jobs: Option<Arc<JobCenter>>,
    /// Named service handles.
    pub services: HashMap<String, Arc<dyn Service>>,
}

impl ToolContext {
    /// Look up a named service handle.
    pub fn service(&self, name: &str) -> Option<&Arc<dyn Service>> {
        self.services.get(name)
    }
}
