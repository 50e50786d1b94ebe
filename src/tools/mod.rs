//! Tool capability contract and supporting collaborators.
//!
//! A tool is anything implementing the [`Tool`] pair of operations:
//! `create_ui` (optional embeddable control surface) and `execute` (the
//! actual work). Concrete tools live outside this crate; the registry
//! constructs them through factories and hands each one a [`ToolContext`].

pub mod context;
pub mod host;
pub mod settings;

pub use context::{Service, StateStore, ToolContext};
pub use host::{HostFacade, MessageLevel, NullHost, UndoScope};
pub use settings::{JsonSettings, MemorySettings, SettingsStore};

use crate::bus::CommandArgs;
use crate::types::{Result, ToolKey};
use serde_json::Value;
use std::fmt;

/// Opaque handle to a host-toolkit widget. The runtime never inspects it,
/// only threads it between the host and the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UiHandle(pub u64);

/// Capability set every tool implements.
///
/// Both operations run on the main thread. A tool that needs background work
/// submits it through the job center in its context instead of blocking.
pub trait Tool: fmt::Debug {
    /// Build the tool's control surface under `parent`, or return `None` for
    /// headless tools.
    fn create_ui(&mut self, parent: Option<UiHandle>) -> Option<UiHandle>;

    /// Run the tool with keyword arguments. Errors propagate to the
    /// dispatching fault boundary, which reports them and publishes
    /// `tool/failed`.
    fn execute(&mut self, args: &CommandArgs) -> Result<Value>;
}

/// A constructed tool stamped with its originating manifest key.
///
/// The stamp lets the instance self-report its identity back into command
/// dispatch (UI callbacks dispatch `tool.execute` with `key`) without owning
/// the registry or the buses.
#[derive(Debug)]
pub struct ToolInstance {
    key: ToolKey,
    tool: Box<dyn Tool>,
}

impl ToolInstance {
    pub(crate) fn new(key: ToolKey, tool: Box<dyn Tool>) -> Self {
        Self { key, tool }
    }

    /// Manifest key this instance was created from.
    pub fn key(&self) -> &ToolKey {
        &self.key
    }

    /// See [`Tool::create_ui`].
    pub fn create_ui(&mut self, parent: Option<UiHandle>) -> Option<UiHandle> {
        self.tool.create_ui(parent)
    }

    /// See [`Tool::execute`].
    pub fn execute(&mut self, args: &CommandArgs) -> Result<Value> {
        self.tool.execute(args)
    }
}
