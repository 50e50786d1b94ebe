//! Host application facade.
//!
//! The runtime never calls host-specific APIs directly; everything it needs
//! from the surrounding application flows through this capability interface.
//! The real implementation (a DCC backend, an editor, ...) lives with the
//! host; `NullHost` is the bundled headless stand-in.

use std::fmt;

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageLevel::Info => write!(f, "info"),
            MessageLevel::Warning => write!(f, "warning"),
            MessageLevel::Error => write!(f, "error"),
        }
    }
}

/// Capability interface onto the host application.
///
/// Implementations must be callable from the main thread only; worker-thread
/// code never receives a facade handle.
pub trait HostFacade: Send + Sync + fmt::Debug {
    /// Identifiers of the currently selected objects, if any.
    fn selection(&self) -> Vec<String>;

    /// Display a message to the user (status line, popup, console).
    fn show_message(&self, text: &str, level: MessageLevel);

    /// Open an undo chunk. Prefer [`scoped_undo`](dyn HostFacade::scoped_undo),
    /// which guarantees the matching close.
    fn begin_undo(&self, label: &str);

    /// Close the currently open undo chunk.
    fn end_undo(&self);
}

impl dyn HostFacade {
    /// Open an undo chunk that closes when the returned guard drops, so a
    /// tool erroring mid-operation still leaves a balanced undo stack.
    pub fn scoped_undo<'a>(&'a self, label: &str) -> UndoScope<'a> {
        self.begin_undo(label);
        UndoScope { host: self }
    }
}

/// RAII guard for one undo chunk.
#[derive(Debug)]
pub struct UndoScope<'a> {
    host: &'a dyn HostFacade,
}

impl Drop for UndoScope<'_> {
    fn drop(&mut self) {
        self.host.end_undo();
    }
}

/// Headless facade: empty selection, messages go to the log, undo is a no-op.
#[derive(Debug, Default)]
pub struct NullHost;

impl HostFacade for NullHost {
    fn selection(&self) -> Vec<String> {
        Vec::new()
    }

    fn show_message(&self, text: &str, level: MessageLevel) {
        match level {
            MessageLevel::Info => tracing::info!(target: "toolhub::host", "{text}"),
            MessageLevel::Warning => tracing::warn!(target: "toolhub::host", "{text}"),
            MessageLevel::Error => tracing::error!(target: "toolhub::host", "{text}"),
        }
    }

    fn begin_undo(&self, _label: &str) {}

    fn end_undo(&self) {}
}
