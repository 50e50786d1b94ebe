//! In-process extensibility runtime for a host application.
//!
//! The crate packages four cooperating components behind one shared
//! [`ToolContext`]:
//!
//! - [`ToolRegistry`] discovers tools from per-tool `manifest.json` files
//!   under a plugins directory and instantiates them through an
//!   [`EntryTable`] of registered factories.
//! - [`CommandBus`] maps string command names to synchronous handlers.
//! - [`EventBus`] offers topic-based publish/subscribe with isolated
//!   subscriber failures.
//! - [`JobCenter`] runs one background job at a time on an OS thread and
//!   marshals completions back to the main thread through [`JobCenter::drain`].
//!
//! [`Session`] wires all of this together and registers the `tool.execute`
//! command, the single fault boundary around dispatched tools.
//!
//! ```no_run
//! use toolhub_core::{EntryTable, Session};
//!
//! let session = Session::builder().entries(EntryTable::new()).build();
//! for key in session.registry().list_tools() {
//!     println!("{key}");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod bus;
pub mod jobs;
pub mod observability;
pub mod registry;
pub mod session;
pub mod tools;
pub mod types;

pub use bus::{CommandArgs, CommandBus, CommandHandler, EventBus, EventCallback};
pub use jobs::{JobCenter, TOPIC_JOB_DONE, TOPIC_JOB_FAILED};
pub use registry::{Diagnostic, EntryTable, Manifest, ToolRegistry, MANIFEST_FILE};
pub use session::{
    MainView, Session, SessionBuilder, CMD_TOOL_EXECUTE, TOPIC_TOOL_DONE, TOPIC_TOOL_FAILED,
};
pub use tools::{
    HostFacade, JsonSettings, MemorySettings, MessageLevel, NullHost, Service, SettingsStore,
    StateStore, Tool, ToolContext, ToolInstance, UiHandle,
};
pub use types::{Config, Error, JobId, Result, ToolKey};
