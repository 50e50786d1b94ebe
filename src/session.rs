//! Session - the orchestration glue wiring registry, buses, and host facade.
//!
//! One `Session` lives for one application session. `build()` constructs the
//! buses, job center, state store, and registry, bundles them into the
//! [`ToolContext`], and registers the `tool.execute` command.
//!
//! `tool.execute` is the single fault boundary around dispatched tools: any
//! failure is logged, surfaced to the user through the host facade (using
//! the manifest label when available), published as `tool/failed`, and then
//! re-raised wrapped as `Error::Handler` so outer callers still observe it.

use crate::bus::{CommandArgs, CommandBus, EventBus};
use crate::jobs::JobCenter;
use crate::observability;
use crate::registry::{EntryTable, ToolRegistry};
use crate::tools::{
    HostFacade, MemorySettings, MessageLevel, NullHost, Service, SettingsStore, StateStore,
    ToolContext,
};
use crate::types::{Config, Error, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Command name the session registers for tool dispatch.
pub const CMD_TOOL_EXECUTE: &str = "tool.execute";
/// Topic published after a dispatched tool succeeds.
pub const TOPIC_TOOL_DONE: &str = "tool/done";
/// Topic published after a dispatched tool fails.
pub const TOPIC_TOOL_FAILED: &str = "tool/failed";

/// Host-owned root window surface.
///
/// The session keeps exactly one live view per session and re-shows it on
/// request instead of re-creating it.
pub trait MainView: Send + fmt::Debug {
    fn show(&mut self);
    fn raise_window(&mut self);
    fn is_visible(&self) -> bool;
}

/// Builder assembling the collaborators a session needs.
#[derive(Debug)]
pub struct SessionBuilder {
    config: Config,
    host: Arc<dyn HostFacade>,
    settings: Arc<dyn SettingsStore>,
    services: HashMap<String, Arc<dyn Service>>,
    entries: EntryTable,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            host: Arc::new(NullHost),
            settings: Arc::new(MemorySettings::new()),
            services: HashMap::new(),
            entries: EntryTable::new(),
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn host(mut self, host: Arc<dyn HostFacade>) -> Self {
        self.host = host;
        self
    }

    pub fn settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = settings;
        self
    }

    pub fn service(mut self, name: impl Into<String>, service: Arc<dyn Service>) -> Self {
        self.services.insert(name.into(), service);
        self
    }

    pub fn entries(mut self, entries: EntryTable) -> Self {
        self.entries = entries;
        self
    }

    /// Wire everything together: buses, job center, registry discovery, the
    /// shared context, and the `tool.execute` command.
    pub fn build(self) -> Session {
        observability::init_tracing(&self.config.observability);
        tracing::info!("starting tool runtime session");

        let events = Arc::new(EventBus::new());
        let commands = Arc::new(CommandBus::new());
        let jobs = Arc::new(JobCenter::new(
            Some(Arc::clone(&events)),
            self.config.jobs.clone(),
        ));
        let registry = Arc::new(ToolRegistry::discover(
            self.config.plugins.root.clone(),
            self.entries,
        ));
        tracing::info!(tools = registry.list_tools().len(), "registry ready");

        let context = ToolContext {
            host: self.host,
            settings: self.settings,
            state: Arc::new(StateStore::new()),
            commands: Arc::clone(&commands),
            events: Arc::clone(&events),
            jobs: Some(jobs),
            services: self.services,
        };

        register_tool_execute(&commands, Arc::clone(&registry), context.clone());

        Session {
            registry,
            context,
            main_view: Mutex::new(None),
        }
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running tool-runtime session.
#[derive(Debug)]
pub struct Session {
    registry: Arc<ToolRegistry>,
    context: ToolContext,
    main_view: Mutex<Option<Box<dyn MainView>>>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// The shared context handed to every tool instantiation.
    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Dispatch a command through the session's command bus.
    pub fn dispatch(&self, name: &str, args: CommandArgs) -> Result<Value> {
        self.context.commands.dispatch(name, args)
    }

    /// Show the session's root view, creating it on first call only.
    ///
    /// A visible view is raised; a hidden one is re-shown and raised. The
    /// session owns the handle, so repeated invocations never spawn a second
    /// window.
    pub fn show_or_create<F>(&self, create: F)
    where
        F: FnOnce(&ToolContext, &Arc<ToolRegistry>) -> Box<dyn MainView>,
    {
        let mut slot = self
            .main_view
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match slot.as_mut() {
            Some(view) => {
                if !view.is_visible() {
                    tracing::debug!("main view hidden, re-showing");
                    view.show();
                }
                view.raise_window();
            }
            None => {
                tracing::debug!("creating main view");
                let mut view = create(&self.context, &self.registry);
                view.show();
                view.raise_window();
                *slot = Some(view);
            }
        }
    }
}

/// Register the `tool.execute` fault boundary on the command bus.
fn register_tool_execute(commands: &CommandBus, registry: Arc<ToolRegistry>, ctx: ToolContext) {
    commands.register(CMD_TOOL_EXECUTE, move |args| {
        // A missing key is a caller bug, not a tool failure; it propagates
        // without the tool/failed ceremony.
        let key = args
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::validation("tool.execute requires a string 'key' argument"))?
            .to_string();

        let mut kwargs = args.clone();
        kwargs.remove("key");

        tracing::info!(key, "executing tool");
        let outcome = registry
            .instantiate(&key, &ctx)
            .and_then(|(mut instance, _manifest)| instance.execute(&kwargs));

        match outcome {
            Ok(result) => {
                ctx.events.publish(
                    TOPIC_TOOL_DONE,
                    json!({
                        "key": key.as_str(),
                        "result": result.clone(),
                        "kwargs": Value::Object(kwargs),
                    }),
                );
                tracing::debug!(key, "tool completed");
                Ok(result)
            }
            Err(err) => {
                tracing::error!(key, error = %err, "tool execution failed");

                let label = registry
                    .get_manifest(&key)
                    .map(|manifest| manifest.display_label().to_string())
                    .unwrap_or_else(|| key.clone());
                ctx.host
                    .show_message(&format!("Error in {label}: {err}"), MessageLevel::Error);

                ctx.events.publish(
                    TOPIC_TOOL_FAILED,
                    json!({
                        "key": key.as_str(),
                        "error": err.to_string(),
                        "errorType": err.kind(),
                        "kwargs": Value::Object(kwargs),
                    }),
                );

                // Re-raise so outer callers observe the failure too.
                Err(Error::handler(key, err))
            }
        }
    });
}

// =============================================================================
// Tests
// =============================================================================
