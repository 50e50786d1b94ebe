//! Entry resolution - maps manifest locators to tool factories.
//!
//! Manifests reference their implementation with a `"module:Symbol"` locator.
//! Instead of reflective loading, each tool module registers its factories in
//! an [`EntryTable`] at startup; discovery stays manifest-driven while
//! construction stays a plain table lookup.

use crate::tools::{Tool, ToolContext};
use crate::types::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Factory constructing one tool implementation against a context.
pub type ToolFactory = Box<dyn Fn(&ToolContext) -> Result<Box<dyn Tool>> + Send + Sync>;

/// Startup-time registration table: module -> symbol -> factory.
#[derive(Default)]
pub struct EntryTable {
    modules: HashMap<String, HashMap<String, ToolFactory>>,
}

impl EntryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `module:symbol`. Later registrations of the
    /// same pair replace earlier ones.
    pub fn register<F>(&mut self, module: impl Into<String>, symbol: impl Into<String>, factory: F)
    where
        F: Fn(&ToolContext) -> Result<Box<dyn Tool>> + Send + Sync + 'static,
    {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(symbol.into(), Box::new(factory));
    }

    /// Resolve a manifest `entry` locator to its factory.
    ///
    /// Fails with `InvalidManifest` when the locator is not in two-part
    /// `"module:Symbol"` shape, and with `Load` when the module or symbol is
    /// not registered.
    pub fn resolve(&self, entry: &str) -> Result<&ToolFactory> {
        let (module, symbol) = entry.split_once(':').ok_or_else(|| {
            Error::invalid_manifest(format!(
                "entry must be in 'module:Symbol' form, got: {entry}"
            ))
        })?;
        if module.is_empty() || symbol.is_empty() {
            return Err(Error::invalid_manifest(format!(
                "entry must name both module and symbol, got: {entry}"
            )));
        }

        let symbols = self
            .modules
            .get(module)
            .ok_or_else(|| Error::load(format!("module '{module}' is not registered")))?;
        symbols
            .get(symbol)
            .ok_or_else(|| Error::load(format!("module '{module}' has no symbol '{symbol}'")))
    }
}

impl fmt::Debug for EntryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryTable")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::CommandArgs;
    use crate::tools::UiHandle;
    use serde_json::Value;

    #[derive(Debug)]
    struct NoopTool;

    impl Tool for NoopTool {
        fn create_ui(&mut self, _parent: Option<UiHandle>) -> Option<UiHandle> {
            None
        }

        fn execute(&mut self, _args: &CommandArgs) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    fn table() -> EntryTable {
        let mut table = EntryTable::new();
        table.register("demo.poly", "SmoothTool", |_| Ok(Box::new(NoopTool)));
        table
    }

    #[test]
    fn resolves_registered_entry() {
        assert!(table().resolve("demo.poly:SmoothTool").is_ok());
    }

    #[test]
    fn rejects_malformed_locator() {
        let err = table().resolve("bad_format").err().unwrap();
        assert!(matches!(err, Error::InvalidManifest(_)));

        let err = table().resolve(":SmoothTool").err().unwrap();
        assert!(matches!(err, Error::InvalidManifest(_)));
        let err = table().resolve("demo.poly:").err().unwrap();
        assert!(matches!(err, Error::InvalidManifest(_)));
    }

    #[test]
    fn unknown_module_and_symbol_are_load_errors() {
        let err = table().resolve("nope.module:SmoothTool").err().unwrap();
        assert!(matches!(err, Error::Load(_)));

        let err = table().resolve("demo.poly:NoSuchTool").err().unwrap();
        assert!(matches!(err, Error::Load(_)));
    }
}
