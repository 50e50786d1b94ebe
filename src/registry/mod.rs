//! ToolRegistry - manifest discovery and on-demand instantiation.
//!
//! Discovery runs exactly once, at construction, over a two-level directory
//! layout (`root/<category>/<tool>/manifest.json`). Bad manifests are skipped
//! with a recorded diagnostic, never fatal. After the single discovery pass
//! the registry is read-only and may be shared freely across threads.

pub mod loader;
pub mod manifest;

pub use loader::{EntryTable, ToolFactory};
pub use manifest::{Diagnostic, Manifest, UiOptions};

use crate::tools::{ToolContext, ToolInstance};
use crate::types::{Error, Result, ToolKey};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the per-tool manifest file inside each tool directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Registry of discovered tools.
#[derive(Debug)]
pub struct ToolRegistry {
    root: PathBuf,
    manifests: HashMap<ToolKey, Manifest>,
    entries: EntryTable,
    diagnostics: Vec<Diagnostic>,
}

impl ToolRegistry {
    /// Scan `root` for manifests and build the registry.
    ///
    /// Never fails: a missing root yields an empty registry with a warning,
    /// and each unreadable or malformed manifest only adds a diagnostic.
    pub fn discover(root: impl Into<PathBuf>, entries: EntryTable) -> Self {
        let root = root.into();
        let mut registry = Self {
            root,
            manifests: HashMap::new(),
            entries,
            diagnostics: Vec::new(),
        };
        registry.scan();
        registry
    }

    fn scan(&mut self) {
        if !self.root.is_dir() {
            tracing::warn!(root = %self.root.display(), "plugins root does not exist");
            return;
        }
        tracing::debug!(root = %self.root.display(), "scanning for tools");

        for category_dir in subdirectories(&self.root) {
            for tool_dir in subdirectories(&category_dir) {
                let manifest_path = tool_dir.join(MANIFEST_FILE);
                if manifest_path.is_file() {
                    self.load_manifest(&manifest_path, &tool_dir);
                }
            }
        }

        tracing::info!(
            count = self.manifests.len(),
            skipped = self.diagnostics.len(),
            "tool discovery completed"
        );
    }

    fn load_manifest(&mut self, path: &Path, dir: &Path) {
        let mut manifest: Manifest = match std::fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|text| serde_json::from_str(&text).map_err(Error::from))
        {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "skipping unreadable manifest");
                self.diagnostics.push(Diagnostic::new(path, err.to_string()));
                return;
            }
        };

        // Keyless manifests are silently skipped, not diagnosed: the layout
        // contract allows placeholder folders.
        let Ok(key) = ToolKey::new(manifest.key.clone()) else {
            tracing::debug!(path = %path.display(), "manifest has no key, skipping");
            return;
        };

        manifest.dir = dir.to_path_buf();
        // Documented last-write-wins: a later-scanned duplicate replaces the
        // earlier manifest, but loudly.
        if let Some(previous) = self.manifests.insert(key.clone(), manifest) {
            tracing::warn!(
                key = %key,
                replaced = %previous.dir.display(),
                "duplicate tool key, later manifest wins"
            );
            self.diagnostics.push(Diagnostic::new(
                path,
                format!("duplicate key '{key}' overwrote {}", previous.dir.display()),
            ));
        } else {
            tracing::debug!(key = %key, path = %path.display(), "discovered tool");
        }
    }

    /// Keys of all discovered tools, sorted for stable iteration.
    pub fn list_tools(&self) -> Vec<ToolKey> {
        let mut keys: Vec<ToolKey> = self.manifests.keys().cloned().collect();
        keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        keys
    }

    /// Manifest for a tool key, if discovered.
    pub fn get_manifest(&self, key: &str) -> Option<&Manifest> {
        self.manifests.get(key)
    }

    /// Problems recorded during the discovery pass.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Construct a fresh tool instance for `key`.
    ///
    /// Every call builds a new instance; nothing is pooled or cached. The
    /// returned instance is stamped with its originating key so UI callbacks
    /// can self-report identity back into command dispatch.
    pub fn instantiate(&self, key: &str, context: &ToolContext) -> Result<(ToolInstance, Manifest)> {
        let manifest = self
            .manifests
            .get(key)
            .ok_or_else(|| Error::not_found(format!("tool '{key}' is not in the registry")))?;

        let entry = manifest
            .entry
            .as_deref()
            .ok_or_else(|| Error::invalid_manifest(format!("tool '{key}' has no 'entry' field")))?;

        let factory = self.entries.resolve(entry)?;
        let tool = factory(context)
            .map_err(|err| Error::instantiation(format!("tool '{key}': {err}")))?;

        // Keys in the map are non-empty by construction.
        let stamped = ToolKey::new(key)
            .map_err(|err| Error::instantiation(format!("tool '{key}': {err}")))?;
        tracing::debug!(key, "instantiated tool");
        Ok((ToolInstance::new(stamped, tool), manifest.clone()))
    }
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    // Deterministic scan order so duplicate-key resolution is reproducible.
    dirs.sort();
    dirs
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{CommandArgs, CommandBus, EventBus};
    use crate::tools::{
        MemorySettings, NullHost, StateStore, Tool, UiHandle,
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct CountingTool;

    impl Tool for CountingTool {
        fn create_ui(&mut self, _parent: Option<UiHandle>) -> Option<UiHandle> {
            None
        }

        fn execute(&mut self, _args: &CommandArgs) -> Result<Value> {
            Ok(json!("executed"))
        }
    }

    fn test_context() -> ToolContext {
        ToolContext {
            host: Arc::new(NullHost),
            settings: Arc::new(MemorySettings::new()),
            state: Arc::new(StateStore::new()),
            commands: Arc::new(CommandBus::new()),
            events: Arc::new(EventBus::new()),
            jobs: None,
            services: std::collections::HashMap::new(),
        }
    }

    fn write_manifest(root: &Path, category: &str, tool: &str, body: &str) {
        let dir = root.join(category).join(tool);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(MANIFEST_FILE), body).unwrap();
    }

    fn entries_with_counter() -> (EntryTable, Arc<AtomicUsize>) {
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&constructed);
        let mut entries = EntryTable::new();
        entries.register("demo.poly", "SmoothTool", move |_ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingTool))
        });
        (entries, constructed)
    }

    #[test]
    fn discovers_manifests_across_categories() {
        let root = TempDir::new().unwrap();
        write_manifest(
            root.path(),
            "poly",
            "smooth_normals",
            r#"{"key": "poly.smooth_normals", "label": "Smooth Normals", "entry": "demo.poly:SmoothTool"}"#,
        );
        write_manifest(
            root.path(),
            "anim",
            "retime",
            r#"{"key": "anim.retime", "entry": "demo.anim:RetimeTool"}"#,
        );

        let registry = ToolRegistry::discover(root.path(), EntryTable::new());
        let keys: Vec<String> = registry
            .list_tools()
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();
        assert_eq!(keys, vec!["anim.retime", "poly.smooth_normals"]);
        assert!(registry.diagnostics().is_empty());

        let manifest = registry.get_manifest("poly.smooth_normals").unwrap();
        assert_eq!(manifest.display_label(), "Smooth Normals");
        assert!(manifest.dir.ends_with("poly/smooth_normals"));
    }

    #[test]
    fn malformed_manifest_is_skipped_with_diagnostic() {
        let root = TempDir::new().unwrap();
        write_manifest(root.path(), "poly", "good", r#"{"key": "poly.good"}"#);
        write_manifest(root.path(), "poly", "broken", "{not valid json");

        let registry = ToolRegistry::discover(root.path(), EntryTable::new());
        assert_eq!(registry.list_tools().len(), 1);
        assert_eq!(registry.diagnostics().len(), 1);
        assert!(registry.diagnostics()[0]
            .path
            .ends_with("poly/broken/manifest.json"));
    }

    #[test]
    fn keyless_manifest_is_silently_excluded() {
        let root = TempDir::new().unwrap();
        write_manifest(root.path(), "poly", "anon", r#"{"label": "No Key Here"}"#);

        let registry = ToolRegistry::discover(root.path(), EntryTable::new());
        assert!(registry.list_tools().is_empty());
        assert!(registry.diagnostics().is_empty());
    }

    #[test]
    fn duplicate_key_is_last_write_wins() {
        let root = TempDir::new().unwrap();
        // Scan order is sorted: "a_first" before "b_second".
        write_manifest(
            root.path(),
            "poly",
            "a_first",
            r#"{"key": "poly.dup", "label": "First"}"#,
        );
        write_manifest(
            root.path(),
            "poly",
            "b_second",
            r#"{"key": "poly.dup", "label": "Second"}"#,
        );

        let registry = ToolRegistry::discover(root.path(), EntryTable::new());
        assert_eq!(registry.list_tools().len(), 1);
        assert_eq!(registry.get_manifest("poly.dup").unwrap().label, "Second");
        // Overwrite is observable, not silent
        assert_eq!(registry.diagnostics().len(), 1);
    }

    #[test]
    fn missing_root_yields_empty_registry() {
        let registry =
            ToolRegistry::discover("/definitely/not/a/real/path", EntryTable::new());
        assert!(registry.list_tools().is_empty());
    }

    #[test]
    fn files_at_category_level_are_ignored() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("stray.txt"), "not a category").unwrap();
        write_manifest(root.path(), "poly", "t", r#"{"key": "poly.t"}"#);
        std::fs::write(root.path().join("poly").join("notes.md"), "notes").unwrap();

        let registry = ToolRegistry::discover(root.path(), EntryTable::new());
        assert_eq!(registry.list_tools().len(), 1);
    }

    #[test]
    fn instantiate_unknown_key_is_not_found() {
        let registry = ToolRegistry::discover(TempDir::new().unwrap().path(), EntryTable::new());
        let err = registry
            .instantiate("ghost.tool", &test_context())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn instantiate_without_entry_is_invalid_manifest() {
        let root = TempDir::new().unwrap();
        write_manifest(root.path(), "poly", "t", r#"{"key": "poly.t"}"#);

        let registry = ToolRegistry::discover(root.path(), EntryTable::new());
        let err = registry.instantiate("poly.t", &test_context()).unwrap_err();
        assert!(matches!(err, Error::InvalidManifest(_)));
    }

    #[test]
    fn instantiate_with_malformed_entry_is_invalid_manifest() {
        let root = TempDir::new().unwrap();
        write_manifest(
            root.path(),
            "poly",
            "t",
            r#"{"key": "poly.t", "entry": "bad_format"}"#,
        );

        let registry = ToolRegistry::discover(root.path(), EntryTable::new());
        let err = registry.instantiate("poly.t", &test_context()).unwrap_err();
        assert!(matches!(err, Error::InvalidManifest(_)));
    }

    #[test]
    fn instantiate_with_unresolvable_entry_is_load_error() {
        let root = TempDir::new().unwrap();
        write_manifest(
            root.path(),
            "poly",
            "t",
            r#"{"key": "poly.t", "entry": "no.such.module:Tool"}"#,
        );

        let registry = ToolRegistry::discover(root.path(), EntryTable::new());
        let err = registry.instantiate("poly.t", &test_context()).unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }

    #[test]
    fn failing_factory_is_instantiation_error() {
        let root = TempDir::new().unwrap();
        write_manifest(
            root.path(),
            "poly",
            "t",
            r#"{"key": "poly.t", "entry": "demo.poly:Fragile"}"#,
        );

        let mut entries = EntryTable::new();
        entries.register("demo.poly", "Fragile", |_| {
            Err(Error::tool("constructor refused"))
        });
        let registry = ToolRegistry::discover(root.path(), entries);
        let err = registry.instantiate("poly.t", &test_context()).unwrap_err();
        assert!(matches!(err, Error::Instantiation(_)));
        assert!(err.to_string().contains("constructor refused"));
    }

    #[test]
    fn instantiate_builds_a_fresh_stamped_instance_each_call() {
        let root = TempDir::new().unwrap();
        write_manifest(
            root.path(),
            "poly",
            "smooth_normals",
            r#"{"key": "poly.smooth_normals", "entry": "demo.poly:SmoothTool"}"#,
        );

        let (entries, constructed) = entries_with_counter();
        let registry = ToolRegistry::discover(root.path(), entries);
        let ctx = test_context();

        let (mut instance, manifest) = registry.instantiate("poly.smooth_normals", &ctx).unwrap();
        assert_eq!(instance.key().as_str(), "poly.smooth_normals");
        assert_eq!(manifest.key, "poly.smooth_normals");
        assert_eq!(instance.execute(&CommandArgs::new()).unwrap(), json!("executed"));

        let _ = registry.instantiate("poly.smooth_normals", &ctx).unwrap();
        assert_eq!(constructed.load(Ordering::SeqCst), 2);
    }
}
