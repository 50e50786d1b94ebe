//! Manifest records - declarative per-tool metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Declarative descriptor for one tool, parsed from `manifest.json`.
///
/// Unknown fields are preserved in `extra`, never rejected; they belong to
/// the tool's own packaging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Globally unique stable identifier, e.g. `"poly.smooth_normals"`.
    #[serde(default)]
    pub key: String,

    /// Display name for user-facing messages.
    #[serde(default)]
    pub label: String,

    /// Grouping tag, normally matching the category directory.
    #[serde(default)]
    pub category: String,

    /// Entry locator in `"module:Symbol"` form, required for instantiation.
    #[serde(default)]
    pub entry: Option<String>,

    /// UI configuration block.
    #[serde(default)]
    pub ui: UiOptions,

    /// Unrecognized manifest fields, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Tool directory this manifest was read from. Stamped during discovery,
    /// never serialized.
    #[serde(skip)]
    pub dir: PathBuf,
}

impl Manifest {
    /// Label for user-facing messages, falling back to the key when the
    /// manifest declares none.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }
}

/// Recognized UI options. Unknown options ride along in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiOptions {
    /// Whether the tool exposes an embeddable control surface.
    #[serde(default)]
    pub panel: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One recorded discovery problem (unreadable or malformed manifest).
///
/// Diagnostics never abort discovery; they exist so a host can surface what
/// was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Path of the offending manifest file.
    pub path: PathBuf,
    /// Human-readable description of the problem.
    pub message: String,
    /// When the problem was recorded.
    pub at: DateTime<Utc>,
}

impl Diagnostic {
    pub(crate) fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_manifest() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "key": "poly.smooth_normals",
                "label": "Smooth Normals",
                "category": "poly",
                "entry": "demo.poly:SmoothTool",
                "ui": {"panel": true}
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.key, "poly.smooth_normals");
        assert_eq!(manifest.label, "Smooth Normals");
        assert_eq!(manifest.category, "poly");
        assert_eq!(manifest.entry.as_deref(), Some("demo.poly:SmoothTool"));
        assert!(manifest.ui.panel);
        assert_eq!(manifest.display_label(), "Smooth Normals");
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let manifest: Manifest = serde_json::from_str(
            r#"{"key": "k", "vendor": "acme", "ui": {"panel": false, "icon": "star.png"}}"#,
        )
        .unwrap();

        assert_eq!(manifest.extra.get("vendor"), Some(&serde_json::json!("acme")));
        assert_eq!(manifest.ui.extra.get("icon"), Some(&serde_json::json!("star.png")));
    }

    #[test]
    fn missing_fields_default() {
        let manifest: Manifest = serde_json::from_str(r#"{"key": "k"}"#).unwrap();
        assert_eq!(manifest.label, "");
        assert_eq!(manifest.entry, None);
        assert!(!manifest.ui.panel);
        // Label falls back to the key
        assert_eq!(manifest.display_label(), "k");
    }
}
