//! Core types for the tool runtime.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (ToolKey, JobId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for discovery, jobs, observability

mod config;
mod errors;
mod ids;

pub use config::{Config, JobConfig, ObservabilityConfig, PluginConfig};
pub use errors::{Error, Result};
pub use ids::{JobId, ToolKey};
