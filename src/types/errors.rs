//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. `kind()` yields the stable `errorType`
//! strings carried in `tool/failed` and `job/failed` event payloads.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the tool runtime.
#[derive(Error, Debug)]
pub enum Error {
    /// Command dispatch of a name nothing registered a handler for.
    #[error("command not registered: {0}")]
    NotRegistered(String),

    /// Registry lookup of an unknown tool key.
    #[error("not found: {0}")]
    NotFound(String),

    /// Manifest missing or malformed where instantiation needs it.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// Entry locator cannot be resolved against the entry table.
    #[error("load error: {0}")]
    Load(String),

    /// Tool factory failed while constructing the instance.
    #[error("instantiation failed: {0}")]
    Instantiation(String),

    /// A dispatched tool command failed; wraps the underlying error with the
    /// tool key for context without reinterpreting it.
    #[error("handler for '{key}' failed: {source}")]
    Handler {
        key: String,
        #[source]
        source: Box<Error>,
    },

    /// Failure raised by a tool's own `execute` (or a job closure).
    #[error("tool error: {0}")]
    Tool(String),

    /// Malformed arguments to a command or builder.
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable kind string published as `errorType` in failure events.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotRegistered(_) => "NotRegistered",
            Error::NotFound(_) => "NotFound",
            Error::InvalidManifest(_) => "InvalidManifest",
            Error::Load(_) => "LoadError",
            Error::Instantiation(_) => "InstantiationError",
            Error::Handler { .. } => "HandlerError",
            Error::Tool(_) => "ToolError",
            Error::Validation(_) => "ValidationError",
            Error::Serialization(_) => "SerializationError",
            Error::Io(_) => "IoError",
        }
    }
}

// Convenience constructors
impl Error {
    pub fn not_registered(msg: impl Into<String>) -> Self {
        Self::NotRegistered(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_manifest(msg: impl Into<String>) -> Self {
        Self::InvalidManifest(msg.into())
    }

    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    pub fn instantiation(msg: impl Into<String>) -> Self {
        Self::Instantiation(msg.into())
    }

    pub fn handler(key: impl Into<String>, source: Error) -> Self {
        Self::Handler {
            key: key.into(),
            source: Box::new(source),
        }
    }

    pub fn tool(msg: impl Into<String>) -> Self {
        Self::Tool(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
