use std::time::Duration;
use thiserror::Error;

use crate::models::{ContactId, FlowId, SceneId};

/// Unified error type for the commit pipeline and the flow-start worker
#[derive(Debug, Error)]
pub enum CourierError {
    // Event dispatch errors
    #[error("No handler registered for event type: {event_type}")]
    UnknownEventType { event_type: String },

    #[error("Unable to find {kind} with UUID: {reference}")]
    UnresolvedReference { kind: &'static str, reference: String },

    #[error("Cannot add label, not in a session (scene: {scene})")]
    NotInSession { scene: SceneId },

    #[error("Cannot add label, no incoming message for scene: {scene}")]
    NoIncomingMessage { scene: SceneId },

    #[error("Scene not found: {scene}")]
    SceneNotFound { scene: SceneId },

    // Hook errors
    #[error("Hook {hook} received an unexpected change: {found}")]
    HookMismatch { hook: &'static str, found: &'static str },

    #[error("No pre-commit hook registered: {hook}")]
    HookNotRegistered { hook: &'static str },

    // Task and batch errors
    #[error("Unknown task type passed to ivr worker: {task_type}")]
    UnknownTaskType { task_type: String },

    #[error("Error unmarshalling flow start batch: {payload}")]
    MalformedBatch {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Contact not found: {contact_id}")]
    ContactNotFound { contact_id: ContactId },

    /// Raised by call channels for a single contact that could not be called
    #[error("Error starting ivr flow for contact: {contact_id} and flow: {flow_id}: {message}")]
    CallStart {
        contact_id: ContactId,
        flow_id: FlowId,
        message: String,
    },

    #[error("Operation timed out: {operation} (timeout: {timeout:?})")]
    Timeout { operation: String, timeout: Duration },

    #[error("Operation was cancelled: {operation}")]
    Cancelled { operation: String },

    // Storage errors
    #[error("Storage operation failed: {operation}")]
    Storage {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // Queue errors
    #[error("Task queue closed")]
    QueueClosed,

    #[error("Task queue full: capacity {capacity} reached")]
    QueueFull { capacity: usize },

    // Configuration errors
    #[error("Configuration invalid: {0}")]
    Configuration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CourierError {
    /// Wrap a storage failure with the operation that produced it
    pub fn storage<E>(operation: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Storage {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether a call-start failure only skips its contact.
    ///
    /// Cancellation and timeouts mean the batch missed its deadline and
    /// abort the whole batch; any other failure is logged and skipped.
    pub fn is_recoverable_call_failure(&self) -> bool {
        !matches!(self, Self::Cancelled { .. } | Self::Timeout { .. })
    }
}

/// Result type alias for CourierError
pub type Result<T> = std::result::Result<T, CourierError>;

/// Extension trait for attaching operation context to storage results
pub trait ResultExt<T> {
    /// Wrap the error as a storage failure for `operation`
    fn context(self, operation: impl Into<String>) -> Result<T>;

    /// Like [`ResultExt::context`] but builds the message lazily
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| CourierError::storage(operation, e))
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CourierError::storage(f(), e))
    }
}
