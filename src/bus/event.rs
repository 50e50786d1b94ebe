//! EventBus - topic-keyed publish/subscribe fan-out.
//!
//! Publishers and subscribers are decoupled by topic name. Delivery is
//! synchronous on the publisher's thread, in subscription order for a topic.
//! Payloads are opaque `serde_json::Value`s; the schema is a convention
//! between publisher and subscriber, never enforced here.
//!
//! Subscriber failures are isolated: a failing callback is logged with its
//! topic and does not stop later callbacks, nor does it surface to the
//! publisher. There is no wildcarding and no unsubscription; subscription is
//! expected during single-threaded setup (callbacks must not subscribe).

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Subscriber callback. Errors are logged and swallowed by `publish`.
pub type EventCallback = Box<dyn Fn(&Value) -> crate::types::Result<()> + Send + Sync>;

/// Publish/subscribe event bus for component communication.
pub struct EventBus {
    /// topic -> callbacks in subscription order
    subscribers: RwLock<HashMap<String, Vec<EventCallback>>>,
}

impl EventBus {
    /// Create a new EventBus with no subscriptions.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe a callback to a topic.
    ///
    /// Multiple callbacks per topic are preserved in subscription order and
    /// are never deduplicated.
    pub fn subscribe<F>(&self, topic: impl Into<String>, callback: F)
    where
        F: Fn(&Value) -> crate::types::Result<()> + Send + Sync + 'static,
    {
        let topic = topic.into();
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers
            .entry(topic.clone())
            .or_default()
            .push(Box::new(callback));
        tracing::debug!(topic, "subscriber registered");
    }

    /// Publish a payload to all subscribers of a topic.
    ///
    /// No subscribers is a no-op, not an error. Returns the number of
    /// callbacks invoked (successfully or not).
    pub fn publish(&self, topic: &str, payload: Value) -> usize {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(callbacks) = subscribers.get(topic) else {
            tracing::trace!(topic, "publish with no subscribers");
            return 0;
        };

        for callback in callbacks {
            if let Err(err) = callback(&payload) {
                // Isolated: log and keep delivering to the rest.
                tracing::error!(topic, error = %err, "subscriber callback failed");
            }
        }

        tracing::debug!(topic, delivered = callbacks.len(), "published event");
        callbacks.len()
    }

    /// Number of subscribers currently registered for a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("EventBus")
            .field("topics", &subscribers.len())
            .finish()
    }
}
