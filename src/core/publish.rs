//! Publish hook
//!
//! A [`Publisher`] receives a flattened, unstyled copy of every rendered
//! record as `{"log": <line>}` on a configured topic. Delivery is best
//! effort: the logger counts failures and otherwise ignores them.

use super::error::{LoggerError, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;

/// Payload key carrying the flattened record.
pub const PAYLOAD_LOG_KEY: &str = "log";

/// External consumer of rendered records.
pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &str, payload: &Map<String, JsonValue>) -> Result<()>;
}

/// Builds the `{"log": line}` payload.
pub fn payload(line: &str) -> Map<String, JsonValue> {
    let mut map = Map::with_capacity(1);
    map.insert(
        PAYLOAD_LOG_KEY.to_string(),
        JsonValue::String(line.to_string()),
    );
    map
}

/// A publisher plus the topic records go to.
#[derive(Clone)]
pub struct PublishHook {
    pub publisher: Arc<dyn Publisher>,
    pub topic: String,
}

impl PublishHook {
    pub fn new(publisher: Arc<dyn Publisher>, topic: impl Into<String>) -> Self {
        Self {
            publisher,
            topic: topic.into(),
        }
    }

    pub fn send(&self, line: &str) -> Result<()> {
        self.publisher.publish(&self.topic, &payload(line))
    }
}

impl std::fmt::Debug for PublishHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishHook")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

/// A record as delivered to a [`Subscription`].
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedRecord {
    pub topic: String,
    pub payload: Map<String, JsonValue>,
}

impl PublishedRecord {
    /// The flattened line, if the payload carries one.
    pub fn log(&self) -> Option<&str> {
        self.payload.get(PAYLOAD_LOG_KEY).and_then(JsonValue::as_str)
    }
}

/// In-process publisher over a bounded channel.
///
/// `publish` never blocks: a full queue or a dropped subscriber is
/// reported as an error and the record is discarded.
///
/// # Example
///
/// ```
/// use rust_kvlog::core::{ChannelPublisher, Publisher, payload};
///
/// let (publisher, subscription) = ChannelPublisher::bounded(8);
/// publisher.publish("app", &payload("INFO started")).unwrap();
/// assert_eq!(subscription.try_recv().unwrap().log(), Some("INFO started"));
/// ```
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: Sender<PublishedRecord>,
}

impl ChannelPublisher {
    pub fn bounded(capacity: usize) -> (Self, Subscription) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender }, Subscription { receiver })
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, topic: &str, payload: &Map<String, JsonValue>) -> Result<()> {
        let record = PublishedRecord {
            topic: topic.to_string(),
            payload: payload.clone(),
        };
        match self.sender.try_send(record) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(LoggerError::publish(topic, "subscriber queue full")),
            Err(TrySendError::Disconnected(_)) => {
                Err(LoggerError::subscriber_disconnected(topic))
            }
        }
    }
}

/// Receiving side of a [`ChannelPublisher`].
#[derive(Debug, Clone)]
pub struct Subscription {
    receiver: Receiver<PublishedRecord>,
}

impl Subscription {
    pub fn try_recv(&self) -> Option<PublishedRecord> {
        self.receiver.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<PublishedRecord> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Everything queued right now.
    pub fn drain(&self) -> Vec<PublishedRecord> {
        self.receiver.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
