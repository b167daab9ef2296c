//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Publish hook rejected a record
    #[error("Publish to topic '{topic}' failed: {message}")]
    PublishError { topic: String, message: String },

    /// Subscriber side of a channel publisher went away
    #[error("Subscriber disconnected from topic '{topic}'")]
    SubscriberDisconnected { topic: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a publish error for a topic
    pub fn publish(topic: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::PublishError {
            topic: topic.into(),
            message: message.into(),
        }
    }

    pub fn subscriber_disconnected(topic: impl Into<String>) -> Self {
        LoggerError::SubscriberDisconnected {
            topic: topic.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
