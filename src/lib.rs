//! # rust_kvlog
//!
//! Structured, leveled key/value logging.
//!
//! ## Features
//!
//! - **Key/value records**: every call carries ordered pairs of typed values
//! - **Text and JSON output**: `key=value` lines with quoting, escaping and
//!   indented multi-line values, or one JSON object per line
//! - **Caller reporting**: file and line of the call site, skipping frames
//!   marked as helpers
//! - **Derived loggers**: bind context pairs or a prefix once, inherit them
//!   in every record
//! - **History and publishing**: keep recent records in memory or forward
//!   them to a [`Publisher`]
//!
//! ```
//! use rust_kvlog::prelude::*;
//!
//! let logger = Logger::builder()
//!     .report_caller(true)
//!     .output(std::io::stdout())
//!     .build();
//!
//! logger.info("started", kv!["port", 8080]);
//! ```

pub mod core;
pub mod formatters;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        ChannelPublisher, HistoryBuffer, LogLevel, Logger, LoggerBuilder, LoggerError,
        LoggerMetrics, LoggerOptions, OutputFormat, Publisher, Result, Subscription,
        TimestampFormat, Value,
    };
    pub use crate::kv;
}

pub use self::core::{
    BacktraceResolver, CallerResolver, ChannelPublisher, Frame, HistoryBuffer, LogLevel, Logger,
    LoggerBuilder, LoggerError, LoggerMetrics, LoggerOptions, OutputFormat, PublishedRecord,
    Publisher, Result, Subscription, TimestampFormat, Value,
};
