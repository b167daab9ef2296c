//! Core logger types and traits

pub mod caller;
pub mod error;
pub mod history;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod options;
pub mod output_format;
pub mod publish;
pub mod record;
pub mod timestamp;
pub mod value;

pub use caller::{
    default_caller_formatter, long_caller_formatter, short_caller_formatter, trim_caller_path,
    BacktraceResolver, CallerFormatter, CallerResolver, Frame, HelperRegistry,
};
pub use error::{LoggerError, Result};
pub use history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, Sink, ERROR_KEY};
pub use metrics::LoggerMetrics;
pub use options::LoggerOptions;
pub use output_format::{OutputFormat, RenderOptions};
pub use publish::{payload, ChannelPublisher, PublishHook, PublishedRecord, Publisher, Subscription};
pub use timestamp::{fixed_time, system_time, TimeFunction, TimestampFormat, DEFAULT_TIME_FORMAT};
pub use value::{Value, MISSING_VALUE};
