//! Declarative logger configuration
//!
//! [`LoggerOptions`] covers every setting that can be expressed as plain
//! data, so a logger can be configured from a JSON document. Settings that
//! take code (time source, caller formatter, sink, publisher) stay on
//! [`LoggerBuilder`](super::LoggerBuilder).

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::output_format::OutputFormat;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Plain-data logger settings. Missing fields take their defaults.
///
/// # Example
///
/// ```
/// use rust_kvlog::core::{LoggerOptions, LogLevel, OutputFormat};
///
/// let options = LoggerOptions::from_json(r#"{"level": "debug", "formatter": "json"}"#).unwrap();
/// assert_eq!(options.level, LogLevel::Debug);
/// assert_eq!(options.formatter, OutputFormat::Json);
/// assert!(!options.report_caller);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    pub level: LogLevel,
    pub report_timestamp: bool,
    pub report_caller: bool,
    pub prefix: String,
    pub time_format: TimestampFormat,
    pub formatter: OutputFormat,
    /// Extra stack frames to skip when resolving the caller.
    pub caller_offset: usize,
    /// Keep the last N rendered records in memory. `None` disables history.
    pub history_capacity: Option<usize>,
    pub colored: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            report_timestamp: false,
            report_caller: false,
            prefix: String::new(),
            time_format: TimestampFormat::Standard,
            formatter: OutputFormat::Text,
            caller_offset: 0,
            history_capacity: None,
            colored: false,
        }
    }
}

impl LoggerOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: LoggerOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject combinations that cannot be honored.
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(format) = &self.time_format {
            if format.is_empty() {
                return Err(LoggerError::config(
                    "time_format",
                    "custom time format must not be empty",
                ));
            }
        }
        if self.formatter == OutputFormat::Json && self.colored {
            eprintln!("[LOGGER WARNING] colored output has no effect on the JSON formatter");
        }
        Ok(())
    }
}
