//! Output format selection
//!
//! - Text: Human-readable format (default)
//! - Json: Machine-readable JSON Lines

use super::error::{LoggerError, Result};
use super::timestamp::TimestampFormat;
use super::value::Value;
use crate::formatters::{render_json, render_text};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format for log records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format (default)
    ///
    /// Example: `INFO [src/main.rs:7] started port=8080`
    #[default]
    Text,

    /// JSON format for machine processing
    ///
    /// Example: `{"caller":"src/main.rs:7","level":"info","message":"started","port":8080}`
    Json,
}

/// Settings a renderer needs besides the record itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub time_format: &'a TimestampFormat,
    /// Style text output with ANSI colors. Ignored for JSON.
    pub colored: bool,
}

impl OutputFormat {
    /// Append one rendered record, including its trailing newline, to `buf`.
    pub fn render(&self, kvs: &[Value], options: &RenderOptions<'_>, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            OutputFormat::Text => {
                render_text(kvs, options.time_format, options.colored, buf);
                Ok(())
            }
            OutputFormat::Json => render_json(kvs, options.time_format, buf),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(LoggerError::config(
                "output_format",
                format!("unknown format '{}'", other),
            )),
        }
    }
}
