//! Record assembly
//!
//! A record is never stored as a struct: each call builds a flat, ordered
//! `Vec<Value>` of key/value pairs which a formatter then consumes.

use super::caller::{CallerFormatter, Frame};
use super::log_level::LogLevel;
use super::timestamp::is_zero;
use super::value::Value;
use chrono::{DateTime, Utc};

pub const LEVEL_KEY: &str = "level";
pub const CALLER_KEY: &str = "caller";
pub const PREFIX_KEY: &str = "prefix";
pub const MESSAGE_KEY: &str = "message";
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Logger-side inputs to [`assemble`].
pub struct RecordContext<'a> {
    pub report_caller: bool,
    pub report_timestamp: bool,
    pub prefix: &'a str,
    /// Bound context, oldest first.
    pub fields: &'a [Value],
    pub caller_formatter: &'a CallerFormatter,
}

/// Builds the ordered pair list for one call.
///
/// Order: level, caller, prefix, message, bound fields, call-site pairs,
/// timestamp. Each of the two pair lists is padded with
/// [`Value::Missing`] independently when its length is odd.
pub fn assemble(
    ctx: &RecordContext<'_>,
    level: LogLevel,
    timestamp: DateTime<Utc>,
    caller: Option<&Frame>,
    message: &Value,
    keyvals: Vec<Value>,
) -> Vec<Value> {
    let mut kvs = Vec::with_capacity(10 + ctx.fields.len() + keyvals.len() + 2);

    if level != LogLevel::None {
        kvs.push(Value::from(LEVEL_KEY));
        kvs.push(Value::Level(level));
    }

    if ctx.report_caller {
        if let Some(frame) = caller.filter(|f| f.is_reportable()) {
            let rendered = (ctx.caller_formatter)(&frame.file, frame.line, &frame.function);
            kvs.push(Value::from(CALLER_KEY));
            kvs.push(Value::String(rendered));
        }
    }

    if !ctx.prefix.is_empty() {
        kvs.push(Value::from(PREFIX_KEY));
        kvs.push(Value::from(ctx.prefix));
    }

    if !message.is_null() {
        let text = message.to_string();
        if !text.is_empty() {
            kvs.push(Value::from(MESSAGE_KEY));
            kvs.push(Value::String(text));
        }
    }

    append_padded(&mut kvs, ctx.fields.iter().cloned());
    append_padded(&mut kvs, keyvals);

    if ctx.report_timestamp && !is_zero(&timestamp) {
        kvs.push(Value::from(TIMESTAMP_KEY));
        kvs.push(Value::Time(timestamp));
    }

    kvs
}

fn append_padded(kvs: &mut Vec<Value>, pairs: impl IntoIterator<Item = Value>) {
    let before = kvs.len();
    kvs.extend(pairs);
    if (kvs.len() - before) % 2 != 0 {
        kvs.push(Value::Missing);
    }
}

static MISSING: Value = Value::Missing;

/// Walks `kvs` two at a time. A trailing key with no value pairs with
/// [`Value::Missing`].
pub fn pairs(kvs: &[Value]) -> impl Iterator<Item = (&Value, &Value)> {
    kvs.chunks(2).filter_map(|pair| {
        let (key, rest) = pair.split_first()?;
        Some((key, rest.first().unwrap_or(&MISSING)))
    })
}

/// The reserved key a pair's key names, if any.
pub fn reserved_key(key: &Value) -> Option<&'static str> {
    match key.as_str()? {
        LEVEL_KEY => Some(LEVEL_KEY),
        CALLER_KEY => Some(CALLER_KEY),
        PREFIX_KEY => Some(PREFIX_KEY),
        MESSAGE_KEY => Some(MESSAGE_KEY),
        TIMESTAMP_KEY => Some(TIMESTAMP_KEY),
        _ => None,
    }
}
