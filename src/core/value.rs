//! Heterogeneous values for key/value pairs
//!
//! Keys and values passed to a logging call are both [`Value`]s; a call's
//! pair list is a flat `Vec<Value>` alternating key, value, key, value.

use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use chrono::{DateTime, Utc};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Text of the sentinel that stands in for the value of an unpaired key.
pub const MISSING_VALUE: &str = "missing value";

/// A key or value in a log record.
///
/// `Error` and `Display` carry types that expose a string conversion;
/// renderers use that conversion instead of inspecting the type.
#[derive(Clone)]
pub enum Value {
    Null,
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Time(DateTime<Utc>),
    Level(LogLevel),
    Error(Arc<dyn StdError + Send + Sync>),
    Display(Arc<dyn fmt::Display + Send + Sync>),
    /// Appended after an unpaired trailing key.
    Missing,
}

impl Value {
    /// Wrap an error so it renders through its `Display` message.
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Value::Error(Arc::new(err))
    }

    /// Wrap any displayable object.
    pub fn display<D>(value: D) -> Self
    where
        D: fmt::Display + Send + Sync + 'static,
    {
        Value::Display(Arc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string, if this is a plain string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of the value. Times use `time_format`, everything else its
    /// `Display` output.
    pub fn to_text(&self, time_format: &TimestampFormat) -> String {
        match self {
            Value::Time(t) => time_format.format(t),
            other => other.to_string(),
        }
    }

    /// Convert to serde_json::Value for JSON serialization
    ///
    /// Error and displayable values encode as their string form; times use
    /// `time_format`.
    #[must_use]
    pub fn to_json_value(&self, time_format: &TimestampFormat) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Uint(u) => serde_json::Value::Number((*u).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Time(t) => time_format.to_json_value(t),
            Value::Level(level) => serde_json::Value::String(level.as_str().to_string()),
            Value::Error(e) => serde_json::Value::String(e.to_string()),
            Value::Display(d) => serde_json::Value::String(d.to_string()),
            Value::Missing => serde_json::Value::String(MISSING_VALUE.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Time(t) => f.write_str(&t.to_rfc3339()),
            Value::Level(level) => f.write_str(level.as_str()),
            Value::Error(e) => write!(f, "{}", e),
            Value::Display(d) => write!(f, "{}", d),
            Value::Missing => f.write_str(MISSING_VALUE),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Uint(u) => f.debug_tuple("Uint").field(u).finish(),
            Value::Float(fl) => f.debug_tuple("Float").field(fl).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Time(t) => f.debug_tuple("Time").field(t).finish(),
            Value::Level(level) => f.debug_tuple("Level").field(level).finish(),
            Value::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
            Value::Display(d) => f.debug_tuple("Display").field(&d.to_string()).finish(),
            Value::Missing => f.write_str("Missing"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Missing, Value::Missing) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Level(a), Value::Level(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a.to_string() == b.to_string(),
            (Value::Display(a), Value::Display(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::String(c.to_string())
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Int(i64::from(i))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(u: $t) -> Self {
                Value::Uint(u64::from(u))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(i: isize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<usize> for Value {
    fn from(u: usize) -> Self {
        Value::Uint(u as u64)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<LogLevel> for Value {
    fn from(level: LogLevel) -> Self {
        Value::Level(level)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Timeout;

    impl fmt::Display for Timeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("request timed out")
        }
    }

    impl StdError for Timeout {}

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from("a"), Value::String("a".to_string()));
        assert_eq!(Value::from(8080), Value::Int(8080));
        assert_eq!(Value::from(3u8), Value::Uint(3));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn test_display_uses_string_conversion() {
        assert_eq!(Value::error(Timeout).to_string(), "request timed out");
        assert_eq!(Value::display(Timeout).to_string(), "request timed out");
        assert_eq!(Value::Missing.to_string(), MISSING_VALUE);
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_json_value() {
        let tf = TimestampFormat::Standard;
        assert_eq!(Value::from(42).to_json_value(&tf), serde_json::json!(42));
        assert_eq!(
            Value::error(Timeout).to_json_value(&tf),
            serde_json::json!("request timed out")
        );
        assert_eq!(
            Value::Level(LogLevel::Warn).to_json_value(&tf),
            serde_json::json!("warn")
        );
        assert_eq!(Value::Float(f64::NAN).to_json_value(&tf), serde_json::Value::Null);
    }
}
