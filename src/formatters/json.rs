//! JSON Lines rendering
//!
//! Each record becomes one JSON object on its own line. Keys are the string
//! form of each pair's key; a repeated key keeps its last value.

use crate::core::error::Result;
use crate::core::record::{
    pairs, reserved_key, CALLER_KEY, LEVEL_KEY, MESSAGE_KEY, PREFIX_KEY, TIMESTAMP_KEY,
};
use crate::core::timestamp::TimestampFormat;
use crate::core::value::Value;
use serde_json::{Map, Value as JsonValue};

/// Build the JSON object for `kvs`.
///
/// Reserved keys holding a value of the wrong type are dropped.
pub fn to_json_map(kvs: &[Value], time_format: &TimestampFormat) -> Map<String, JsonValue> {
    let mut map = Map::with_capacity(kvs.len() / 2);

    for (key, value) in pairs(kvs) {
        match reserved_key(key) {
            Some(TIMESTAMP_KEY) => {
                if let Value::Time(at) = value {
                    map.insert(TIMESTAMP_KEY.to_string(), time_format.to_json_value(at));
                }
            }
            Some(LEVEL_KEY) => {
                if let Value::Level(level) = value {
                    map.insert(
                        LEVEL_KEY.to_string(),
                        JsonValue::String(level.as_str().to_string()),
                    );
                }
            }
            Some(name @ (CALLER_KEY | PREFIX_KEY)) => {
                if let Value::String(text) = value {
                    map.insert(name.to_string(), JsonValue::String(text.clone()));
                }
            }
            Some(MESSAGE_KEY) => {
                if !value.is_null() {
                    map.insert(
                        MESSAGE_KEY.to_string(),
                        JsonValue::String(value.to_string()),
                    );
                }
            }
            _ => {
                map.insert(key.to_string(), value.to_json_value(time_format));
            }
        }
    }

    map
}

/// Append the JSON form of `kvs` to `buf`, newline-terminated.
pub fn render_json(kvs: &[Value], time_format: &TimestampFormat, buf: &mut Vec<u8>) -> Result<()> {
    let map = to_json_map(kvs, time_format);
    serde_json::to_writer(&mut *buf, &map)?;
    buf.push(b'\n');
    Ok(())
}
