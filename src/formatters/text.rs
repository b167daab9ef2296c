//! Human-readable text rendering
//!
//! One line per record, items separated by single spaces:
//!
//! ```text
//! INFO [src/main.rs:7] http: started port=8080 timestamp=2024/05/01 12:00:00
//! ```
//!
//! Values containing newlines are rendered as an indented block under
//! their key instead.

use super::escape::{escape, needs_quoting};
use crate::core::log_level::LogLevel;
use crate::core::record::{
    pairs, reserved_key, CALLER_KEY, LEVEL_KEY, MESSAGE_KEY, PREFIX_KEY, TIMESTAMP_KEY,
};
use crate::core::timestamp::TimestampFormat;
use crate::core::value::Value;
use std::borrow::Cow;

/// Prefix for each line of a multi-line value.
pub const BLOCK_INDENT: &str = "  │ ";

const EMPTY_VALUE: &str = "\"\"";

#[derive(Clone, Copy)]
enum Tone {
    Faint,
    Level(LogLevel),
}

#[cfg(feature = "color")]
fn styled(text: &str, tone: Tone, colored: bool) -> Cow<'_, str> {
    use colored::Colorize;

    if !colored {
        return Cow::Borrowed(text);
    }
    let painted = match tone {
        Tone::Faint => text.bright_black(),
        Tone::Level(level) => text.color(level.color_code()).bold(),
    };
    Cow::Owned(painted.to_string())
}

#[cfg(not(feature = "color"))]
fn styled(text: &str, _tone: Tone, _colored: bool) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

struct TextWriter<'b> {
    buf: &'b mut Vec<u8>,
    colored: bool,
    started: bool,
}

impl TextWriter<'_> {
    fn put(&mut self, text: &str) {
        self.buf.extend_from_slice(text.as_bytes());
    }

    fn put_styled(&mut self, text: &str, tone: Tone) {
        let rendered = styled(text, tone, self.colored);
        self.put(&rendered);
    }

    /// Separator before every item but the first.
    fn item(&mut self) {
        if self.started {
            self.buf.push(b' ');
        }
        self.started = true;
    }

    fn pair(&mut self, key: &str, value: &str, more: bool) {
        if value.contains('\n') {
            self.put("\n  ");
            self.put_styled(key, Tone::Faint);
            self.put_styled("=", Tone::Faint);
            self.put("\n");
            self.block(value, more);
            self.started = true;
            return;
        }

        self.item();
        self.put_styled(key, Tone::Faint);
        self.put_styled("=", Tone::Faint);
        if value.is_empty() {
            self.put(EMPTY_VALUE);
        } else if needs_quoting(value) {
            self.put("\"");
            self.put(&escape(value, true));
            self.put("\"");
        } else {
            self.put(value);
        }
    }

    /// Each line of `value` on its own indented row. The last row ends in a
    /// newline only when more pairs follow.
    fn block(&mut self, value: &str, more: bool) {
        let mut rest = value;
        loop {
            match rest.find('\n') {
                Some(nl) => {
                    self.put(BLOCK_INDENT);
                    self.put(&escape(&rest[..nl], true));
                    self.put("\n");
                    rest = &rest[nl + 1..];
                }
                None => {
                    if !rest.is_empty() {
                        self.put(BLOCK_INDENT);
                        self.put(&escape(rest, true));
                        if more {
                            self.put("\n");
                        }
                    }
                    return;
                }
            }
        }
    }
}

/// Append the text form of `kvs` to `buf`, newline-terminated.
///
/// Reserved keys holding a value of the wrong type are dropped.
pub fn render_text(kvs: &[Value], time_format: &TimestampFormat, colored: bool, buf: &mut Vec<u8>) {
    let total = kvs.len().div_ceil(2);
    let mut out = TextWriter {
        buf,
        colored,
        started: false,
    };

    for (idx, (key, value)) in pairs(kvs).enumerate() {
        match reserved_key(key) {
            Some(TIMESTAMP_KEY) => {
                if let Value::Time(at) = value {
                    out.item();
                    out.put_styled("timestamp=", Tone::Faint);
                    out.put(&time_format.format(at));
                }
            }
            Some(LEVEL_KEY) => {
                if let Value::Level(level) = value {
                    let abbreviation = level.abbreviation();
                    if !abbreviation.is_empty() {
                        out.item();
                        out.put_styled(abbreviation, Tone::Level(*level));
                    }
                }
            }
            Some(CALLER_KEY) => {
                if let Value::String(caller) = value {
                    out.item();
                    out.put_styled(&format!("[{}]", caller), Tone::Faint);
                }
            }
            Some(PREFIX_KEY) => {
                if let Value::String(prefix) = value {
                    out.item();
                    out.put_styled(&format!("{}:", prefix), Tone::Faint);
                }
            }
            Some(MESSAGE_KEY) => {
                if !value.is_null() {
                    out.item();
                    out.put(&value.to_text(time_format));
                }
            }
            _ => {
                let key = key.to_string();
                if !key.is_empty() {
                    out.pair(&key, &value.to_text(time_format), idx + 1 < total);
                }
            }
        }
    }

    out.buf.push(b'\n');
}

/// Single-line, unstyled rendering used for history and publishing.
///
/// Items are joined by one space; no quoting or block layout is applied.
pub fn flatten(kvs: &[Value], time_format: &TimestampFormat) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(kvs.len() / 2);

    for (key, value) in pairs(kvs) {
        match reserved_key(key) {
            Some(TIMESTAMP_KEY) => {
                if let Value::Time(at) = value {
                    parts.push(format!("timestamp={}", time_format.format(at)));
                }
            }
            Some(LEVEL_KEY) => {
                if let Value::Level(level) = value {
                    if !level.abbreviation().is_empty() {
                        parts.push(level.abbreviation().to_string());
                    }
                }
            }
            Some(CALLER_KEY) => {
                if let Value::String(caller) = value {
                    parts.push(format!("[{}]", caller));
                }
            }
            Some(PREFIX_KEY) => {
                if let Value::String(prefix) = value {
                    parts.push(format!("{}:", prefix));
                }
            }
            Some(MESSAGE_KEY) => {
                if !value.is_null() {
                    parts.push(value.to_text(time_format));
                }
            }
            _ => {
                let key = key.to_string();
                if key.is_empty() {
                    continue;
                }
                let value = value.to_text(time_format);
                if value.is_empty() {
                    parts.push(format!("{}={}", key, EMPTY_VALUE));
                } else {
                    parts.push(format!("{}={}", key, value));
                }
            }
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn render(kvs: Vec<Value>) -> String {
        let mut buf = Vec::new();
        render_text(&kvs, &TimestampFormat::Standard, false, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    fn kv(key: &str, value: impl Into<Value>) -> [Value; 2] {
        [Value::from(key), value.into()]
    }

    #[test]
    fn test_full_record() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let kvs: Vec<Value> = [
            kv("level", LogLevel::Info),
            kv("caller", "src/main.rs:7"),
            kv("message", "started"),
            kv("port", 8080),
            kv("timestamp", at),
        ]
        .concat();

        assert_eq!(
            render(kvs),
            "INFO [src/main.rs:7] started port=8080 timestamp=2024/05/01 12:00:00\n"
        );
    }

    #[test]
    fn test_time_pairs_use_time_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let kvs = [kv("started", at)].concat();

        let mut buf = Vec::new();
        render_text(&kvs, &TimestampFormat::Unix, false, &mut buf);
        assert_eq!(String::from_utf8(buf).unwrap(), format!("started={}\n", at.timestamp()));

        assert_eq!(render(kvs.clone()), "started=\"2024/05/01 12:00:00\"\n");
        assert_eq!(flatten(&kvs, &TimestampFormat::Standard), "started=2024/05/01 12:00:00");
    }

    #[test]
    fn test_prefix_and_levels() {
        let kvs = [kv("level", LogLevel::Error), kv("prefix", "db"), kv("message", "down")].concat();
        assert_eq!(render(kvs), "ERRO db: down\n");

        let kvs = [kv("level", LogLevel::Warn)].concat();
        assert_eq!(render(kvs), "WARN\n");
    }

    #[test]
    fn test_empty_and_quoted_values() {
        let kvs = [kv("a", ""), kv("b", "two words"), kv("c", "x=y"), kv("d", "say \"hi\"")].concat();
        assert_eq!(
            render(kvs),
            "a=\"\" b=\"two words\" c=\"x=y\" d=\"say \\\"hi\\\"\"\n"
        );
    }

    #[test]
    fn test_control_characters_escaped() {
        let kvs = [kv("k", "a\tb"), kv("bell", "\x07")].concat();
        assert_eq!(render(kvs), "k=\"a\\tb\" bell=\"\\a\"\n");
    }

    #[test]
    fn test_empty_key_skipped() {
        let kvs = [kv("", "ignored"), kv("kept", 1)].concat();
        assert_eq!(render(kvs), "kept=1\n");
    }

    #[test]
    fn test_missing_value() {
        let kvs = vec![Value::from("orphan"), Value::Missing];
        assert_eq!(render(kvs), "orphan=\"missing value\"\n");
    }

    #[test]
    fn test_multiline_value_last() {
        let kvs = [kv("message", "boom"), kv("trace", "line one\nline \"two\"")].concat();
        assert_eq!(
            render(kvs),
            "boom\n  trace=\n  │ line one\n  │ line \\\"two\\\"\n"
        );
    }

    #[test]
    fn test_multiline_value_followed_by_pair() {
        let kvs = [kv("body", "a\nb"), kv("after", 1)].concat();
        assert_eq!(render(kvs), "\n  body=\n  │ a\n  │ b\n after=1\n");
    }

    #[test]
    fn test_reserved_key_with_wrong_type_dropped() {
        let kvs = [kv("level", "loud"), kv("caller", 3), kv("timestamp", "noon"), kv("x", 1)].concat();
        assert_eq!(render(kvs), "x=1\n");
    }

    #[test]
    fn test_error_values_use_message() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let kvs = vec![Value::from("err"), Value::error(err)];
        assert_eq!(render(kvs), "err=gone\n");
    }

    #[test]
    fn test_empty_record_is_newline() {
        assert_eq!(render(vec![]), "\n");
    }

    #[test]
    fn test_flatten() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let kvs: Vec<Value> = [
            kv("level", LogLevel::Warn),
            kv("prefix", "disk"),
            kv("message", "low space"),
            kv("free", "2 GB"),
            kv("note", ""),
            kv("timestamp", at),
        ]
        .concat();

        assert_eq!(
            flatten(&kvs, &TimestampFormat::Standard),
            "WARN disk: low space free=2 GB note=\"\" timestamp=2024/05/01 12:00:00"
        );
    }

    #[cfg(feature = "color")]
    #[test]
    fn test_uncolored_output_has_no_escape_codes() {
        let kvs = [kv("level", LogLevel::Error), kv("k", "v")].concat();
        assert!(!render(kvs).contains('\x1b'));
    }
}
