//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a record.
///
/// The discriminants leave gaps so the ordering matches the numeric value
/// stored in the logger's atomic level. `None` is the "no level" sentinel
/// used by `print`: it sorts above every real level, so it is never
/// filtered out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum LogLevel {
    Debug = -4,
    #[default]
    Info = 0,
    #[serde(alias = "warning")]
    Warn = 4,
    Error = 8,
    Fatal = 12,
    None = i32::MAX,
}

impl LogLevel {
    /// Every level including the sentinel, lowest first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::None,
    ];

    /// Lowercase name; empty for the sentinel.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::None => "",
        }
    }

    /// Upper-cased name truncated to four characters, as shown in text output.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBU",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERRO",
            LogLevel::Fatal => "FATA",
            LogLevel::None => "",
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Inverse of [`LogLevel::as_i32`]. Values between levels round up to
    /// the next level so a stored threshold never becomes more permissive.
    pub fn from_i32(value: i32) -> Self {
        match value {
            i32::MIN..=-4 => LogLevel::Debug,
            -3..=0 => LogLevel::Info,
            1..=4 => LogLevel::Warn,
            5..=8 => LogLevel::Error,
            9..=12 => LogLevel::Fatal,
            _ => LogLevel::None,
        }
    }

    #[cfg(feature = "color")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
            LogLevel::None => White,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            "" | "none" => Ok(LogLevel::None),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
