//! Logging macros for ergonomic log message formatting.
//!
//! [`kv!`](crate::kv) builds a heterogeneous key/value list; the level
//! macros format their message like `format!` and attach no pairs.
//!
//! # Examples
//!
//! ```
//! use rust_kvlog::prelude::*;
//! use rust_kvlog::{info, kv};
//!
//! let logger = Logger::new(std::io::sink());
//!
//! // Pairs of any convertible type; an odd trailing key is allowed
//! logger.info("login", kv!["user", "bob", "attempt", 2, "ok", true]);
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Build a `Vec<Value>` of alternating keys and values.
///
/// ```
/// use rust_kvlog::{kv, Value};
///
/// let pairs = kv!["port", 8080, "tls", false];
/// assert_eq!(pairs.len(), 4);
/// assert_eq!(pairs[1], Value::Int(8080));
/// assert!(kv![].is_empty());
/// ```
#[macro_export]
macro_rules! kv {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($item:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($item)),+]
    };
}

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_kvlog::prelude::*;
/// # let logger = Logger::new(std::io::sink());
/// use rust_kvlog::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, ::std::format!($($arg)+), $crate::kv![])
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_kvlog::prelude::*;
/// # let logger = Logger::new(std::io::sink());
/// # logger.set_min_level(LogLevel::Debug);
/// use rust_kvlog::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_kvlog::prelude::*;
/// # let logger = Logger::new(std::io::sink());
/// use rust_kvlog::warn;
/// let usage = 85;
/// warn!(logger, "Memory usage high: {}%", usage);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message, then exit the process with status 1.
///
/// ```no_run
/// # use rust_kvlog::prelude::*;
/// # let logger = Logger::new(std::io::sink());
/// use rust_kvlog::fatal;
/// fatal!(logger, "cannot bind {}", "0.0.0.0:80");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(::std::format!($($arg)+), $crate::kv![])
    };
}
