//! Basic logger usage example
//!
//! Demonstrates leveled key/value logging, derived loggers, caller
//! reporting and multi-line values.
//!
//! Run with: cargo run --example basic_usage

use rust_kvlog::prelude::*;
use rust_kvlog::{info, warn};

fn load_config(logger: &Logger, path: &str) -> std::result::Result<(), String> {
    logger.helper();
    logger.debug("reading config", kv!["path", path]);
    Err(format!("{} not found", path))
}

fn main() {
    println!("=== rust_kvlog - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .min_level(LogLevel::Debug)
        .report_timestamp(true)
        .colored(true)
        .output(std::io::stdout())
        .build();

    println!("1. Logging at different levels:");
    logger.debug("cache warmed", kv!["entries", 1024]);
    logger.info("server started", kv!["port", 8080, "tls", false]);
    logger.warn("slow request", kv!["path", "/search", "ms", 1530]);
    logger.error("upstream failed", kv!["host", "db-1", "retry", true]);
    logger.print("no level on this one", kv![]);

    println!("\n2. Minimum level set to WARN:");
    logger.set_min_level(LogLevel::Warn);
    logger.info("hidden", kv![]);
    logger.warn("visible", kv![]);
    logger.set_min_level(LogLevel::Debug);

    println!("\n3. Derived loggers carry bound context:");
    let request = logger.with(kv!["request_id", "7f3a", "user", "bob"]);
    request.info("authorized", kv!["role", "admin"]);
    let db = request.with_prefix("db");
    db.info("query", kv!["table", "users", "rows", 3]);

    println!("\n4. Caller reporting and helpers:");
    logger.set_report_caller(true);
    let result = load_config(&logger, "/etc/app.toml");
    logger.check_error(&result);
    logger.set_report_caller(false);

    println!("\n5. Values that need quoting or span lines:");
    logger.info(
        "odd values",
        kv!["empty", "", "spaced", "two words", "tab", "a\tb", "orphan"],
    );
    logger.error("panic", kv!["trace", "at main.rs:10\nat lib.rs:42\nat runtime", "code", 101]);

    println!("\n6. Formatting macros:");
    let port = 8080;
    info!(logger, "listening on port {}", port);
    warn!(logger, "{} connections dropped", 3);

    println!("\n=== Example completed successfully! ===");
}
