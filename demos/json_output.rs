//! JSON output example
//!
//! Demonstrates the JSON Lines formatter, timestamp formats and loading
//! settings from a JSON document.
//!
//! Run with: cargo run --example json_output

use rust_kvlog::prelude::*;

fn main() -> Result<()> {
    println!("=== rust_kvlog - JSON Output Example ===\n");

    println!("1. JSON records:");
    let logger = Logger::builder()
        .formatter(OutputFormat::Json)
        .report_timestamp(true)
        .time_format(TimestampFormat::Rfc3339)
        .prefix("billing")
        .output(std::io::stdout())
        .build();

    logger.info("invoice created", kv!["id", 1042, "amount", 99.5, "currency", "EUR"]);
    let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "gateway timed out");
    logger.error("charge failed", vec![Value::from("err"), Value::error(err)]);

    println!("\n2. Numeric timestamps:");
    logger.set_time_format(TimestampFormat::UnixMillis);
    logger.info("tick", kv![]);

    println!("\n3. Settings from JSON:");
    let options = LoggerOptions::from_json(
        r#"{
            "level": "debug",
            "formatter": "json",
            "report_timestamp": true,
            "time_format": "Iso8601",
            "prefix": "worker"
        }"#,
    )?;
    let configured = Logger::with_options(std::io::stdout(), &options);
    configured.debug("job picked", kv!["queue", "emails", "attempt", 1]);

    println!("\n4. Switching formatter at runtime:");
    configured.set_formatter(OutputFormat::Text);
    configured.info("same logger, text output", kv!["queue", "emails"]);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
