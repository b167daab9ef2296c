//! History and publishing example
//!
//! Demonstrates keeping recent records in memory and forwarding a flattened
//! copy of every record to a subscriber.
//!
//! Run with: cargo run --example history_and_publish

use rust_kvlog::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    println!("=== rust_kvlog - History and Publish Example ===\n");

    let (publisher, subscription) = ChannelPublisher::bounded(64);
    let logger = Logger::builder()
        .formatter(OutputFormat::Json)
        .history_capacity(5)
        .publisher(Arc::new(publisher), "app-logs")
        .output(std::io::stdout())
        .build();

    let consumer = thread::spawn(move || {
        let mut received = 0;
        while let Some(record) = subscription.recv_timeout(Duration::from_millis(200)) {
            received += 1;
            println!("   [{}] {}", record.topic, record.log().unwrap_or_default());
        }
        received
    });

    println!("1. Logging from several workers:");
    let workers: Vec<_> = (0..3)
        .map(|id| {
            let worker = logger.with(kv!["worker", id]);
            thread::spawn(move || {
                for job in 0..3 {
                    worker.info("job done", kv!["job", job]);
                }
            })
        })
        .collect();
    for worker in workers {
        let _ = worker.join();
    }

    let received = consumer.join().unwrap_or(0);
    println!("\n2. Subscriber received {} records", received);

    println!("\n3. Last five records in history:");
    if let Some(history) = logger.history() {
        for line in history.snapshot() {
            println!("   {}", line);
        }
    }

    println!("\n=== Example completed successfully! ===");
}
