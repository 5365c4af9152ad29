use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{error, Level};

use otel_log_format::init::{init_tracing_with_config, LayerConfig};
use otel_log_format::noop_sink::NoopSink;
use otel_log_format::FormatterConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink = Arc::new(NoopSink::default());

    // Structured mode with a small meta budget exercises serialization and
    // truncation on every event.
    let formatter_config = FormatterConfig {
        restrict_attributes_to: vec!["iteration".to_string()],
        meta_character_limit: 64,
        body_character_limit: 32,
        ..FormatterConfig::default()
    };

    let layer_config = LayerConfig {
        channel_buffer: 50_000,
        batch_size: 1_000,
        flush_interval: Duration::from_millis(200),
        enable_stdout: false,
        max_level: Level::INFO,
    };

    init_tracing_with_config(sink, formatter_config, layer_config)?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, payload = "a fairly long payload that lands in meta", "custom load test error with a long body");
    }

    let elapsed = start.elapsed();
    println!("custom config: formatted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    sleep(Duration::from_secs(2)).await;
    Ok(())
}
