use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::{error, info};
use otel_log_format::{
    init::init_tracing,
    record::TelemetryRecord,
    sink::LogSink,
    FormatterConfig,
};

/// Example of integrating a custom backend by implementing the `LogSink`
/// trait directly. Records are printed as the JSON documents a collector
/// would receive; only warnings and above are accepted.
struct StdoutJsonSink;

#[async_trait]
impl LogSink for StdoutJsonSink {
    async fn send(&self, record: &TelemetryRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("{}", serde_json::to_string(record)?);
        Ok(())
    }

    fn enabled(&self, level: &str) -> bool {
        matches!(level, "warning" | "error")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink: Arc<dyn LogSink> = Arc::new(StdoutJsonSink);
    let config = FormatterConfig {
        discard_attributes_from: vec!["password".to_string()],
        ..FormatterConfig::default()
    };

    init_tracing(sink, config)?;

    info!("custom backend example started");
    error!(user = "alice", password = "hunter2", "login failed");

    sleep(Duration::from_millis(1500)).await;
    Ok(())
}
