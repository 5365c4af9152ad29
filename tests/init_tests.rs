// tests/init_tests.rs
use std::sync::Arc;
use tokio::time::{sleep, Duration};

use otel_log_format::error::InitError;
use otel_log_format::init::{init_tracing, init_tracing_with_config, LayerConfig};
use otel_log_format::memory_sink::MemorySink;
use otel_log_format::noop_sink::NoopSink;
use otel_log_format::FormatterConfig;

#[tokio::test]
async fn global_install_delivers_and_rejects_second_install() {
    let sink = MemorySink::new();
    let layer_config = LayerConfig {
        flush_interval: Duration::from_millis(20),
        ..LayerConfig::default()
    };
    let formatter_config = FormatterConfig {
        filename: Some("service.rs".into()),
        restrict_attributes_to: vec!["order_id".into()],
        ..FormatterConfig::default()
    };

    init_tracing_with_config(Arc::new(sink.clone()), formatter_config, layer_config).unwrap();

    tracing::error!(order_id = 123, "order failed");

    let mut waited = 0;
    while sink.is_empty().await && waited < 100 {
        sleep(Duration::from_millis(20)).await;
        waited += 1;
    }

    let records = sink.records().await;
    let record = records
        .iter()
        .find(|record| record.body == "order failed")
        .expect("record delivered");
    assert_eq!(record.severity_number, Some(17));
    assert_eq!(record.attributes["order_id"], serde_json::json!(123));

    let second = init_tracing(Arc::new(NoopSink), FormatterConfig::default());
    assert!(matches!(second, Err(InitError::SetGlobalDefault(_))));
}
