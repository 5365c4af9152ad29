use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::Context;
use serde_json::json;

use otel_log_format::{FormatterConfig, LogFormatter, RawRecord};

/// Formats records directly, without the tracing layer, inside and outside
/// of an active span.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let formatter = LogFormatter::new(FormatterConfig {
        restrict_attributes_to: vec!["request_id".to_string()],
        ..FormatterConfig::default()
    });
    let raw = RawRecord::new("info", "handling request")
        .with_arg(json!({"request_id": "r-17", "route": "/orders"}));

    let outside = formatter.format(&raw, Some(file!()));
    println!("{}", serde_json::to_string_pretty(&outside)?);

    let span_context = SpanContext::new(
        TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736")?,
        SpanId::from_hex("00f067aa0ba902b7")?,
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );
    let _guard = Context::current().with_remote_span_context(span_context).attach();

    let inside = formatter.format(&raw, Some(file!()));
    println!("{}", serde_json::to_string_pretty(&inside)?);
    Ok(())
}
