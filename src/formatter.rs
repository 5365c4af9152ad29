use crate::attributes::{
    truncate_chars, AttributeMode, AttributeStrategy, LOG_BODY_CHARACTER_LENGTH, LOG_BODY_TOO_LARGE,
};
use crate::config::FormatterConfig;
use crate::record::{RawRecord, TelemetryRecord};
use crate::severity::severity_number;
use crate::trace::{DisabledTraceProvider, OtelTraceProvider, TraceContextProvider};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Body used when the message is a structured object or null rather than
/// text.
pub const MISSING_BODY: &str = "";

/// Resource attribute naming the source file that emitted the record.
pub const PATHNAME_RESOURCE_ATTRIBUTE: &str = "pathname";

/// Turns [`RawRecord`]s into [`TelemetryRecord`]s.
///
/// Built once from a [`FormatterConfig`] and then called for every log
/// event. Formatting never fails and never mutates the formatter, so a
/// single instance can be shared across threads behind an [`Arc`].
pub struct LogFormatter {
    resource: Map<String, Value>,
    default_pathname: String,
    body_character_limit: usize,
    discard: HashSet<String>,
    strategy: AttributeStrategy,
    trace_provider: Arc<dyn TraceContextProvider>,
}

impl LogFormatter {
    /// Create a formatter. Trace correlation reads the current
    /// OpenTelemetry context when `use_traces` is set.
    pub fn new(config: FormatterConfig) -> Self {
        let provider: Arc<dyn TraceContextProvider> = if config.use_traces {
            Arc::new(OtelTraceProvider)
        } else {
            Arc::new(DisabledTraceProvider)
        };
        Self::with_trace_provider(config, provider)
    }

    /// Create a formatter that asks `provider` for the active span.
    ///
    /// `provider` is ignored when `use_traces` is false.
    pub fn with_trace_provider(config: FormatterConfig, provider: Arc<dyn TraceContextProvider>) -> Self {
        let trace_provider = if config.use_traces {
            provider
        } else {
            Arc::new(DisabledTraceProvider)
        };
        let strategy =
            AttributeStrategy::from_restriction(&config.restrict_attributes_to, config.meta_character_limit);

        tracing::debug!(
            mode = ?strategy.mode(),
            use_traces = config.use_traces,
            body_character_limit = config.body_character_limit,
            meta_character_limit = config.meta_character_limit,
            "log formatter configured"
        );

        LogFormatter {
            resource: config.resolved_resource_attributes(),
            default_pathname: config.filename.unwrap_or_default(),
            body_character_limit: config.body_character_limit,
            discard: config.discard_attributes_from.into_iter().collect(),
            strategy,
            trace_provider,
        }
    }

    pub fn mode(&self) -> AttributeMode {
        self.strategy.mode()
    }

    /// Resource attributes shared by every record, without `pathname`.
    pub fn resource(&self) -> &Map<String, Value> {
        &self.resource
    }

    /// Normalize one raw record.
    ///
    /// `source_file` becomes the `pathname` resource attribute of this
    /// record only; the configured `filename` is used when it is `None`.
    pub fn format(&self, raw: &RawRecord, source_file: Option<&str>) -> TelemetryRecord {
        let mut resource = self.resource.clone();
        let pathname = source_file.unwrap_or(&self.default_pathname);
        resource.insert(PATHNAME_RESOURCE_ATTRIBUTE.to_string(), Value::from(pathname));

        let trace = self.trace_provider.current();

        let mut raw_attributes = raw.metadata();
        let body = match &raw.message {
            Value::Object(fields) => {
                for (key, value) in fields {
                    raw_attributes.insert(key.clone(), value.clone());
                }
                MISSING_BODY.to_string()
            }
            Value::Null => MISSING_BODY.to_string(),
            message => {
                let mut body = message_text(message);
                let length = body.chars().count();
                if length > self.body_character_limit {
                    raw_attributes.insert(LOG_BODY_CHARACTER_LENGTH.to_string(), Value::from(length));
                    raw_attributes.insert(LOG_BODY_TOO_LARGE.to_string(), Value::Bool(true));
                    truncate_chars(&mut body, self.body_character_limit);
                }
                body
            }
        };

        TelemetryRecord {
            body,
            severity_number: severity_number(&raw.level),
            severity_text: raw.level.clone(),
            attributes: self.strategy.apply(raw_attributes, &self.discard),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            trace_id: trace.trace_id,
            span_id: trace.span_id,
            trace_flags: trace.trace_flags,
            resource,
            level: raw.level.clone(),
        }
    }
}

impl fmt::Debug for LogFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFormatter")
            .field("resource", &self.resource)
            .field("default_pathname", &self.default_pathname)
            .field("body_character_limit", &self.body_character_limit)
            .field("discard", &self.discard)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Text form of a non-object, non-null message: strings verbatim,
/// everything else as compact JSON.
fn message_text(message: &Value) -> String {
    match message {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{LOG_META, LOG_META_TOO_LARGE};
    use crate::trace::TraceData;
    use chrono::DateTime;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTrace {
        calls: AtomicUsize,
    }

    impl TraceContextProvider for FixedTrace {
        fn current(&self) -> TraceData {
            self.calls.fetch_add(1, Ordering::SeqCst);
            TraceData {
                trace_id: "0af7651916cd43dd8448eb211c80319c".into(),
                span_id: "b7ad6b7169203331".into(),
                trace_flags: 1,
            }
        }
    }

    fn structured_config() -> FormatterConfig {
        FormatterConfig {
            body_character_limit: 10,
            meta_character_limit: 100,
            restrict_attributes_to: vec!["key1".into(), "key2".into(), "key3".into()],
            ..FormatterConfig::default()
        }
    }

    #[test]
    fn truncates_body_and_routes_meta() {
        let formatter = LogFormatter::new(structured_config());
        let raw = RawRecord::new("debug", "test message")
            .with_arg(json!({"key1": "test", "metakey1": "metavalue1"}));
        let record = formatter.format(&raw, None);

        assert_eq!(record.body, "test messa");
        assert_eq!(record.severity_number, Some(5));
        assert_eq!(record.severity_text, "debug");
        assert_eq!(record.attributes["key1"], json!("test"));
        assert_eq!(record.attributes[LOG_BODY_TOO_LARGE], json!(true));
        assert_eq!(record.attributes[LOG_BODY_CHARACTER_LENGTH], json!(12));

        let meta = record.attributes[LOG_META].as_str().unwrap();
        assert!(meta.chars().count() <= 100);
        assert!(meta.contains("metakey1"));
        assert!(!record.attributes.contains_key("metakey1"));
    }

    #[test]
    fn short_body_is_untouched() {
        let formatter = LogFormatter::new(FormatterConfig::default());
        let record = formatter.format(&RawRecord::new("info", "ok"), None);

        assert_eq!(record.body, "ok");
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn object_message_becomes_attributes() {
        let formatter = LogFormatter::new(FormatterConfig::default());
        let raw = RawRecord::new("info", json!({"a": 1})).with_arg(json!({"a": 0, "b": 2}));
        let record = formatter.format(&raw, None);

        assert_eq!(record.body, MISSING_BODY);
        assert_eq!(Value::Object(record.attributes), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn object_message_is_routed_in_structured_mode() {
        let formatter = LogFormatter::new(structured_config());
        let record = formatter.format(&RawRecord::new("info", json!({"a": 1})), None);

        assert_eq!(record.body, "");
        assert_eq!(record.attributes[LOG_META], json!(r#"{"a":1}"#));
    }

    #[test]
    fn null_message_has_missing_body() {
        let formatter = LogFormatter::new(FormatterConfig {
            body_character_limit: 2,
            ..FormatterConfig::default()
        });
        let record = formatter.format(&RawRecord::new("info", Value::Null), None);

        assert_eq!(record.body, MISSING_BODY);
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn array_message_is_rendered_as_json() {
        let formatter = LogFormatter::new(FormatterConfig::default());
        let record = formatter.format(&RawRecord::new("info", json!([1, "two"])), None);
        assert_eq!(record.body, r#"[1,"two"]"#);
    }

    #[test]
    fn discarded_keys_never_reach_attributes() {
        for restrict in [vec![], vec!["password".to_string()]] {
            let formatter = LogFormatter::new(FormatterConfig {
                restrict_attributes_to: restrict,
                discard_attributes_from: vec!["password".into()],
                ..FormatterConfig::default()
            });
            let raw = RawRecord::new("info", "login").with_arg(json!({"password": "x", "user": "y"}));
            let record = formatter.format(&raw, None);

            assert!(!record.attributes.contains_key("password"));
            if let Some(meta) = record.attributes.get(LOG_META) {
                assert!(!meta.as_str().unwrap().contains("password"));
            }
        }
    }

    #[test]
    fn simple_mode_applies_no_size_limit() {
        let formatter = LogFormatter::new(FormatterConfig {
            meta_character_limit: 5,
            ..FormatterConfig::default()
        });
        let raw = RawRecord::new("info", "x").with_arg(json!({"big": "z".repeat(2000)}));
        let record = formatter.format(&raw, None);

        assert_eq!(record.attributes["big"], json!("z".repeat(2000)));
        assert!(!record.attributes.contains_key(LOG_META_TOO_LARGE));
    }

    #[test]
    fn zero_body_limit_empties_body() {
        let formatter = LogFormatter::new(FormatterConfig {
            body_character_limit: 0,
            ..FormatterConfig::default()
        });
        let record = formatter.format(&RawRecord::new("info", "anything"), None);

        assert_eq!(record.body, "");
        assert_eq!(record.attributes[LOG_BODY_CHARACTER_LENGTH], json!(8));
    }

    #[test]
    fn unknown_level_passes_through() {
        let formatter = LogFormatter::new(FormatterConfig::default());
        let record = formatter.format(&RawRecord::new("verbose", "hi"), None);

        assert_eq!(record.severity_number, None);
        assert_eq!(record.severity_text, "verbose");
        assert_eq!(record.level(), "verbose");
    }

    #[test]
    fn pathname_is_per_call() {
        let formatter = LogFormatter::new(FormatterConfig {
            filename: Some("default.rs".into()),
            ..FormatterConfig::default()
        });
        let raw = RawRecord::new("info", "hi");

        let first = formatter.format(&raw, Some("first.rs"));
        let second = formatter.format(&raw, Some("second.rs"));
        let fallback = formatter.format(&raw, None);

        assert_eq!(first.resource[PATHNAME_RESOURCE_ATTRIBUTE], json!("first.rs"));
        assert_eq!(second.resource[PATHNAME_RESOURCE_ATTRIBUTE], json!("second.rs"));
        assert_eq!(fallback.resource[PATHNAME_RESOURCE_ATTRIBUTE], json!("default.rs"));
        assert!(!formatter.resource().contains_key(PATHNAME_RESOURCE_ATTRIBUTE));
    }

    #[test]
    fn pathname_defaults_to_empty() {
        let formatter = LogFormatter::new(FormatterConfig::default());
        let record = formatter.format(&RawRecord::new("info", "hi"), None);
        assert_eq!(record.resource[PATHNAME_RESOURCE_ATTRIBUTE], json!(""));
    }

    #[test]
    fn trace_data_comes_from_provider() {
        let provider = Arc::new(FixedTrace {
            calls: AtomicUsize::new(0),
        });
        let formatter = LogFormatter::with_trace_provider(FormatterConfig::default(), provider.clone());
        let record = formatter.format(&RawRecord::new("info", "hi"), None);

        assert_eq!(record.trace_id, "0af7651916cd43dd8448eb211c80319c");
        assert_eq!(record.span_id, "b7ad6b7169203331");
        assert_eq!(record.trace_flags, 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_traces_skip_lookup() {
        let provider = Arc::new(FixedTrace {
            calls: AtomicUsize::new(0),
        });
        let config = FormatterConfig {
            use_traces: false,
            ..FormatterConfig::default()
        };
        let formatter = LogFormatter::with_trace_provider(config, provider.clone());
        let record = formatter.format(&RawRecord::new("info", "hi"), None);

        assert_eq!(record.trace_id, "");
        assert_eq!(record.span_id, "");
        assert_eq!(record.trace_flags, 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn timestamp_is_rfc3339_with_millis() {
        let formatter = LogFormatter::new(FormatterConfig::default());
        let record = formatter.format(&RawRecord::new("info", "hi"), None);

        assert!(record.timestamp.ends_with('Z'));
        let fraction = record.timestamp.rsplit('.').next().unwrap();
        assert_eq!(fraction.len(), 4, "expected three digits plus Z in {}", record.timestamp);
        assert!(DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }
}
