use serde::Serialize;
use serde_json::{Map, Value};

/// A log event as produced by the host logging pipeline, before
/// normalization.
///
/// `args` holds the auxiliary values passed alongside the message, in call
/// order. See [`RawRecord::metadata`] for how they become attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub level: String,
    pub message: Value,
    pub args: Vec<Value>,
}

/// Key under which multiple (or non-mapping) call arguments are collected.
pub const SPLAT_KEY: &str = "splat";

impl RawRecord {
    pub fn new(level: impl Into<String>, message: impl Into<Value>) -> Self {
        RawRecord {
            level: level.into(),
            message: message.into(),
            args: Vec::new(),
        }
    }

    /// Append one auxiliary call argument.
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Extra metadata carried by the call arguments.
    ///
    /// - no arguments: empty map
    /// - one object argument: its fields
    /// - anything else: `{ "splat": [args...] }`
    pub fn metadata(&self) -> Map<String, Value> {
        match self.args.as_slice() {
            [] => Map::new(),
            [Value::Object(fields)] => fields.clone(),
            args => {
                let mut meta = Map::new();
                meta.insert(SPLAT_KEY.to_string(), Value::Array(args.to_vec()));
                meta
            }
        }
    }
}

/// Normalized OpenTelemetry-style log record handed to sinks.
///
/// The original level is kept in a private field that is never serialized;
/// sinks and dispatch logic read it through [`TelemetryRecord::level`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_number: Option<u8>,
    pub severity_text: String,
    pub attributes: Map<String, Value>,
    pub timestamp: String,
    pub trace_id: String,
    pub span_id: String,
    pub trace_flags: u8,
    pub resource: Map<String, Value>,
    #[serde(skip)]
    pub(crate) level: String,
}

impl TelemetryRecord {
    /// Level of the originating event, for level-based routing.
    pub fn level(&self) -> &str {
        &self.level
    }
}
