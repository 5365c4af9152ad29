use crate::env;
use crate::error::ConfigError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Default character limit for the serialized `meta` attribute.
pub const DEFAULT_META_CHARACTER_LIMIT: usize = 1000;

/// Default character limit for the record body.
pub const DEFAULT_BODY_CHARACTER_LIMIT: usize = 500;

/// Configuration of a [`LogFormatter`](crate::formatter::LogFormatter).
///
/// Built once when the logging pipeline is set up and never changed
/// afterwards. Every field has a default, so partial JSON documents are
/// accepted by [`FormatterConfig::from_json_str`].
///
/// **Fields**
/// - `resource_attributes`: user resource attributes, merged over
///   [`default_resource_attributes`].
/// - `use_traces`: whether to look up the active span for correlation.
/// - `restrict_attributes_to`: attribute names kept at the top level. A
///   non-empty list switches the formatter into structured mode, where
///   every other attribute is folded into `meta`.
/// - `discard_attributes_from`: attribute names dropped unconditionally.
/// - `meta_character_limit`: maximum length of the `meta` attribute.
/// - `body_character_limit`: maximum length of the body.
/// - `filename`: `pathname` resource attribute used when a call does not
///   provide a source file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    #[serde(alias = "resourceAttributes")]
    pub resource_attributes: Map<String, Value>,
    #[serde(alias = "useTraces")]
    pub use_traces: bool,
    #[serde(alias = "restrictAttributesTo")]
    pub restrict_attributes_to: Vec<String>,
    #[serde(alias = "discardAttributesFrom")]
    pub discard_attributes_from: Vec<String>,
    #[serde(alias = "metaCharacterLimit")]
    pub meta_character_limit: usize,
    #[serde(alias = "bodyCharacterLimit")]
    pub body_character_limit: usize,
    pub filename: Option<String>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            resource_attributes: Map::new(),
            use_traces: true,
            restrict_attributes_to: Vec::new(),
            discard_attributes_from: Vec::new(),
            meta_character_limit: DEFAULT_META_CHARACTER_LIMIT,
            body_character_limit: DEFAULT_BODY_CHARACTER_LIMIT,
            filename: None,
        }
    }
}

impl FormatterConfig {
    /// Parse a configuration from a JSON document. Both `snake_case` and
    /// `camelCase` field names are accepted.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resource attributes with the defaults filled in; user entries win.
    pub fn resolved_resource_attributes(&self) -> Map<String, Value> {
        let mut resource = default_resource_attributes();
        for (key, value) in &self.resource_attributes {
            resource.insert(key.clone(), value.clone());
        }
        resource
    }
}

/// Resource attributes every record carries unless overridden: service
/// identity from the environment and the SDK identity of this crate.
pub fn default_resource_attributes() -> Map<String, Value> {
    let version = env!("CARGO_PKG_VERSION");
    let mut resource = Map::new();
    resource.insert("service.name".into(), Value::from(env::service_name()));
    resource.insert("service.instance.id".into(), Value::from(env::instance_id()));
    resource.insert("telemetry.sdk.language".into(), Value::from("rust"));
    resource.insert("telemetry.sdk.name".into(), Value::from("opentelemetry"));
    resource.insert("telemetry.sdk.version".into(), Value::from(version));
    resource.insert("otel_log_format.version".into(), Value::from(version));
    resource
}
