use serde_json::{Map, Value};
use std::collections::HashSet;

/// Set to `true` when the body was truncated.
pub const LOG_BODY_TOO_LARGE: &str = "log_body_too_large";
/// Original body length, present only when the body was truncated.
pub const LOG_BODY_CHARACTER_LENGTH: &str = "log_body_character_length";
/// Serialized bucket of attributes outside the restricted set.
pub const LOG_META: &str = "meta";
/// Set to `true` when `meta` was truncated.
pub const LOG_META_TOO_LARGE: &str = "log_meta_too_large";
/// Original `meta` length, present only when `meta` was truncated.
pub const LOG_META_CHARACTER_LENGTH: &str = "log_meta_character_length";

/// Control attributes that are always kept at the top level in structured
/// mode.
pub const RESERVED_ATTRIBUTES: [&str; 4] = [
    LOG_BODY_TOO_LARGE,
    LOG_BODY_CHARACTER_LENGTH,
    LOG_META_TOO_LARGE,
    LOG_META_CHARACTER_LENGTH,
];

/// How raw attributes are turned into record attributes. Chosen once when
/// the formatter is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeStrategy {
    /// Every attribute passes through unchanged.
    Simple,
    /// Attributes in `restrict_to` pass through; the rest are serialized
    /// into a single `meta` string of at most `meta_character_limit` chars.
    Structured {
        restrict_to: HashSet<String>,
        meta_character_limit: usize,
    },
}

/// Which [`AttributeStrategy`] variant is active, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    Simple,
    Structured,
}

impl AttributeStrategy {
    /// Simple mode for an empty restriction list, structured mode otherwise.
    /// The reserved control attributes are always added to the restriction.
    pub fn from_restriction(restrict_to: &[String], meta_character_limit: usize) -> Self {
        if restrict_to.is_empty() {
            return AttributeStrategy::Simple;
        }
        let restrict_to = RESERVED_ATTRIBUTES
            .iter()
            .map(|name| name.to_string())
            .chain(restrict_to.iter().cloned())
            .collect();
        AttributeStrategy::Structured {
            restrict_to,
            meta_character_limit,
        }
    }

    pub fn mode(&self) -> AttributeMode {
        match self {
            AttributeStrategy::Simple => AttributeMode::Simple,
            AttributeStrategy::Structured { .. } => AttributeMode::Structured,
        }
    }

    /// Build record attributes from `raw`, dropping every key in `discard`
    /// first.
    pub fn apply(&self, raw: Map<String, Value>, discard: &HashSet<String>) -> Map<String, Value> {
        let kept = raw.into_iter().filter(|(key, _)| !discard.contains(key));

        match self {
            AttributeStrategy::Simple => kept.collect(),
            AttributeStrategy::Structured {
                restrict_to,
                meta_character_limit,
            } => {
                let mut attributes = Map::new();
                let mut meta = Map::new();
                for (key, value) in kept {
                    if restrict_to.contains(&key) {
                        attributes.insert(key, value);
                    } else {
                        meta.insert(key, value);
                    }
                }

                if !meta.is_empty() {
                    let mut serialized = Value::Object(meta).to_string();
                    let length = serialized.chars().count();
                    if length > *meta_character_limit {
                        attributes.insert(LOG_META_CHARACTER_LENGTH.to_string(), Value::from(length));
                        attributes.insert(LOG_META_TOO_LARGE.to_string(), Value::Bool(true));
                        truncate_chars(&mut serialized, *meta_character_limit);
                    }
                    attributes.insert(LOG_META.to_string(), Value::String(serialized));
                }
                attributes
            }
        }
    }
}

/// Shorten `text` to at most `limit` characters, never splitting one.
pub(crate) fn truncate_chars(text: &mut String, limit: usize) {
    if let Some((index, _)) = text.char_indices().nth(limit) {
        text.truncate(index);
    }
}
