//! Placeholder options for config templates
//!
//! An `Options` value is immutable once built; experiments get their own
//! mapping by layering `defaults < topology-derived < overrides` with
//! [`Options::layered`], so no container is ever shared between experiments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One value substituted for a `%KEY%` placeholder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Plain text is quoted; text containing a newline is a pre-rendered
    /// block and is inserted verbatim.
    Text(String),
    /// Structured value from a campaign config file, inserted as JSON
    Json(serde_json::Value),
}

impl OptionValue {
    /// Text form embedded into the template
    pub fn render(&self) -> String {
        match self {
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Integer(i) => i.to_string(),
            OptionValue::Float(f) => format!("{:?}", f),
            OptionValue::Text(s) if s.contains('\n') => s.clone(),
            OptionValue::Text(s) if s == "True" => "true".to_string(),
            OptionValue::Text(s) if s == "False" => "false".to_string(),
            OptionValue::Text(s) => format!("\"{}\"", s),
            OptionValue::Json(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, OptionValue::Text(s) if s.contains('\n'))
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Integer(v)
    }
}

impl From<u64> for OptionValue {
    fn from(v: u64) -> Self {
        OptionValue::Integer(v as i64)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Integer(v as i64)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

/// Placeholder key to value mapping
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, OptionValue>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// New mapping where later layers win over earlier ones
    pub fn layered(layers: &[&Options]) -> Options {
        let mut merged = BTreeMap::new();
        for layer in layers {
            for (k, v) in &layer.0 {
                merged.insert(k.clone(), v.clone());
            }
        }
        Options(merged)
    }
}

impl<K, V> FromIterator<(K, V)> for Options
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Options(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
