use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A submitted field: either a single value or a repeated one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

/// Untrusted form submission, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawForm {
    fields: HashMap<String, FieldValue>,
}

impl RawForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.fields
            .insert(name.to_string(), FieldValue::One(value.to_string()));
        self
    }

    pub fn with_many(mut self, name: &str, values: &[&str]) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldValue::Many(values.iter().map(|v| v.to_string()).collect()),
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Single-valued read. Absent reads as empty; a repeated field yields its first value.
    pub fn text(&self, name: &str) -> &str {
        match self.fields.get(name) {
            Some(FieldValue::One(value)) => value,
            Some(FieldValue::Many(values)) => values.first().map(String::as_str).unwrap_or(""),
            None => "",
        }
    }

    /// Multi-valued read. Always a list: absent is empty, a single value is one element.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(FieldValue::One(value)) => vec![value.clone()],
            Some(FieldValue::Many(values)) => values.clone(),
            None => Vec::new(),
        }
    }
}
