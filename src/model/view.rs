use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A named template plus the values it is rendered with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub template: String,
    pub title: String,
    pub values: BTreeMap<String, Value>,
}

impl View {
    pub fn new(template: &str, title: impl Into<String>) -> Self {
        Self {
            template: template.to_string(),
            title: title.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// What a workflow step asks the caller to do next
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Show a page
    Render(View),
    /// Redisplay a form that failed validation
    Invalid(View),
    /// Show the delete confirmation with the records that block it
    Blocked(View),
    /// Go to another page
    Redirect(String),
}

impl Outcome {
    pub fn view(&self) -> Option<&View> {
        match self {
            Outcome::Render(view) | Outcome::Invalid(view) | Outcome::Blocked(view) => Some(view),
            Outcome::Redirect(_) => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Outcome::Redirect(location) => Some(location),
            _ => None,
        }
    }
}
