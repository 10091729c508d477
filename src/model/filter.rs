use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// One field condition. Matches when the document field equals `value`,
/// or when the field is an array containing `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub value: Value,
}

impl Condition {
    pub fn matches(&self, document: &Value) -> bool {
        match document.get(&self.field) {
            Some(field @ Value::Array(items)) => items.contains(&self.value) || field == &self.value,
            Some(field) => field == &self.value,
            None => self.value.is_null(),
        }
    }
}

/// Conjunction of field conditions. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }
}

/// Ascending order on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
}

impl Sort {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }

    /// Orders two documents by the sort field. Missing fields sort first.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        compare_values(a.get(&self.field), b.get(&self.field))
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Filter, order and projection for a `find`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub filter: Filter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    /// Fields to keep besides `id`. `None` returns whole documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Vec<String>>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, field: &str) -> Self {
        self.sort = Some(Sort::asc(field));
        self
    }

    pub fn project(mut self, fields: &[&str]) -> Self {
        self.projection = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Strips a document down to `id` plus the projected fields
    pub fn apply_projection(&self, document: Value) -> Value {
        let Some(fields) = &self.projection else {
            return document;
        };
        let Value::Object(map) = document else {
            return document;
        };

        let projected = map
            .into_iter()
            .filter(|(key, _)| key == "id" || fields.iter().any(|f| f == key))
            .collect();
        Value::Object(projected)
    }
}
