use serde::{Deserialize, Serialize};

use crate::model::{generate_id, Document, EntityKind, Id};

/// Classification label shared across works. Names are unique by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
}

impl Tag {
    pub fn new(name: String) -> Self {
        Self {
            id: generate_id(),
            name,
        }
    }

    pub fn to_view(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "url": self.url(),
        })
    }
}

impl Document for Tag {
    const KIND: EntityKind = EntityKind::Tag;

    fn id(&self) -> &Id {
        &self.id
    }
}
