use serde::{Deserialize, Serialize};

use crate::model::{generate_id, Document, EntityKind, Id};

/// A catalogued title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: Id,
    pub title: String,
    pub creator: Id,
    pub summary: String,
    pub isbn: String,
    #[serde(default)]
    pub tags: Vec<Id>,
}

impl Work {
    pub fn new(title: String, creator: Id, summary: String, isbn: String, tags: Vec<Id>) -> Self {
        Self {
            id: generate_id(),
            title,
            creator,
            summary,
            isbn,
            tags,
        }
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t == tag_id)
    }

    pub fn to_view(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(map) = value.as_object_mut() {
            map.insert("url".into(), self.url().into());
        }
        value
    }
}

impl Document for Work {
    const KIND: EntityKind = EntityKind::Work;

    fn id(&self) -> &Id {
        &self.id
    }
}

/// Projection of a work used by pick lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkTitle {
    pub id: Id,
    pub title: String,
}

impl WorkTitle {
    pub const FIELDS: &'static [&'static str] = &["title"];
}
