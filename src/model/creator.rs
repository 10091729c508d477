use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{format_date, generate_id, Document, EntityKind, Id};

/// A person credited with authoring works
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: Id,
    pub first_name: String,
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<NaiveDate>,
}

impl Creator {
    pub fn new(first_name: String, family_name: String) -> Self {
        Self {
            id: generate_id(),
            first_name,
            family_name,
            date_of_birth: None,
            date_of_death: None,
        }
    }

    /// `family, given`; empty unless both parts are present
    pub fn name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            return String::new();
        }
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// Calendar years between birth and death. Empty when either date is unknown.
    pub fn lifespan(&self) -> String {
        match (self.date_of_birth, self.date_of_death) {
            (Some(birth), Some(death)) => (death.year() - birth.year()).to_string(),
            _ => String::new(),
        }
    }

    pub fn date_of_birth_formatted(&self) -> String {
        format_date(self.date_of_birth)
    }

    pub fn date_of_death_formatted(&self) -> String {
        format_date(self.date_of_death)
    }

    /// `birth - death`, each missing side shown as `...`
    pub fn lifespan_formatted(&self) -> String {
        let birth = self.date_of_birth_formatted();
        let death = self.date_of_death_formatted();

        if birth.is_empty() && death.is_empty() {
            return String::new();
        }

        let side = |s: String| if s.is_empty() { "...".to_string() } else { s };
        format!("{} - {}", side(birth), side(death))
    }

    /// Record plus derived labels, ready for a view
    pub fn to_view(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(map) = value.as_object_mut() {
            map.insert("name".into(), self.name().into());
            map.insert("lifespan".into(), self.lifespan().into());
            map.insert("lifespan_formatted".into(), self.lifespan_formatted().into());
            map.insert(
                "date_of_birth_formatted".into(),
                self.date_of_birth_formatted().into(),
            );
            map.insert(
                "date_of_death_formatted".into(),
                self.date_of_death_formatted().into(),
            );
            map.insert("url".into(), self.url().into());
        }
        value
    }
}

impl Document for Creator {
    const KIND: EntityKind = EntityKind::Creator;

    fn id(&self) -> &Id {
        &self.id
    }
}
