use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{format_date, generate_id, Document, EntityKind, Id};

/// Availability of a physical copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyStatus {
    Available,
    Maintenance,
    Loaned,
    Reserved,
}

impl CopyStatus {
    pub const ALL: [CopyStatus; 4] = [
        CopyStatus::Maintenance,
        CopyStatus::Available,
        CopyStatus::Loaned,
        CopyStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "Available",
            CopyStatus::Maintenance => "Maintenance",
            CopyStatus::Loaned => "Loaned",
            CopyStatus::Reserved => "Reserved",
        }
    }
}

impl Default for CopyStatus {
    fn default() -> Self {
        CopyStatus::Maintenance
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(CopyStatus::Available),
            "Maintenance" => Ok(CopyStatus::Maintenance),
            "Loaned" => Ok(CopyStatus::Loaned),
            "Reserved" => Ok(CopyStatus::Reserved),
            _ => Err(format!("Unknown copy status: {}", s)),
        }
    }
}

/// A loanable instance of a work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalCopy {
    pub id: Id,
    pub work: Id,
    pub imprint: String,
    #[serde(default)]
    pub status: CopyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_back: Option<NaiveDate>,
}

impl PhysicalCopy {
    pub fn new(work: Id, imprint: String, status: CopyStatus, due_back: Option<NaiveDate>) -> Self {
        Self {
            id: generate_id(),
            work,
            imprint,
            status,
            due_back,
        }
    }

    pub fn due_back_formatted(&self) -> String {
        format_date(self.due_back)
    }

    pub fn to_view(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(map) = value.as_object_mut() {
            map.insert("due_back_formatted".into(), self.due_back_formatted().into());
            map.insert("url".into(), self.url().into());
        }
        value
    }
}

impl Document for PhysicalCopy {
    const KIND: EntityKind = EntityKind::Copy;

    fn id(&self) -> &Id {
        &self.id
    }
}
