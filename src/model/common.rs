use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

pub type Id = String;

/// The four collections of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Creator,
    Work,
    Tag,
    Copy,
}

impl EntityKind {
    /// Collection name used by the document store
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Creator => "creators",
            EntityKind::Work => "works",
            EntityKind::Tag => "tags",
            EntityKind::Copy => "copies",
        }
    }

    /// Path of the list page for this kind
    pub fn list_url(&self) -> &'static str {
        match self {
            EntityKind::Creator => "/catalog/creators",
            EntityKind::Work => "/catalog/works",
            EntityKind::Tag => "/catalog/tags",
            EntityKind::Copy => "/catalog/copies",
        }
    }

    pub fn record_url(&self, id: &str) -> String {
        format!("/catalog/{}/{}", self, id)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EntityKind::Creator => write!(f, "creator"),
            EntityKind::Work => write!(f, "work"),
            EntityKind::Tag => write!(f, "tag"),
            EntityKind::Copy => write!(f, "copy"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "creator" => Ok(EntityKind::Creator),
            "work" => Ok(EntityKind::Work),
            "tag" => Ok(EntityKind::Tag),
            "copy" => Ok(EntityKind::Copy),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}

/// A record that lives in one of the catalog collections
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &Id;

    fn url(&self) -> String {
        Self::KIND.record_url(self.id())
    }
}

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// `YYYY-MM-DD`, or empty when there is no date
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_urls() {
        assert_eq!(EntityKind::Copy.collection(), "copies");
        assert_eq!(EntityKind::Tag.list_url(), "/catalog/tags");
        assert_eq!(EntityKind::Work.record_url("w1"), "/catalog/work/w1");
        assert_eq!("Creator".parse::<EntityKind>(), Ok(EntityKind::Creator));
        assert!("shelf".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(1920, 1, 2);
        assert_eq!(format_date(date), "1920-01-02");
        assert_eq!(format_date(None), "");
    }
}
