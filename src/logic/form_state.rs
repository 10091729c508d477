//! Builds form views, both for a fresh form and for redisplaying a rejected
//! submission. Reference lists are always read fresh and each option is
//! marked against what the requester submitted.

use anyhow::Result;
use serde::Serialize;

use crate::logic::validate::{CopyForm, CreatorForm, FieldError, TagForm, WorkForm};
use crate::model::{CopyStatus, Creator, EntityKind, Id, Query, Tag, View, WorkTitle};
use crate::store::traits::Store;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagOption {
    pub id: Id,
    pub name: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatorOption {
    pub id: Id,
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkOption {
    pub id: Id,
    pub title: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusOption {
    pub value: &'static str,
    pub selected: bool,
}

pub fn mark_tags(tags: Vec<Tag>, selected: &[String]) -> Vec<TagOption> {
    tags.into_iter()
        .map(|tag| TagOption {
            checked: selected.iter().any(|id| id == &tag.id),
            id: tag.id,
            name: tag.name,
        })
        .collect()
}

pub fn mark_creators(creators: Vec<Creator>, selected: &str) -> Vec<CreatorOption> {
    creators
        .into_iter()
        .map(|creator| CreatorOption {
            name: creator.name(),
            selected: creator.id == selected,
            id: creator.id,
        })
        .collect()
}

pub fn mark_works(works: Vec<WorkTitle>, selected: &str) -> Vec<WorkOption> {
    works
        .into_iter()
        .map(|work| WorkOption {
            selected: work.id == selected,
            id: work.id,
            title: work.title,
        })
        .collect()
}

pub fn status_options(selected: &str) -> Vec<StatusOption> {
    CopyStatus::ALL
        .iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            selected: status.as_str() == selected,
        })
        .collect()
}

pub fn creators_by_family_name() -> Query {
    Query::all().sorted_by("family_name")
}

pub fn tags_by_name() -> Query {
    Query::all().sorted_by("name")
}

/// Reference lists a work form picks from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkReferences {
    pub creators: Vec<Creator>,
    pub tags: Vec<Tag>,
}

/// Every creator and every tag, read concurrently
pub async fn load_work_references<S: Store>(store: &S) -> Result<WorkReferences> {
    let creators_query = creators_by_family_name();
    let tags_query = tags_by_name();
    let (creators, tags) = tokio::try_join!(
        store.list::<Creator>(&creators_query),
        store.list::<Tag>(&tags_query),
    )?;
    Ok(WorkReferences { creators, tags })
}

pub fn render_work_form(
    title: &str,
    references: WorkReferences,
    work: Option<&WorkForm>,
    errors: &[FieldError],
) -> View {
    let selected_creator = work.map(|w| w.creator.as_str()).unwrap_or("");
    let selected_tags = work.map(|w| w.tags.as_slice()).unwrap_or(&[]);

    View::new("work_form", title)
        .with("work", work)
        .with("creators", mark_creators(references.creators, selected_creator))
        .with("tags", mark_tags(references.tags, selected_tags))
        .with("errors", errors)
}

pub async fn work_form<S: Store>(
    store: &S,
    title: &str,
    work: Option<&WorkForm>,
    errors: &[FieldError],
) -> Result<View> {
    let references = load_work_references(store).await?;
    Ok(render_work_form(title, references, work, errors))
}

pub fn creator_form(title: &str, creator: Option<&CreatorForm>, errors: &[FieldError]) -> View {
    View::new("creator_form", title)
        .with("creator", creator)
        .with("errors", errors)
}

pub fn tag_form(title: &str, tag: Option<&TagForm>, errors: &[FieldError]) -> View {
    View::new("tag_form", title)
        .with("tag", tag)
        .with("errors", errors)
}

/// Title of every work, for the copy form's pick list
pub async fn load_work_titles<S: Store>(store: &S) -> Result<Vec<WorkTitle>> {
    let query = Query::all()
        .sorted_by("title")
        .project(WorkTitle::FIELDS);
    let works = store
        .find(EntityKind::Work, &query)
        .await?
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<WorkTitle>, _>>()?;
    Ok(works)
}

pub fn render_copy_form(
    title: &str,
    works: Vec<WorkTitle>,
    copy: Option<&CopyForm>,
    errors: &[FieldError],
) -> View {
    let selected_work = copy.map(|c| c.work.as_str()).unwrap_or("");
    let selected_status = copy.map(|c| c.status.as_str()).unwrap_or("");

    View::new("copy_form", title)
        .with("copy", copy)
        .with("works", mark_works(works, selected_work))
        .with("statuses", status_options(selected_status))
        .with("errors", errors)
}

pub async fn copy_form<S: Store>(
    store: &S,
    title: &str,
    copy: Option<&CopyForm>,
    errors: &[FieldError],
) -> Result<View> {
    let works = load_work_titles(store).await?;
    Ok(render_copy_form(title, works, copy, errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::validate::validate_work;
    use crate::model::{RawForm, Work};
    use crate::store::traits::CatalogStore;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_rejected_work_rechecks_exactly_the_submitted_tags() {
        let store = MemoryStore::new();
        let creator = Creator::new("Mary".to_string(), "Shelley".to_string());
        let other = Creator::new("Bram".to_string(), "Stoker".to_string());
        let tags: Vec<Tag> = ["Horror", "Gothic", "Romance", "Classic"]
            .iter()
            .map(|n| Tag::new(n.to_string()))
            .collect();
        store.put(&creator).await.unwrap();
        store.put(&other).await.unwrap();
        for tag in &tags {
            store.put(tag).await.unwrap();
        }

        let form = RawForm::new()
            .with("title", "Frankenstein")
            .with("creator", &creator.id)
            .with("summary", "A creature")
            .with("isbn", "")
            .with_many("tags", &[tags[0].id.as_str(), tags[3].id.as_str()]);
        let rejection = validate_work(&form).unwrap_err();

        let view = work_form(&store, "Update Work", Some(&rejection.submission), &rejection.errors)
            .await
            .unwrap();

        let checked: Vec<&str> = view.values["tags"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|t| t["checked"] == json!(true))
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(checked, vec!["Classic", "Horror"]);

        let selected: Vec<&str> = view.values["creators"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|c| c["selected"] == json!(true))
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(selected, vec!["Shelley, Mary"]);

        assert_eq!(view.values["work"]["title"], "Frankenstein");
        assert_eq!(view.values["work"]["summary"], "A creature");
        assert_eq!(view.values["errors"][0]["field"], "isbn");
    }

    #[tokio::test]
    async fn test_empty_work_form_has_the_same_shape() {
        let store = MemoryStore::new();
        store.put(&Tag::new("Horror".to_string())).await.unwrap();

        let view = work_form(&store, "Create Work", None, &[]).await.unwrap();
        assert_eq!(view.template, "work_form");
        assert_eq!(view.values["work"], serde_json::Value::Null);
        assert_eq!(view.values["tags"][0]["checked"], false);
        assert_eq!(view.values["errors"], json!([]));
    }

    #[tokio::test]
    async fn test_copy_form_marks_work_and_status() {
        let store = MemoryStore::new();
        let work = Work::new(
            "Dracula".to_string(),
            "c1".to_string(),
            "Count".to_string(),
            "isbn".to_string(),
            vec![],
        );
        store.put(&work).await.unwrap();

        let copy = CopyForm {
            work: work.id.clone(),
            imprint: "Penguin".to_string(),
            status: "Reserved".to_string(),
            due_back: "not a date".to_string(),
        };
        let view = copy_form(&store, "Create Copy", Some(&copy), &[]).await.unwrap();

        assert_eq!(
            view.values["works"],
            json!([{"id": work.id, "title": "Dracula", "selected": true}])
        );
        let selected: Vec<_> = view.values["statuses"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|s| s["selected"] == json!(true))
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["value"], "Reserved");
        assert_eq!(view.values["copy"]["due_back"], "not a date");
    }
}
