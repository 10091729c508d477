use serde_json::Value;

use crate::error::CatalogResult;
use crate::logic::form_state::{tag_form, tags_by_name};
use crate::logic::guard::{self, DeleteCheck, DeleteOutcome};
use crate::logic::lookup::{found, require};
use crate::logic::validate::{validate_tag, FieldError, TagForm};
use crate::model::{
    generate_id, Document, EntityKind, Filter, Id, Outcome, Query, RawForm, Tag, View, Work,
};
use crate::store::traits::Store;

const DUPLICATE_NAME: &str = "A tag with this name already exists";

pub async fn list<S: Store>(store: &S) -> CatalogResult<Outcome> {
    let tags = store.list::<Tag>(&tags_by_name()).await?;
    let tags: Vec<_> = tags.iter().map(Tag::to_view).collect();

    Ok(Outcome::Render(
        View::new("tag_list", "Tag List").with("tag_list", tags),
    ))
}

/// Tag page with every work carrying it
pub async fn detail<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let works_query = Query::filtered(Filter::eq("tags", id.as_str())).sorted_by("title");
    let (tag, works) = tokio::try_join!(
        store.get::<Tag>(id),
        store.list::<Work>(&works_query)
    )?;
    let tag = found(tag, id)?;

    let works: Vec<_> = works.iter().map(Work::to_view).collect();
    Ok(Outcome::Render(
        View::new("tag_detail", "Tag Detail")
            .with("tag", tag.to_view())
            .with("tag_works", works),
    ))
}

pub fn create_form() -> Outcome {
    Outcome::Render(tag_form("Create Tag", None, &[]))
}

/// Creates a tag unless one with the same name exists, in which case the
/// requester is sent to the existing one.
pub async fn create<S: Store>(store: &S, form: &RawForm) -> CatalogResult<Outcome> {
    let draft = match validate_tag(form) {
        Ok(draft) => draft,
        Err(rejection) => {
            return Ok(Outcome::Invalid(tag_form(
                "Create Tag",
                Some(&rejection.submission),
                &rejection.errors,
            )))
        }
    };

    let name = Value::String(draft.name.clone());
    if let Some(existing) = store.get_by_field::<Tag>("name", &name).await? {
        log::debug!("Tag '{}' already exists as {}", existing.name, existing.id);
        return Ok(Outcome::Redirect(existing.url()));
    }

    let tag = Tag {
        id: generate_id(),
        name: draft.name,
    };
    store.put(&tag).await?;
    log::info!("Created tag {} ({})", tag.id, tag.name);

    Ok(Outcome::Redirect(tag.url()))
}

pub async fn update_form<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let tag = require::<Tag, _>(store, id).await?;
    Ok(Outcome::Render(tag_form(
        "Update Tag",
        Some(&TagForm::from(&tag)),
        &[],
    )))
}

/// Renames a tag. Taking another tag's name is rejected as a field error.
pub async fn update<S: Store>(store: &S, id: &Id, form: &RawForm) -> CatalogResult<Outcome> {
    let draft = match validate_tag(form) {
        Ok(draft) => draft,
        Err(rejection) => {
            return Ok(Outcome::Invalid(tag_form(
                "Update Tag",
                Some(&rejection.submission),
                &rejection.errors,
            )))
        }
    };

    let name = Value::String(draft.name.clone());
    let (existing, namesake) = tokio::try_join!(
        store.get::<Tag>(id),
        store.get_by_field::<Tag>("name", &name)
    )?;

    if existing.is_none() {
        log::debug!("Tag {} is gone, skipping update", id);
        return Ok(Outcome::Redirect(EntityKind::Tag.list_url().to_string()));
    }
    if namesake.is_some_and(|other| &other.id != id) {
        return Ok(Outcome::Invalid(tag_form(
            "Update Tag",
            Some(&draft),
            &[FieldError::new("name", DUPLICATE_NAME)],
        )));
    }

    let tag = Tag {
        id: id.clone(),
        name: draft.name,
    };
    store.put(&tag).await?;
    log::info!("Updated tag {}", tag.id);

    Ok(Outcome::Redirect(tag.url()))
}

fn delete_view(check: &DeleteCheck) -> View {
    View::new("tag_delete", "Delete Tag")
        .with("tag", check.target_as::<Tag>().map(|t| t.to_view()))
        .with("tag_works", check.blocker_views())
        .with("blocked", !check.allowed)
}

pub async fn delete_form<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let check = guard::can_delete(store, EntityKind::Tag, id).await?;
    if check.target.is_none() {
        return Ok(Outcome::Redirect(EntityKind::Tag.list_url().to_string()));
    }
    Ok(Outcome::Render(delete_view(&check)))
}

pub async fn delete<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    match guard::delete(store, EntityKind::Tag, id).await? {
        DeleteOutcome::Deleted | DeleteOutcome::AlreadyAbsent => {
            Ok(Outcome::Redirect(EntityKind::Tag.list_url().to_string()))
        }
        DeleteOutcome::Blocked(check) => Ok(Outcome::Blocked(delete_view(&check))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::traits::CatalogStore;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_create_reuses_existing_name() {
        let store = MemoryStore::new();
        let fantasy = Tag::new("Fantasy".to_string());
        store.put(&fantasy).await.unwrap();

        let outcome = create(&store, &RawForm::new().with("name", " Fantasy "))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Redirect(fantasy.url()));
        assert_eq!(store.list::<Tag>(&Query::all()).await.unwrap().len(), 1);

        let outcome = create(&store, &RawForm::new().with("name", "Horror"))
            .await
            .unwrap();
        let tags = store.list::<Tag>(&tags_by_name()).await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(outcome, Outcome::Redirect(tags[1].url()));
        assert_eq!(tags[1].name, "Horror");
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let store = MemoryStore::new();
        let Outcome::Invalid(view) = create(&store, &RawForm::new().with("name", "  "))
            .await
            .unwrap()
        else {
            panic!("blank names are invalid");
        };
        assert_eq!(view.values["errors"][0]["message"], "Tag name required");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_rename_onto_taken_name_is_a_field_error() {
        let store = MemoryStore::new();
        let fantasy = Tag::new("Fantasy".to_string());
        let horror = Tag::new("Horror".to_string());
        store.put(&fantasy).await.unwrap();
        store.put(&horror).await.unwrap();

        let outcome = update(&store, &horror.id, &RawForm::new().with("name", "Fantasy"))
            .await
            .unwrap();
        let Outcome::Invalid(view) = outcome else {
            panic!("names stay unique");
        };
        assert_eq!(view.values["errors"][0]["message"], DUPLICATE_NAME);
        assert_eq!(store.get::<Tag>(&horror.id).await.unwrap(), Some(horror.clone()));

        // keeping its own name is fine
        let outcome = update(&store, &horror.id, &RawForm::new().with("name", "Horror"))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Redirect(horror.url()));
    }

    #[tokio::test]
    async fn test_detail_lists_tagged_works() {
        let store = MemoryStore::new();
        let tag = Tag::new("Gothic".to_string());
        store.put(&tag).await.unwrap();
        let tagged = Work::new(
            "Dracula".to_string(),
            "c1".to_string(),
            "Count".to_string(),
            "isbn".to_string(),
            vec![tag.id.clone()],
        );
        let untagged = Work::new(
            "Emma".to_string(),
            "c2".to_string(),
            "Match".to_string(),
            "isbn".to_string(),
            vec![],
        );
        store.put(&tagged).await.unwrap();
        store.put(&untagged).await.unwrap();

        let outcome = detail(&store, &tag.id).await.unwrap();
        let works = outcome.view().unwrap().values["tag_works"].as_array().unwrap().clone();
        assert_eq!(works.len(), 1);
        assert_eq!(works[0]["title"], "Dracula");

        assert!(matches!(
            detail(&store, &"missing".to_string()).await,
            Err(crate::error::CatalogError::NotFound { .. })
        ));
    }
}
