use anyhow::Result;
use std::collections::HashMap;

use crate::error::CatalogResult;
use crate::logic::form_state::{tags_by_name, work_form};
use crate::logic::guard::{self, DeleteCheck, DeleteOutcome};
use crate::logic::lookup::{found, require};
use crate::logic::validate::{validate_work, FieldError, WorkForm};
use crate::model::{
    generate_id, Creator, Document, EntityKind, Filter, Id, Outcome, PhysicalCopy, Query, RawForm,
    Tag, View, Work,
};
use crate::store::traits::Store;

/// Every work by title, each with its creator's display name
pub async fn list<S: Store>(store: &S) -> CatalogResult<Outcome> {
    let by_title = Query::all().sorted_by("title");
    let every_creator = Query::all();
    let (works, creators) = tokio::try_join!(
        store.list::<Work>(&by_title),
        store.list::<Creator>(&every_creator),
    )?;

    let names: HashMap<&str, String> = creators
        .iter()
        .map(|creator| (creator.id.as_str(), creator.name()))
        .collect();

    let works: Vec<_> = works
        .iter()
        .map(|work| {
            let mut view = work.to_view();
            if let Some(map) = view.as_object_mut() {
                let name = names.get(work.creator.as_str()).cloned().unwrap_or_default();
                map.insert("creator_name".into(), name.into());
            }
            view
        })
        .collect();

    Ok(Outcome::Render(
        View::new("work_list", "Work List").with("work_list", works),
    ))
}

/// Work page: its copies, creator and tags.
///
/// The work and its copies are read first; the creator and tags depend on
/// the work's references and are read in a second round.
pub async fn detail<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let copies_query = Query::filtered(Filter::eq("work", id.as_str()));
    let (work, copies) = tokio::try_join!(
        store.get::<Work>(id),
        store.list::<PhysicalCopy>(&copies_query)
    )?;
    let work = found(work, id)?;

    let tags_query = tags_by_name();
    let (creator, tags) = tokio::try_join!(
        store.get::<Creator>(&work.creator),
        store.list::<Tag>(&tags_query)
    )?;

    let tags: Vec<_> = tags
        .iter()
        .filter(|tag| work.has_tag(&tag.id))
        .map(Tag::to_view)
        .collect();
    let copies: Vec<_> = copies.iter().map(PhysicalCopy::to_view).collect();

    Ok(Outcome::Render(
        View::new("work_detail", work.title.clone())
            .with("work", work.to_view())
            .with("creator", creator.map(|c| c.to_view()))
            .with("tags", tags)
            .with("copies", copies),
    ))
}

pub async fn create_form<S: Store>(store: &S) -> CatalogResult<Outcome> {
    Ok(Outcome::Render(work_form(store, "Create Work", None, &[]).await?))
}

/// Field errors for references that point at nothing
async fn missing_references<S: Store>(store: &S, work: &WorkForm) -> Result<Vec<FieldError>> {
    let every_tag = Query::all();
    let (creator, tags) = tokio::try_join!(
        store.get::<Creator>(&work.creator),
        store.list::<Tag>(&every_tag)
    )?;

    let mut errors = Vec::new();
    if creator.is_none() {
        errors.push(FieldError::new("creator", "Creator not found."));
    }
    let unknown = work
        .tags
        .iter()
        .filter(|id| !id.is_empty())
        .any(|id| !tags.iter().any(|tag| tag.id == *id));
    if unknown {
        errors.push(FieldError::new("tags", "Unknown tag selected."));
    }
    Ok(errors)
}

async fn rejected<S: Store>(
    store: &S,
    title: &str,
    work: &WorkForm,
    errors: &[FieldError],
) -> CatalogResult<Outcome> {
    Ok(Outcome::Invalid(work_form(store, title, Some(work), errors).await?))
}

pub async fn create<S: Store>(store: &S, form: &RawForm) -> CatalogResult<Outcome> {
    let work = match validate_work(form) {
        Ok(work) => work,
        Err(rejection) => {
            return rejected(store, "Create Work", &rejection.submission, &rejection.errors).await
        }
    };

    let errors = missing_references(store, &work).await?;
    if !errors.is_empty() {
        return rejected(store, "Create Work", &work, &errors).await;
    }

    let work = work.into_work(generate_id());
    store.put(&work).await?;
    log::info!("Created work {} ({})", work.id, work.title);

    Ok(Outcome::Redirect(work.url()))
}

pub async fn update_form<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let work = require::<Work, _>(store, id).await?;
    let view = work_form(store, "Update Work", Some(&WorkForm::from(&work)), &[]).await?;
    Ok(Outcome::Render(view))
}

pub async fn update<S: Store>(store: &S, id: &Id, form: &RawForm) -> CatalogResult<Outcome> {
    let work = match validate_work(form) {
        Ok(work) => work,
        Err(rejection) => {
            return rejected(store, "Update Work", &rejection.submission, &rejection.errors).await
        }
    };

    let (existing, errors) = tokio::try_join!(
        store.get::<Work>(id),
        missing_references(store, &work)
    )?;

    if existing.is_none() {
        log::debug!("Work {} is gone, skipping update", id);
        return Ok(Outcome::Redirect(EntityKind::Work.list_url().to_string()));
    }
    if !errors.is_empty() {
        return rejected(store, "Update Work", &work, &errors).await;
    }

    let work = work.into_work(id.clone());
    store.put(&work).await?;
    log::info!("Updated work {}", work.id);

    Ok(Outcome::Redirect(work.url()))
}

fn delete_view(check: &DeleteCheck) -> View {
    View::new("work_delete", "Delete Work")
        .with("work", check.target_as::<Work>().map(|w| w.to_view()))
        .with("work_copies", check.blocker_views())
        .with("blocked", !check.allowed)
}

pub async fn delete_form<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let check = guard::can_delete(store, EntityKind::Work, id).await?;
    if check.target.is_none() {
        return Ok(Outcome::Redirect(EntityKind::Work.list_url().to_string()));
    }
    Ok(Outcome::Render(delete_view(&check)))
}

pub async fn delete<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    match guard::delete(store, EntityKind::Work, id).await? {
        DeleteOutcome::Deleted | DeleteOutcome::AlreadyAbsent => {
            Ok(Outcome::Redirect(EntityKind::Work.list_url().to_string()))
        }
        DeleteOutcome::Blocked(check) => Ok(Outcome::Blocked(delete_view(&check))),
    }
}
