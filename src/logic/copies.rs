use std::collections::HashMap;

use crate::error::CatalogResult;
use crate::logic::form_state::{copy_form, load_work_titles};
use crate::logic::guard::{self, DeleteCheck, DeleteOutcome};
use crate::logic::lookup::require;
use crate::logic::validate::{validate_copy, CopyForm, FieldError};
use crate::model::{
    generate_id, Document, EntityKind, Id, Outcome, PhysicalCopy, Query, RawForm, View, Work,
};
use crate::store::traits::Store;

/// Every copy with the title of the work it belongs to
pub async fn list<S: Store>(store: &S) -> CatalogResult<Outcome> {
    let every_copy = Query::all();
    let (copies, works) = tokio::try_join!(
        store.list::<PhysicalCopy>(&every_copy),
        load_work_titles(store)
    )?;

    let titles: HashMap<&str, &str> = works
        .iter()
        .map(|work| (work.id.as_str(), work.title.as_str()))
        .collect();

    let copies: Vec<_> = copies
        .iter()
        .map(|copy| {
            let mut view = copy.to_view();
            if let Some(map) = view.as_object_mut() {
                let title = titles.get(copy.work.as_str()).copied().unwrap_or_default();
                map.insert("work_title".into(), title.into());
            }
            view
        })
        .collect();

    Ok(Outcome::Render(
        View::new("copy_list", "Copy List").with("copy_list", copies),
    ))
}

pub async fn detail<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let copy = require::<PhysicalCopy, _>(store, id).await?;
    let work = store.get::<Work>(&copy.work).await?;

    let title = work.as_ref().map(|w| w.title.as_str()).unwrap_or_default();
    Ok(Outcome::Render(
        View::new("copy_detail", format!("Copy: {}", title))
            .with("copy", copy.to_view())
            .with("work", work.map(|w| w.to_view())),
    ))
}

pub async fn create_form<S: Store>(store: &S) -> CatalogResult<Outcome> {
    Ok(Outcome::Render(copy_form(store, "Create Copy", None, &[]).await?))
}

async fn rejected<S: Store>(
    store: &S,
    title: &str,
    copy: &CopyForm,
    errors: &[FieldError],
) -> CatalogResult<Outcome> {
    Ok(Outcome::Invalid(copy_form(store, title, Some(copy), errors).await?))
}

fn work_not_found() -> Vec<FieldError> {
    vec![FieldError::new("work", "Work not found.")]
}

pub async fn create<S: Store>(store: &S, form: &RawForm) -> CatalogResult<Outcome> {
    let draft = match validate_copy(form) {
        Ok(draft) => draft,
        Err(rejection) => {
            return rejected(store, "Create Copy", &rejection.submission, &rejection.errors).await
        }
    };

    if store.get::<Work>(&draft.work).await?.is_none() {
        return rejected(store, "Create Copy", &CopyForm::from(&draft), &work_not_found()).await;
    }

    let copy = draft.into_copy(generate_id())?;
    store.put(&copy).await?;
    log::info!("Created copy {} of work {}", copy.id, copy.work);

    Ok(Outcome::Redirect(copy.url()))
}

pub async fn update_form<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let copy = require::<PhysicalCopy, _>(store, id).await?;
    let view = copy_form(store, "Update Copy", Some(&CopyForm::from(&copy)), &[]).await?;
    Ok(Outcome::Render(view))
}

pub async fn update<S: Store>(store: &S, id: &Id, form: &RawForm) -> CatalogResult<Outcome> {
    let draft = match validate_copy(form) {
        Ok(draft) => draft,
        Err(rejection) => {
            return rejected(store, "Update Copy", &rejection.submission, &rejection.errors).await
        }
    };

    let (existing, work) = tokio::try_join!(
        store.get::<PhysicalCopy>(id),
        store.get::<Work>(&draft.work)
    )?;

    if existing.is_none() {
        log::debug!("Copy {} is gone, skipping update", id);
        return Ok(Outcome::Redirect(EntityKind::Copy.list_url().to_string()));
    }
    if work.is_none() {
        return rejected(store, "Update Copy", &CopyForm::from(&draft), &work_not_found()).await;
    }

    let copy = draft.into_copy(id.clone())?;
    store.put(&copy).await?;
    log::info!("Updated copy {}", copy.id);

    Ok(Outcome::Redirect(copy.url()))
}

fn delete_view(check: &DeleteCheck) -> View {
    View::new("copy_delete", "Delete Copy")
        .with("copy", check.target_as::<PhysicalCopy>().map(|c| c.to_view()))
        .with("blocked", !check.allowed)
}

pub async fn delete_form<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let check = guard::can_delete(store, EntityKind::Copy, id).await?;
    if check.target.is_none() {
        return Ok(Outcome::Redirect(EntityKind::Copy.list_url().to_string()));
    }
    Ok(Outcome::Render(delete_view(&check)))
}

/// Copies are never referenced, so this always goes through
pub async fn delete<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    match guard::delete(store, EntityKind::Copy, id).await? {
        DeleteOutcome::Deleted | DeleteOutcome::AlreadyAbsent => {
            Ok(Outcome::Redirect(EntityKind::Copy.list_url().to_string()))
        }
        DeleteOutcome::Blocked(check) => Ok(Outcome::Blocked(delete_view(&check))),
    }
}
