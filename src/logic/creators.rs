use crate::error::CatalogResult;
use crate::logic::form_state::{creator_form, creators_by_family_name};
use crate::logic::guard::{self, DeleteCheck, DeleteOutcome};
use crate::logic::lookup::{found, require};
use crate::logic::validate::{validate_creator, CreatorForm};
use crate::model::{generate_id, Creator, Document, EntityKind, Filter, Id, Outcome, Query, RawForm, View, Work};
use crate::store::traits::Store;

pub async fn list<S: Store>(store: &S) -> CatalogResult<Outcome> {
    let creators = store.list::<Creator>(&creators_by_family_name()).await?;
    let creators: Vec<_> = creators.iter().map(Creator::to_view).collect();

    Ok(Outcome::Render(
        View::new("creator_list", "Creator List").with("creator_list", creators),
    ))
}

/// Creator page with their works
pub async fn detail<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let works_query = Query::filtered(Filter::eq("creator", id.as_str())).sorted_by("title");
    let (creator, works) = tokio::try_join!(
        store.get::<Creator>(id),
        store.list::<Work>(&works_query)
    )?;
    let creator = found(creator, id)?;

    let works: Vec<_> = works.iter().map(Work::to_view).collect();
    Ok(Outcome::Render(
        View::new("creator_detail", "Creator Detail")
            .with("creator", creator.to_view())
            .with("creator_works", works),
    ))
}

pub fn create_form() -> Outcome {
    Outcome::Render(creator_form("Create Creator", None, &[]))
}

pub async fn create<S: Store>(store: &S, form: &RawForm) -> CatalogResult<Outcome> {
    let draft = match validate_creator(form) {
        Ok(draft) => draft,
        Err(rejection) => {
            return Ok(Outcome::Invalid(creator_form(
                "Create Creator",
                Some(&rejection.submission),
                &rejection.errors,
            )))
        }
    };

    let creator = draft.into_creator(generate_id());
    store.put(&creator).await?;
    log::info!("Created creator {} ({})", creator.id, creator.name());

    Ok(Outcome::Redirect(creator.url()))
}

pub async fn update_form<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let creator = require::<Creator, _>(store, id).await?;
    Ok(Outcome::Render(creator_form(
        "Update Creator",
        Some(&CreatorForm::from(&creator)),
        &[],
    )))
}

pub async fn update<S: Store>(store: &S, id: &Id, form: &RawForm) -> CatalogResult<Outcome> {
    let draft = match validate_creator(form) {
        Ok(draft) => draft,
        Err(rejection) => {
            return Ok(Outcome::Invalid(creator_form(
                "Update Creator",
                Some(&rejection.submission),
                &rejection.errors,
            )))
        }
    };

    if store.get::<Creator>(id).await?.is_none() {
        log::debug!("Creator {} is gone, skipping update", id);
        return Ok(Outcome::Redirect(EntityKind::Creator.list_url().to_string()));
    }

    let creator = draft.into_creator(id.clone());
    store.put(&creator).await?;
    log::info!("Updated creator {}", creator.id);

    Ok(Outcome::Redirect(creator.url()))
}

fn delete_view(check: &DeleteCheck) -> View {
    View::new("creator_delete", "Delete Creator")
        .with("creator", check.target_as::<Creator>().map(|c| c.to_view()))
        .with("creator_works", check.blocker_views())
        .with("blocked", !check.allowed)
}

pub async fn delete_form<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    let check = guard::can_delete(store, EntityKind::Creator, id).await?;
    if check.target.is_none() {
        return Ok(Outcome::Redirect(EntityKind::Creator.list_url().to_string()));
    }
    Ok(Outcome::Render(delete_view(&check)))
}

pub async fn delete<S: Store>(store: &S, id: &Id) -> CatalogResult<Outcome> {
    match guard::delete(store, EntityKind::Creator, id).await? {
        DeleteOutcome::Deleted | DeleteOutcome::AlreadyAbsent => {
            Ok(Outcome::Redirect(EntityKind::Creator.list_url().to_string()))
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
    async fn test_create_trims_names_and_skips_empty_dates() {
        let store = MemoryStore::new();
        let form = RawForm::new()
            .with("first_name", "  Jane ")
            .with("family_name", "Do3")
            .with("date_of_birth", "");

        let outcome = create(&store, &form).await.unwrap();
        let creators = store.list::<Creator>(&Query::all()).await.unwrap();
        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].first_name, "Jane");
        assert_eq!(creators[0].date_of_birth, None);
        assert_eq!(outcome, Outcome::Redirect(creators[0].url()));
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_the_creator_alone() {
        let store = MemoryStore::new();
        let creator = Creator::new("Mary".to_string(), "Shelley".to_string());
        store.put(&creator).await.unwrap();

        let form = RawForm::new()
            .with("first_name", "Mary")
            .with("family_name", "Wollstonecraft Shelley")
            .with("date_of_birth", "1797-08-30");
        let Outcome::Invalid(view) = update(&store, &creator.id, &form).await.unwrap() else {
            panic!("spaces are not alphanumeric");
        };
        assert_eq!(view.title, "Update Creator");
        assert_eq!(view.values["errors"][0]["field"], "family_name");
        assert_eq!(view.values["creator"]["family_name"], "Wollstonecraft Shelley");
        assert_eq!(view.values["creator"]["date_of_birth"], "1797-08-30");
        assert_eq!(store.get::<Creator>(&creator.id).await.unwrap(), Some(creator));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_family_name() {
        let store = MemoryStore::new();
        for (first, family) in [("Isaac", "Asimov"), ("Ben", "Bova"), ("Jim", "Adams")] {
            store
                .put(&Creator::new(first.to_string(), family.to_string()))
                .await
                .unwrap();
        }

        let outcome = list(&store).await.unwrap();
        let names: Vec<_> = outcome.view().unwrap().values["creator_list"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Adams, Jim", "Asimov, Isaac", "Bova, Ben"]);
    }

    #[tokio::test]
    async fn test_delete_form_lists_blocking_works() {
        let store = MemoryStore::new();
        let creator = Creator::new("Mary".to_string(), "Shelley".to_string());
        store.put(&creator).await.unwrap();
        let work = Work::new(
            "Frankenstein".to_string(),
            creator.id.clone(),
            "A creature".to_string(),
            "isbn".to_string(),
            vec![],
        );
        store.put(&work).await.unwrap();

        let outcome = delete_form(&store, &creator.id).await.unwrap();
        let view = outcome.view().unwrap();
        assert_eq!(view.values["blocked"], true);
        assert_eq!(view.values["creator_works"][0]["title"], "Frankenstein");
        assert_eq!(view.values["creator"]["name"], "Shelley, Mary");

        let missing = delete_form(&store, &"gone".to_string()).await.unwrap();
        assert_eq!(missing, Outcome::Redirect("/catalog/creators".to_string()));
    }
}
