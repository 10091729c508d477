use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::api::handlers;
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::home))
        .route("/catalog", get(handlers::index::<S>))
        // Creators
        .route("/catalog/creators", get(handlers::creator_list::<S>))
        .route(
            "/catalog/creator/create",
            get(handlers::creator_create_form::<S>).post(handlers::creator_create::<S>),
        )
        .route("/catalog/creator/:id", get(handlers::creator_detail::<S>))
        .route(
            "/catalog/creator/:id/update",
            get(handlers::creator_update_form::<S>).post(handlers::creator_update::<S>),
        )
        .route(
            "/catalog/creator/:id/delete",
            get(handlers::creator_delete_form::<S>).post(handlers::creator_delete::<S>),
        )
        // Works
        .route("/catalog/works", get(handlers::work_list::<S>))
        .route(
            "/catalog/work/create",
            get(handlers::work_create_form::<S>).post(handlers::work_create::<S>),
        )
        .route("/catalog/work/:id", get(handlers::work_detail::<S>))
        .route(
            "/catalog/work/:id/update",
            get(handlers::work_update_form::<S>).post(handlers::work_update::<S>),
        )
        .route(
            "/catalog/work/:id/delete",
            get(handlers::work_delete_form::<S>).post(handlers::work_delete::<S>),
        )
        // Tags
        .route("/catalog/tags", get(handlers::tag_list::<S>))
        .route(
            "/catalog/tag/create",
            get(handlers::tag_create_form::<S>).post(handlers::tag_create::<S>),
        )
        .route("/catalog/tag/:id", get(handlers::tag_detail::<S>))
        .route(
            "/catalog/tag/:id/update",
            get(handlers::tag_update_form::<S>).post(handlers::tag_update::<S>),
        )
        .route(
            "/catalog/tag/:id/delete",
            get(handlers::tag_delete_form::<S>).post(handlers::tag_delete::<S>),
        )
        // Copies
        .route("/catalog/copies", get(handlers::copy_list::<S>))
        .route(
            "/catalog/copy/create",
            get(handlers::copy_create_form::<S>).post(handlers::copy_create::<S>),
        )
        .route("/catalog/copy/:id", get(handlers::copy_detail::<S>))
        .route(
            "/catalog/copy/:id/update",
            get(handlers::copy_update_form::<S>).post(handlers::copy_update::<S>),
        )
        .route(
            "/catalog/copy/:id/delete",
            get(handlers::copy_delete_form::<S>).post(handlers::copy_delete::<S>),
        )
        .layer(ServiceBuilder::new().layer(CatchPanicLayer::new()))
}
