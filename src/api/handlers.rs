use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::CatalogError;
use crate::logic::{copies, creators, dashboard, tags, works};
use crate::model::{Id, Outcome, RawForm};
use crate::store::traits::Store;

pub type AppState<S> = Arc<S>;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

impl From<CatalogError> for ErrorResponse {
    fn from(error: CatalogError) -> Self {
        ErrorResponse::new(&error.to_string())
    }
}

/// Maps a failed workflow onto a status code
pub fn error_response(error: CatalogError) -> ApiError {
    let status = match &error {
        CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
        CatalogError::InvalidRecord { .. } => StatusCode::BAD_REQUEST,
        CatalogError::Store(e) => {
            log::error!("Store failure: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::from(error)))
}

/// Rendered views go out as JSON; a redirect is a 303 to its target.
pub fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Render(view) => (StatusCode::OK, Json(view)).into_response(),
        Outcome::Invalid(view) => (StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response(),
        Outcome::Blocked(view) => (StatusCode::CONFLICT, Json(view)).into_response(),
        Outcome::Redirect(location) => Redirect::to(&location).into_response(),
    }
}

fn respond(result: Result<Outcome, CatalogError>) -> Result<Response, ApiError> {
    result.map(outcome_response).map_err(error_response)
}

/// Catalog home with record counts
pub async fn index<S: Store>(State(store): State<AppState<S>>) -> Response {
    outcome_response(dashboard::index(&*store).await)
}

pub async fn home() -> Redirect {
    Redirect::to("/catalog")
}

// Creator pages

pub async fn creator_list<S: Store>(State(store): State<AppState<S>>) -> Result<Response, ApiError> {
    respond(creators::list(&*store).await)
}

pub async fn creator_detail<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(creators::detail(&*store, &id).await)
}

pub async fn creator_create_form<S: Store>(
    State(_store): State<AppState<S>>,
) -> Result<Response, ApiError> {
    respond(Ok(creators::create_form()))
}

pub async fn creator_create<S: Store>(
    State(store): State<AppState<S>>,
    Json(form): Json<RawForm>,
) -> Result<Response, ApiError> {
    respond(creators::create(&*store, &form).await)
}

pub async fn creator_update_form<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(creators::update_form(&*store, &id).await)
}

pub async fn creator_update<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    Json(form): Json<RawForm>,
) -> Result<Response, ApiError> {
    respond(creators::update(&*store, &id, &form).await)
}

pub async fn creator_delete_form<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(creators::delete_form(&*store, &id).await)
}

pub async fn creator_delete<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(creators::delete(&*store, &id).await)
}

// Work pages

pub async fn work_list<S: Store>(State(store): State<AppState<S>>) -> Result<Response, ApiError> {
    respond(works::list(&*store).await)
}

pub async fn work_detail<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(works::detail(&*store, &id).await)
}

pub async fn work_create_form<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Response, ApiError> {
    respond(works::create_form(&*store).await)
}

pub async fn work_create<S: Store>(
    State(store): State<AppState<S>>,
    Json(form): Json<RawForm>,
) -> Result<Response, ApiError> {
    respond(works::create(&*store, &form).await)
}

pub async fn work_update_form<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(works::update_form(&*store, &id).await)
}

pub async fn work_update<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    Json(form): Json<RawForm>,
) -> Result<Response, ApiError> {
    respond(works::update(&*store, &id, &form).await)
}

pub async fn work_delete_form<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(works::delete_form(&*store, &id).await)
}

pub async fn work_delete<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(works::delete(&*store, &id).await)
}

// Tag pages

pub async fn tag_list<S: Store>(State(store): State<AppState<S>>) -> Result<Response, ApiError> {
    respond(tags::list(&*store).await)
}

pub async fn tag_detail<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(tags::detail(&*store, &id).await)
}

pub async fn tag_create_form<S: Store>(
    State(_store): State<AppState<S>>,
) -> Result<Response, ApiError> {
    respond(Ok(tags::create_form()))
}

pub async fn tag_create<S: Store>(
    State(store): State<AppState<S>>,
    Json(form): Json<RawForm>,
) -> Result<Response, ApiError> {
    respond(tags::create(&*store, &form).await)
}

pub async fn tag_update_form<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(tags::update_form(&*store, &id).await)
}

pub async fn tag_update<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    Json(form): Json<RawForm>,
) -> Result<Response, ApiError> {
    respond(tags::update(&*store, &id, &form).await)
}

pub async fn tag_delete_form<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(tags::delete_form(&*store, &id).await)
}

pub async fn tag_delete<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(tags::delete(&*store, &id).await)
}

// Copy pages

pub async fn copy_list<S: Store>(State(store): State<AppState<S>>) -> Result<Response, ApiError> {
    respond(copies::list(&*store).await)
}

pub async fn copy_detail<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(copies::detail(&*store, &id).await)
}

pub async fn copy_create_form<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Response, ApiError> {
    respond(copies::create_form(&*store).await)
}

pub async fn copy_create<S: Store>(
    State(store): State<AppState<S>>,
    Json(form): Json<RawForm>,
) -> Result<Response, ApiError> {
    respond(copies::create(&*store, &form).await)
}

pub async fn copy_update_form<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(copies::update_form(&*store, &id).await)
}

pub async fn copy_update<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    Json(form): Json<RawForm>,
) -> Result<Response, ApiError> {
    respond(copies::update(&*store, &id, &form).await)
}

pub async fn copy_delete_form<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(copies::delete_form(&*store, &id).await)
}

pub async fn copy_delete<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    respond(copies::delete(&*store, &id).await)
}
