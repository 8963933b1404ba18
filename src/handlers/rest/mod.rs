use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{Envelope, HealthStatus, ListParams, NotePayload, NoteRequest, NoteResponse, PageMeta},
    error::AppError,
    models::FieldErrors,
    service::NoteService,
};

pub const CREATED_MESSAGE: &str = "Nota creada exitosamente.";
pub const UPDATED_MESSAGE: &str = "Nota actualizada exitosamente.";
pub const DELETED_MESSAGE: &str = "Nota eliminada exitosamente.";

#[derive(OpenApi)]
#[openapi(
    paths(
        create_note,
        update_note,
        delete_note,
        get_one_note,
        get_all_notes,
        health_check
    ),
    components(schemas(NoteResponse, NoteRequest, PageMeta, HealthStatus)),
    tags(
        (name = "notes", description = "Notes management API"),
        (name = "health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;

fn note_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|_| AppError::NotFound)
}

fn note_payload(payload: Result<Json<NotePayload>, JsonRejection>) -> Result<NoteRequest, AppError> {
    let Json(payload) = payload
        .map_err(|rejection| AppError::Validation(FieldErrors::single("body", rejection.body_text())))?;

    NoteRequest::try_from(payload).map_err(AppError::Validation)
}

#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = NoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let note = service.create_note(note_payload(payload)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(note).with_message(CREATED_MESSAGE)),
    )
        .into_response())
}

#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = NoteResponse),
        (status = 404, description = "Note not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(service): State<Arc<NoteService>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let id = note_id(path)?;
    let note = service.update_note(id, note_payload(payload)?).await?;

    Ok((
        StatusCode::OK,
        Json(Envelope::data(note).with_message(UPDATED_MESSAGE)),
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted successfully"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(service): State<Arc<NoteService>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    service.delete_note(note_id(path)?).await?;

    Ok((
        StatusCode::OK,
        Json(Envelope::data(()).with_message(DELETED_MESSAGE)),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_one_note(
    State(service): State<Arc<NoteService>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let note = service.get_one_note(note_id(path)?).await?;

    Ok((StatusCode::OK, Json(Envelope::data(note))).into_response())
}

#[utoipa::path(
    get,
    path = "/api/notes",
    params(ListParams),
    responses(
        (status = 200, description = "One page of notes, newest first", body = Vec<NoteResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_all_notes(
    State(service): State<Arc<NoteService>>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(pairs) = pairs
        .map_err(|rejection| AppError::Validation(FieldErrors::single("query", rejection.body_text())))?;
    let params = ListParams::from_pairs(pairs);
    let page = service.list_notes(params.q.as_deref(), params.page()).await?;

    Ok((
        StatusCode::OK,
        Json(Envelope::data(page.notes).with_meta(page.meta)),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthStatus),
        (status = 500, description = "Database unreachable", body = HealthStatus)
    ),
    tag = "health"
)]
#[debug_handler]
pub async fn health_check(State(service): State<Arc<NoteService>>) -> Response {
    match service.check_store().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Envelope::data(HealthStatus {
                db: "ok".to_string(),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            let envelope = Envelope {
                data: HealthStatus {
                    db: "error".to_string(),
                },
                message: Some("Database connection failed".to_string()),
                errors: Some(FieldErrors::single(
                    "database",
                    format!("Connection failed: {e}"),
                )),
                meta: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
        }
    }
}

#[debug_handler]
pub async fn root() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Notes API is running" })),
    )
        .into_response()
}
