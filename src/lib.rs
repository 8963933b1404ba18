pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod service;

use axum::{Router, middleware, routing::get};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use handlers::rest;
use service::NoteService;

/// Full HTTP surface: the JSON API under `/api`, docs under `/swagger-ui`.
///
/// With `debug` set, 500 responses carry the underlying error instead of the generic message.
pub fn build_router(service: Arc<NoteService>, debug: bool) -> Router {
    let api_router = Router::new()
        .route("/notes", get(rest::get_all_notes).post(rest::create_note))
        .route(
            "/notes/{id}",
            get(rest::get_one_note)
                .put(rest::update_note)
                .delete(rest::delete_note),
        )
        .route("/health", get(rest::health_check))
        .method_not_allowed_fallback(error::method_not_allowed);

    let mut router = Router::new()
        .route("/", get(rest::root))
        .nest("/api", api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()))
        .method_not_allowed_fallback(error::method_not_allowed)
        .fallback(error::unknown_route)
        .with_state(service)
        .layer(CatchPanicLayer::custom(error::panic_response));

    if debug {
        router = router.layer(middleware::from_fn(error::reveal_error_details));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
