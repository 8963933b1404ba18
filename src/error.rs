use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use std::{any::Any, sync::Arc};

use crate::{dto::Envelope, models::FieldErrors, repository::StoreError};

pub const INVALID_DATA_MESSAGE: &str = "Los datos proporcionados no son válidos.";
pub const NOT_FOUND_MESSAGE: &str = "El recurso solicitado no fue encontrado.";
pub const UNKNOWN_ROUTE_MESSAGE: &str = "Endpoint no encontrado.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Método HTTP no permitido.";
pub const SERVER_ERROR_MESSAGE: &str = "Ha ocurrido un error interno del servidor.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("the given data was invalid: {0}")]
    Validation(FieldErrors),

    #[error("resource not found")]
    NotFound,

    #[error("endpoint not found")]
    UnknownRoute,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("note store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("{0}")]
    Unhandled(String),
}

/// Diagnostic detail attached to redacted 500 responses.
///
/// Picked up by [`reveal_error_details`] when the server runs in debug mode.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    pub chain: Vec<String>,
}

impl ErrorDetail {
    fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }

        Self {
            message: err.to_string(),
            chain,
        }
    }
}

impl AppError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound | Self::UnknownRoute => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::StoreUnavailable(_) | Self::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_body(&self) -> (&'static str, FieldErrors) {
        match self {
            Self::Validation(errors) => (INVALID_DATA_MESSAGE, errors.clone()),
            Self::NotFound => (
                NOT_FOUND_MESSAGE,
                FieldErrors::single("resource", "Resource not found"),
            ),
            Self::UnknownRoute => (
                UNKNOWN_ROUTE_MESSAGE,
                FieldErrors::single("endpoint", "Endpoint not found"),
            ),
            Self::MethodNotAllowed => (
                METHOD_NOT_ALLOWED_MESSAGE,
                FieldErrors::single("method", "Method not allowed"),
            ),
            Self::StoreUnavailable(_) | Self::Unhandled(_) => (
                SERVER_ERROR_MESSAGE,
                FieldErrors::single("server", "Internal server error"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = self.public_body();

        let mut response =
            (status, Json(Envelope::<()>::error(message, errors))).into_response();

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
            response
                .extensions_mut()
                .insert(Arc::new(ErrorDetail::from_error(&self)));
        }

        response
    }
}

/// Replaces the generic 500 envelope with the underlying error and its source chain.
pub async fn reveal_error_details(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(detail) = response.extensions().get::<Arc<ErrorDetail>>().cloned() else {
        return response;
    };

    let mut errors = FieldErrors::default();
    if detail.chain.is_empty() {
        errors.add("debug", detail.message.clone());
    }
    for cause in &detail.chain {
        errors.add("debug", cause.clone());
    }

    (
        response.status(),
        Json(Envelope::<()>::error(detail.message.clone(), errors)),
    )
        .into_response()
}

/// Turns a panic caught by `CatchPanicLayer` into the generic 500 envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "unknown panic payload".to_string());

    AppError::Unhandled(format!("handler panicked: {message}")).into_response()
}

pub async fn unknown_route() -> AppError {
    AppError::UnknownRoute
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
