use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use std::time::Duration;

use crate::{
    dto::{Envelope, HealthStatus, NotePage, NoteRequest, NoteResponse},
    models::FieldErrors,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// 422 from the API, messages keyed by field.
    #[error("{0}")]
    Validation(FieldErrors),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("list response is missing pagination metadata")]
    MissingMeta,
}

impl ClientError {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Validation(_) => Some(422),
            Self::Api { status, .. } => Some(*status),
            Self::Http(_) | Self::MissingMeta => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    errors: Option<FieldErrors>,
}

/// Typed client for the notes API.
#[derive(Debug, Clone)]
pub struct NotesClient {
    http: Client,
    base_url: String,
}

impl NotesClient {
    /// `base_url` is the API root, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Making {} request to: {}", method, url);
        self.http.request(method, url)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<Envelope<T>, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        tracing::debug!("API error {}: {:?}", status, body.message);

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
                return Err(ClientError::Validation(errors));
            }
        }

        Err(ClientError::Api {
            status: status.as_u16(),
            message: body.message.unwrap_or_else(|| status.to_string()),
        })
    }

    /// Fetches one page; an empty `search` lists everything.
    pub async fn list_notes(&self, search: &str, page: i64) -> Result<NotePage, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if !search.is_empty() {
            query.push(("q", search.to_string()));
        }
        if page > 1 {
            query.push(("page", page.to_string()));
        }

        let envelope: Envelope<Vec<NoteResponse>> =
            Self::send(self.request(Method::GET, "/notes").query(&query)).await?;

        Ok(NotePage {
            notes: envelope.data,
            meta: envelope.meta.ok_or(ClientError::MissingMeta)?,
        })
    }

    pub async fn get_note(&self, id: i64) -> Result<NoteResponse, ClientError> {
        let envelope = Self::send(self.request(Method::GET, &format!("/notes/{id}"))).await?;
        Ok(envelope.data)
    }

    pub async fn create_note(&self, request: &NoteRequest) -> Result<NoteResponse, ClientError> {
        let envelope = Self::send(self.request(Method::POST, "/notes").json(request)).await?;
        Ok(envelope.data)
    }

    pub async fn update_note(
        &self,
        id: i64,
        request: &NoteRequest,
    ) -> Result<NoteResponse, ClientError> {
        let envelope =
            Self::send(self.request(Method::PUT, &format!("/notes/{id}")).json(request)).await?;
        Ok(envelope.data)
    }

    pub async fn delete_note(&self, id: i64) -> Result<(), ClientError> {
        let envelope: Envelope<()> =
            Self::send(self.request(Method::DELETE, &format!("/notes/{id}"))).await?;
        Ok(envelope.data)
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let envelope = Self::send(self.request(Method::GET, "/health")).await?;
        Ok(envelope.data)
    }
}
