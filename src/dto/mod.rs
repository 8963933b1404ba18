use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{FieldErrors, Note};

/// Response shape shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    pub message: Option<String>,
    pub errors: Option<FieldErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T> Envelope<T> {
    pub const fn data(data: T) -> Self {
        Self {
            data,
            message: None,
            errors: None,
            meta: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl Envelope<()> {
    pub fn error(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            data: (),
            message: Some(message.into()),
            errors: Some(errors),
            meta: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,
    /// Note title
    pub title: String,
    /// Note content
    pub content: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Body of create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NoteRequest {
    /// Note title, required, at most 255 characters
    pub title: Option<String>,
    /// Note content
    pub content: Option<String>,
}

impl NoteRequest {
    pub fn new(title: impl Into<String>, content: Option<&str>) -> Self {
        Self {
            title: Some(title.into()),
            content: content.map(ToOwned::to_owned),
        }
    }
}

/// Create/update body as received, before field types are checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotePayload {
    #[serde(default)]
    pub title: Option<serde_json::Value>,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

fn text_field(
    name: &str,
    value: Option<serde_json::Value>,
    errors: &mut FieldErrors,
) -> Option<String> {
    match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(_) => {
            errors.add(name, format!("The {name} field must be a string."));
            None
        }
    }
}

impl TryFrom<NotePayload> for NoteRequest {
    type Error = FieldErrors;

    fn try_from(payload: NotePayload) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::default();
        let title = text_field("title", payload.title, &mut errors);
        let content = text_field("content", payload.content, &mut errors);

        if errors.is_empty() {
            Ok(Self { title, content })
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Case-insensitive title filter
    pub q: Option<String>,
    /// Page number, starting at 1
    pub page: Option<String>,
}

impl ListParams {
    /// Collects the known keys from raw query pairs; a repeated key keeps its last value.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::default(), |mut params, (key, value)| {
                match key.as_str() {
                    "q" => params.q = Some(value),
                    "page" => params.page = Some(value),
                    _ => {}
                }
                params
            })
    }

    /// Page requested by the client; anything that is not a positive integer means page 1.
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl PageMeta {
    pub fn new(requested_page: i64, total: i64, per_page: i64) -> Self {
        let per_page = per_page.max(1);
        let total = total.max(0);

        Self {
            current_page: requested_page.max(1),
            last_page: ((total + per_page - 1) / per_page).max(1),
            per_page,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePage {
    pub notes: Vec<NoteResponse>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// "ok" or "error"
    pub db: String,
}
