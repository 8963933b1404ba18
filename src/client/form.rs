use super::{ClientError, NotesClient};
use crate::{
    dto::{NoteRequest, NoteResponse},
    models::{FieldErrors, NoteDraft},
};

pub const SAVE_ERROR_MESSAGE: &str = "Error al guardar la nota.";

/// Create/edit form state.
///
/// Failed submissions leave `title` and `content` untouched so the user can retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteForm {
    title: String,
    content: String,
    editing: Option<i64>,
    field_errors: FieldErrors,
    error: Option<String>,
}

impl NoteForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an existing note into the form.
    pub async fn edit(client: &NotesClient, id: i64) -> Result<Self, ClientError> {
        let note = client.get_note(id).await?;

        Ok(Self {
            title: note.title,
            content: note.content.unwrap_or_default(),
            editing: Some(id),
            ..Self::default()
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn editing(&self) -> Option<i64> {
        self.editing
    }

    pub const fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.field_errors.remove("title");
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.field_errors.remove("content");
    }

    /// Applies the same title rules the API enforces.
    pub fn validate(&mut self) -> bool {
        match NoteDraft::parse(Some(self.title.as_str()), Some(self.content.as_str())) {
            Ok(_) => {
                self.field_errors = FieldErrors::default();
                true
            }
            Err(errors) => {
                self.field_errors = errors;
                false
            }
        }
    }

    /// Validates locally, then creates or updates the note.
    ///
    /// Returns `None` on failure, with `field_errors` or `error` describing why.
    pub async fn submit(&mut self, client: &NotesClient) -> Option<NoteResponse> {
        if !self.validate() {
            return None;
        }

        let request = NoteRequest::new(self.title.clone(), Some(self.content.as_str()));
        let result = match self.editing {
            Some(id) => client.update_note(id, &request).await,
            None => client.create_note(&request).await,
        };

        match result {
            Ok(note) => {
                self.error = None;
                self.editing = Some(note.id);
                Some(note)
            }
            Err(ClientError::Validation(errors)) => {
                self.error = Some(errors.to_string());
                self.field_errors = errors;
                None
            }
            Err(e) => {
                tracing::warn!("failed to save note: {}", e);
                self.error = Some(SAVE_ERROR_MESSAGE.to_string());
                None
            }
        }
    }
}
