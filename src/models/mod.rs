use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

pub const TITLE_MAX_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Title and content that passed validation and are ready to be stored.
///
/// Store backends only accept drafts, so an invalid title never reaches the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    title: String,
    content: Option<String>,
}

impl NoteDraft {
    /// Trims both fields, turns blank content into `None` and checks the title rules.
    pub fn parse(title: Option<&str>, content: Option<&str>) -> Result<Self, FieldErrors> {
        let title = title.map(str::trim).unwrap_or_default();

        let mut errors = FieldErrors::default();
        if title.is_empty() {
            errors.add("title", "The title field is required.");
        } else if title.chars().count() > TITLE_MAX_CHARS {
            errors.add(
                "title",
                format!("The title field must not be greater than {TITLE_MAX_CHARS} characters."),
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let content = content
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToOwned::to_owned);

        Ok(Self {
            title: title.to_owned(),
            content,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.0.values().flatten().map(String::as_str).collect();
        write!(f, "{}", messages.join(", "))
    }
}
