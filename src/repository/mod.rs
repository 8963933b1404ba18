mod embedded;
mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;

use crate::models::{Note, NoteDraft};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("migration error: {0}")]
    Migration(#[from] refinery::Error),

    #[error("store connection is closed")]
    Closed,
}

/// Title filter plus the slice of the ordered result to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub title_contains: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Newest first, ties broken by descending id
    pub notes: Vec<Note>,
    /// Number of notes matching the filter, ignoring limit and offset
    pub total: i64,
}

/// Persistence of notes.
///
/// Absence is reported as `None` / `false` rather than as an error; the service decides
/// what a missing note means for the caller.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create_note(&self, draft: &NoteDraft) -> Result<Note, StoreError>;

    async fn update_note(&self, id: i64, draft: &NoteDraft) -> Result<Option<Note>, StoreError>;

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError>;

    async fn get_one_note(&self, id: i64) -> Result<Option<Note>, StoreError>;

    async fn search_notes(&self, filter: &SearchFilter) -> Result<SearchResult, StoreError>;

    /// Cheap round trip used by the health probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
