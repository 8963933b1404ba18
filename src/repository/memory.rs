use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use std::collections::BTreeMap;

use super::{NoteStore, SearchFilter, SearchResult, StoreError};
use crate::models::{Note, NoteDraft};

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Note>,
}

/// Process-local store with the same ordering and filtering rules as the SQL table.
#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn title_matches(title: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|needle| title.to_lowercase().contains(&needle.to_lowercase()))
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn create_note(&self, draft: &NoteDraft) -> Result<Note, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let now = Utc::now();
        let note = Note {
            id: table.last_id,
            title: draft.title().to_owned(),
            content: draft.content().map(ToOwned::to_owned),
            created_at: now,
            updated_at: now,
        };

        table.rows.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: i64, draft: &NoteDraft) -> Result<Option<Note>, StoreError> {
        let mut table = self.table.write().await;

        Ok(table.rows.get_mut(&id).map(|note| {
            note.title = draft.title().to_owned();
            note.content = draft.content().map(ToOwned::to_owned);
            note.updated_at = Utc::now().max(note.created_at);
            note.clone()
        }))
    }

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn get_one_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn search_notes(&self, filter: &SearchFilter) -> Result<SearchResult, StoreError> {
        let table = self.table.read().await;
        let needle = filter.title_contains.as_deref();

        let mut matching: Vec<&Note> = table
            .rows
            .values()
            .filter(|note| title_matches(&note.title, needle))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        let offset = usize::try_from(filter.offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(filter.limit.max(0)).unwrap_or(usize::MAX);

        Ok(SearchResult {
            notes: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            total,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> NoteDraft {
        NoteDraft::parse(Some(title), None).unwrap()
    }

    fn everything() -> SearchFilter {
        SearchFilter {
            title_contains: None,
            limit: 100,
            offset: 0,
        }
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let store = MemoryStore::new();
        let first = store.create_note(&draft("uno")).await.unwrap();
        assert!(store.delete_note(first.id).await.unwrap());

        let second = store.create_note(&draft("dos")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn missing_rows_report_absence() {
        let store = MemoryStore::new();
        assert_eq!(store.get_one_note(42).await.unwrap(), None);
        assert_eq!(store.update_note(42, &draft("x")).await.unwrap(), None);
        assert!(!store.delete_note(42).await.unwrap());
    }

    #[tokio::test]
    async fn equal_timestamps_order_by_descending_id() {
        let store = MemoryStore::new();
        for title in ["a", "b", "c"] {
            store.create_note(&draft(title)).await.unwrap();
        }
        {
            let mut table = store.table.write().await;
            let stamp = Utc::now();
            for note in table.rows.values_mut() {
                note.created_at = stamp;
                note.updated_at = stamp;
            }
        }

        let ids: Vec<i64> = store
            .search_notes(&everything())
            .await
            .unwrap()
            .notes
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_counts_all_matches() {
        let store = MemoryStore::new();
        for title in ["Laravel Tutorial", "laravel tips", "React Guide"] {
            store.create_note(&draft(title)).await.unwrap();
        }

        let result = store
            .search_notes(&SearchFilter {
                title_contains: Some("LARAVEL".to_string()),
                limit: 1,
                offset: 0,
            })
            .await
            .unwrap();

        assert_eq!(result.total, 2);
        assert_eq!(result.notes.len(), 1);
    }

    #[tokio::test]
    async fn offset_past_the_end_is_empty() {
        let store = MemoryStore::new();
        store.create_note(&draft("solo")).await.unwrap();

        let result = store
            .search_notes(&SearchFilter {
                title_contains: None,
                limit: 10,
                offset: 10,
            })
            .await
            .unwrap();

        assert!(result.notes.is_empty());
        assert_eq!(result.total, 1);
    }
}
