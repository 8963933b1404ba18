use async_trait::async_trait;
use tokio_postgres::{Client, NoTls, Row, types::ToSql};

use super::{NoteStore, SearchFilter, SearchResult, StoreError, embedded::migrations};
use crate::models::{Note, NoteDraft};

const NOTE_COLUMNS: &str = "id, title, content, created_at, updated_at";

const TITLE_FILTER: &str = r"($1::TEXT IS NULL OR title ILIKE $1 ESCAPE '\')";

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub async fn connect(database_dsn: &str) -> Result<Self, StoreError> {
        let (client, con) = tokio_postgres::connect(database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    pub async fn migrate(&mut self) -> Result<(), StoreError> {
        let migrations_report = migrations::runner().run_async(&mut self.client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }
}

fn note_from_row(row: &Row) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Turns a user search into an `ILIKE` pattern that matches it literally.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl NoteStore for PostgresStore {
    async fn create_note(&self, draft: &NoteDraft) -> Result<Note, StoreError> {
        let row = self
            .client
            .query_one(
                format!("INSERT INTO notes (title, content) VALUES ($1, $2) RETURNING {NOTE_COLUMNS}")
                    .as_str(),
                &[&draft.title(), &draft.content()],
            )
            .await?;

        Ok(note_from_row(&row))
    }

    async fn update_note(&self, id: i64, draft: &NoteDraft) -> Result<Option<Note>, StoreError> {
        let row = self
            .client
            .query_opt(
                format!(
                    "UPDATE notes SET title = $1, content = $2, updated_at = GREATEST(now(), created_at) \
                     WHERE id = $3 RETURNING {NOTE_COLUMNS}"
                )
                .as_str(),
                &[&draft.title(), &draft.content(), &id],
            )
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        let rows = self
            .client
            .execute("DELETE FROM notes WHERE id = $1", &[&id])
            .await?;

        Ok(rows == 1)
    }

    async fn get_one_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        let row = self
            .client
            .query_opt(
                format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1").as_str(),
                &[&id],
            )
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn search_notes(&self, filter: &SearchFilter) -> Result<SearchResult, StoreError> {
        let pattern = filter.title_contains.as_deref().map(contains_pattern);

        let count_sql = format!("SELECT COUNT(*) AS total FROM notes WHERE {TITLE_FILTER}");
        let page_sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE {TITLE_FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );

        let count_params: [&(dyn ToSql + Sync); 1] = [&pattern];
        let page_params: [&(dyn ToSql + Sync); 3] = [&pattern, &filter.limit, &filter.offset];

        let (count_row, rows) = tokio::try_join!(
            self.client.query_one(count_sql.as_str(), &count_params),
            self.client.query(page_sql.as_str(), &page_params),
        )?;

        Ok(SearchResult {
            notes: rows.iter().map(note_from_row).collect(),
            total: count_row.get("total"),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.client.is_closed() {
            return Err(StoreError::Closed);
        }
        self.client.simple_query("SELECT 1").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_wraps_plain_search() {
        assert_eq!(contains_pattern("Laravel"), "%Laravel%");
    }

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off\\"), r"%50\%\_off\\%");
    }
}
