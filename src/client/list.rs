use tokio::sync::Mutex;

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use super::{ClientError, NotesClient};
use crate::{
    dto::{NoteResponse, PageMeta},
    pagination::Pagination,
};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

pub const LOAD_ERROR_MESSAGE: &str = "Error al cargar notas.";
pub const DELETE_ERROR_MESSAGE: &str = "No se pudo borrar la nota.";

/// Hands out increasing tickets to list requests and accepts a response only if no
/// later-issued request has already been applied.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestSequencer {
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn accept(&self, ticket: u64) -> bool {
        self.applied.fetch_max(ticket, Ordering::SeqCst) < ticket
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshot {
    /// Text in the search box, possibly not yet submitted
    pub search_input: String,
    /// Search the current items were fetched with
    pub query: String,
    pub page: i64,
    pub notes: Vec<NoteResponse>,
    pub meta: Option<PageMeta>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ListSnapshot {
    /// Pagination control, or `None` when there is a single page.
    pub fn pagination(&self) -> Option<Pagination> {
        self.meta
            .as_ref()
            .map(Pagination::from)
            .filter(Pagination::is_visible)
    }

    /// Nothing matched and nothing is pending or failing.
    pub fn is_empty(&self) -> bool {
        !self.loading && self.error.is_none() && self.notes.is_empty()
    }
}

struct Inner {
    client: NotesClient,
    sequencer: RequestSequencer,
    keystrokes: AtomicU64,
    debounce: Duration,
    state: Mutex<ListSnapshot>,
}

/// State behind the notes list view: search box, current page and loaded items.
///
/// Cheap to clone; clones share state, so a UI can fire searches and page changes
/// concurrently and still end up showing the most recently requested page.
#[derive(Clone)]
pub struct NoteList {
    inner: Arc<Inner>,
}

impl NoteList {
    pub fn new(client: NotesClient) -> Self {
        Self::with_debounce(client, SEARCH_DEBOUNCE)
    }

    pub fn with_debounce(client: NotesClient, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                sequencer: RequestSequencer::default(),
                keystrokes: AtomicU64::new(0),
                debounce,
                state: Mutex::new(ListSnapshot {
                    page: 1,
                    ..ListSnapshot::default()
                }),
            }),
        }
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        self.inner.state.lock().await.clone()
    }

    /// Reloads the current search and page.
    pub async fn refresh(&self) -> bool {
        let (query, page) = {
            let state = self.inner.state.lock().await;
            (state.query.clone(), state.page)
        };
        self.load(query, page).await
    }

    /// Records a keystroke in the search box and, once typing pauses for the debounce
    /// interval, searches from page 1.
    ///
    /// Returns `false` when a later keystroke superseded this one.
    pub async fn set_search(&self, input: &str) -> bool {
        let stroke = self.inner.keystrokes.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.lock().await.search_input = input.to_string();

        tokio::time::sleep(self.inner.debounce).await;
        if self.inner.keystrokes.load(Ordering::SeqCst) != stroke {
            return false;
        }

        let query = input.trim().to_string();
        {
            let mut state = self.inner.state.lock().await;
            state.query.clone_from(&query);
            state.page = 1;
        }
        self.load(query, 1).await
    }

    /// Navigates to `page`, clamped to the known page range.
    pub async fn go_to_page(&self, page: i64) -> bool {
        let (query, target) = {
            let mut state = self.inner.state.lock().await;
            let target = state
                .meta
                .as_ref()
                .map_or(page.max(1), |meta| Pagination::from(meta).target(page));
            state.page = target;
            (state.query.clone(), target)
        };
        self.load(query, target).await
    }

    /// Deletes a note and reloads; steps back a page when the current one became empty.
    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        if let Err(e) = self.inner.client.delete_note(id).await {
            tracing::warn!("failed to delete note {}: {}", id, e);
            self.inner.state.lock().await.error = Some(DELETE_ERROR_MESSAGE.to_string());
            return Err(e);
        }

        let (query, page) = {
            let state = self.inner.state.lock().await;
            (state.query.clone(), state.page)
        };
        self.load(query.clone(), page).await;

        let step_back = {
            let mut state = self.inner.state.lock().await;
            let emptied = state.page == page
                && page > 1
                && state.notes.is_empty()
                && state.error.is_none();
            let meta = state.meta;
            match meta {
                Some(meta) if emptied => {
                    let target = meta.last_page.min(page - 1).max(1);
                    state.page = target;
                    Some(target)
                }
                _ => None,
            }
        };

        if let Some(target) = step_back {
            tracing::debug!("page {} emptied by delete, moving to page {}", page, target);
            self.load(query, target).await;
        }

        Ok(())
    }

    /// Issues one list request; the response is dropped if a later-issued one already landed.
    async fn load(&self, query: String, page: i64) -> bool {
        let ticket = self.inner.sequencer.issue();
        {
            let mut state = self.inner.state.lock().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.inner.client.list_notes(&query, page).await;

        let mut state = self.inner.state.lock().await;
        if !self.inner.sequencer.accept(ticket) {
            tracing::debug!("discarding stale list response #{}", ticket);
            return false;
        }

        state.loading = !self.inner.sequencer.is_latest(ticket);
        match result {
            Ok(fetched) => {
                state.query = query;
                state.page = fetched.meta.current_page;
                state.notes = fetched.notes;
                state.meta = Some(fetched.meta);
                state.error = None;
            }
            Err(e) => {
                tracing::warn!("failed to load notes: {}", e);
                state.error = Some(LOAD_ERROR_MESSAGE.to_string());
            }
        }
        true
    }
}
