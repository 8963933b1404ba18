use async_trait::async_trait;
use notes_api::{
    build_router,
    client::{ClientError, NoteForm, NoteList, NotesClient, SAVE_ERROR_MESSAGE},
    dto::NoteRequest,
    models::{Note, NoteDraft},
    repository::{MemoryStore, NoteStore, SearchFilter, SearchResult, StoreError},
    service::NoteService,
};

use std::{sync::Arc, time::Duration};

/// Serves the API over a real socket and returns its base URL.
async fn serve() -> String {
    serve_store(Arc::new(MemoryStore::new())).await
}

async fn serve_store(store: Arc<dyn NoteStore>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let router = build_router(Arc::new(NoteService::new(store)), false);

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server");
    });

    format!("http://{addr}/api")
}

/// Memory store that answers first-page listings only after a delay.
struct SlowFirstPage {
    inner: MemoryStore,
    delay: Duration,
}

#[async_trait]
impl NoteStore for SlowFirstPage {
    async fn create_note(&self, draft: &NoteDraft) -> Result<Note, StoreError> {
        self.inner.create_note(draft).await
    }

    async fn update_note(&self, id: i64, draft: &NoteDraft) -> Result<Option<Note>, StoreError> {
        self.inner.update_note(id, draft).await
    }

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        self.inner.delete_note(id).await
    }

    async fn get_one_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        self.inner.get_one_note(id).await
    }

    async fn search_notes(&self, filter: &SearchFilter) -> Result<SearchResult, StoreError> {
        let result = self.inner.search_notes(filter).await;
        if filter.offset == 0 {
            tokio::time::sleep(self.delay).await;
        }
        result
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

async fn client() -> NotesClient {
    NotesClient::new(serve().await).expect("client")
}

async fn seed(client: &NotesClient, titles: &[&str]) -> Vec<i64> {
    let mut ids = Vec::new();
    for title in titles {
        let note = client
            .create_note(&NoteRequest::new(*title, None))
            .await
            .expect("create");
        ids.push(note.id);
    }
    ids
}

#[tokio::test(flavor = "multi_thread")]
async fn create_then_read_round_trips() {
    let client = client().await;
    let created = client
        .create_note(&NoteRequest::new(
            "Mi primera nota",
            Some("Esta es una nota de prueba para verificar que el sistema funciona correctamente."),
        ))
        .await
        .unwrap();

    let read = client.get_note(created.id).await.unwrap();
    assert_eq!(read, created);
    assert_eq!(read.title, "Mi primera nota");
    assert_eq!(read.created_at, read.updated_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_moves_updated_at_forward_only() {
    let client = client().await;
    let created = client
        .create_note(&NoteRequest::new("Lista de tareas", Some("- Revisar el código")))
        .await
        .unwrap();

    let updated = client
        .update_note(created.id, &NoteRequest::new("Lista de tareas", Some("- Hacer los tests")))
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.content.as_deref(), Some("- Hacer los tests"));
}

#[tokio::test(flavor = "multi_thread")]
async fn validation_errors_are_typed() {
    let client = client().await;
    let err = client
        .create_note(&NoteRequest::new("", Some("sin título")))
        .await
        .unwrap_err();

    match err {
        ClientError::Validation(errors) => assert!(errors.get("title").is_some()),
        other => panic!("expected validation error, got {other:?}"),
    }

    let page = client.list_notes("", 1).await.unwrap();
    assert_eq!(page.meta.total, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_notes_are_404() {
    let client = client().await;

    let err = client.get_note(404).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let err = client.delete_note(404).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test(flavor = "multi_thread")]
async fn health_is_ok() {
    let client = client().await;
    assert_eq!(client.health().await.unwrap().db, "ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn list_search_and_pages() {
    let client = client().await;
    seed(&client, &["Laravel Tutorial", "React Guide", "Vue.js Basics"]).await;

    let page = client.list_notes("Laravel", 1).await.unwrap();
    assert_eq!(page.notes.len(), 1);
    assert_eq!(page.notes[0].title, "Laravel Tutorial");

    let page = client.list_notes("", 3).await.unwrap();
    assert!(page.notes.is_empty());
    assert_eq!(page.meta.current_page, 3);
    assert_eq!(page.meta.last_page, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn debounced_search_only_issues_the_last_keystroke() {
    let client = client().await;
    seed(&client, &["Laravel Tutorial", "React Guide", "Vue.js Basics"]).await;

    let list = NoteList::with_debounce(client, Duration::from_millis(100));
    let typing = list.clone();

    let (first, second) = tokio::join!(list.set_search("React"), async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        typing.set_search(" Laravel ").await
    });

    assert!(!first);
    assert!(second);

    let snapshot = list.snapshot().await;
    assert_eq!(snapshot.search_input, " Laravel ");
    assert_eq!(snapshot.query, "Laravel");
    assert_eq!(snapshot.notes.len(), 1);
    assert_eq!(snapshot.notes[0].title, "Laravel Tutorial");
    assert!(!snapshot.loading);
    assert!(snapshot.pagination().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn latest_issued_page_wins() {
    let client = client().await;
    let titles: Vec<String> = (1..=25).map(|i| format!("Nota {i}")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    seed(&client, &refs).await;

    let list = NoteList::new(client);
    assert!(list.refresh().await);

    let other = list.clone();
    tokio::join!(list.go_to_page(1), other.go_to_page(2));

    let snapshot = list.snapshot().await;
    assert_eq!(snapshot.page, 2);
    assert_eq!(snapshot.notes[0].title, "Nota 15");
    assert!(!snapshot.loading);

    let pagination = snapshot.pagination().expect("three pages");
    assert!(!pagination.previous_disabled());
    assert!(!pagination.next_disabled());
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_response_arriving_last_is_discarded() {
    let store = Arc::new(SlowFirstPage {
        inner: MemoryStore::new(),
        delay: Duration::from_millis(300),
    });
    let client = NotesClient::new(serve_store(store).await).expect("client");
    let titles: Vec<String> = (1..=25).map(|i| format!("Nota {i}")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    seed(&client, &refs).await;

    let list = NoteList::new(client);
    let other = list.clone();

    // page 1 is issued first but its response lands after page 2's
    let (first, second) = tokio::join!(list.go_to_page(1), other.go_to_page(2));
    assert!(!first);
    assert!(second);

    let snapshot = list.snapshot().await;
    assert_eq!(snapshot.page, 2);
    assert_eq!(snapshot.meta.map(|m| m.current_page), Some(2));
    assert_eq!(snapshot.notes[0].title, "Nota 15");
    assert!(!snapshot.loading);
}

#[tokio::test(flavor = "multi_thread")]
async fn navigation_is_clamped_to_known_pages() {
    let client = client().await;
    let titles: Vec<String> = (1..=12).map(|i| format!("Nota {i}")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    seed(&client, &refs).await;

    let list = NoteList::new(client);
    list.refresh().await;
    list.go_to_page(9).await;

    let snapshot = list.snapshot().await;
    assert_eq!(snapshot.page, 2);
    assert_eq!(snapshot.notes.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_last_item_on_a_page_steps_back() {
    let client = client().await;
    let titles: Vec<String> = (1..=11).map(|i| format!("Nota {i}")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let ids = seed(&client, &refs).await;

    let list = NoteList::new(client);
    list.refresh().await;
    list.go_to_page(2).await;

    let snapshot = list.snapshot().await;
    assert_eq!(snapshot.notes.len(), 1);
    assert_eq!(snapshot.notes[0].id, ids[0]);

    list.delete(ids[0]).await.unwrap();

    let snapshot = list.snapshot().await;
    assert_eq!(snapshot.page, 1);
    assert_eq!(snapshot.notes.len(), 10);
    assert_eq!(snapshot.meta.map(|m| m.last_page), Some(1));
    assert!(snapshot.error.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_delete_keeps_the_list() {
    let client = client().await;
    seed(&client, &["Nota"]).await;

    let list = NoteList::new(client);
    list.refresh().await;

    assert!(list.delete(999).await.is_err());

    let snapshot = list.snapshot().await;
    assert_eq!(snapshot.notes.len(), 1);
    assert!(snapshot.error.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn form_creates_then_edits() {
    let client = client().await;

    let mut form = NoteForm::new();
    form.set_title("Recordatorio importante");
    let created = form.submit(&client).await.expect("created");
    assert_eq!(created.content, None);
    assert_eq!(form.editing(), Some(created.id));

    let mut form = NoteForm::edit(&client, created.id).await.unwrap();
    assert_eq!(form.title(), "Recordatorio importante");
    form.set_content("Llamar mañana");
    let updated = form.submit(&client).await.expect("updated");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.content.as_deref(), Some("Llamar mañana"));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_submit_keeps_input() {
    let client = client().await;
    let ids = seed(&client, &["Efímera"]).await;

    let mut form = NoteForm::edit(&client, ids[0]).await.unwrap();
    client.delete_note(ids[0]).await.unwrap();

    form.set_title("Cambio perdido");
    form.set_content("texto en curso");
    assert!(form.submit(&client).await.is_none());

    assert_eq!(form.error(), Some(SAVE_ERROR_MESSAGE));
    assert_eq!(form.title(), "Cambio perdido");
    assert_eq!(form.content(), "texto en curso");
}
