use crate::{
    dto::{NotePage, NoteRequest, NoteResponse, PageMeta},
    error::AppError,
    models::NoteDraft,
    repository::{NoteStore, SearchFilter, StoreError},
};

use std::sync::Arc;

pub const PER_PAGE: i64 = 10;

const GENERATED_SAMPLES: usize = 15;

const SAMPLE_NOTES: [(&str, Option<&str>); 3] = [
    (
        "Mi primera nota",
        Some("Esta es una nota de prueba para verificar que el sistema funciona correctamente."),
    ),
    (
        "Lista de tareas",
        Some("- Completar la prueba técnica\n- Revisar el código\n- Hacer los tests\n- Crear el README"),
    ),
    ("Recordatorio importante", None),
];

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    fn draft(request: &NoteRequest) -> Result<NoteDraft, AppError> {
        NoteDraft::parse(request.title.as_deref(), request.content.as_deref())
            .map_err(AppError::Validation)
    }

    pub async fn create_note(&self, request: NoteRequest) -> Result<NoteResponse, AppError> {
        let draft = Self::draft(&request)?;
        let note = self.store.create_note(&draft).await?;

        tracing::info!("created note {}", note.id);
        Ok(note.into())
    }

    pub async fn update_note(
        &self,
        id: i64,
        request: NoteRequest,
    ) -> Result<NoteResponse, AppError> {
        let draft = Self::draft(&request)?;

        self.store
            .update_note(id, &draft)
            .await?
            .map(NoteResponse::from)
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_note(&self, id: i64) -> Result<(), AppError> {
        if self.store.delete_note(id).await? {
            tracing::info!("deleted note {}", id);
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    pub async fn get_one_note(&self, id: i64) -> Result<NoteResponse, AppError> {
        self.store
            .get_one_note(id)
            .await?
            .map(NoteResponse::from)
            .ok_or(AppError::NotFound)
    }

    /// One page of notes whose title contains `search`, newest first.
    ///
    /// Pages past the end come back empty with `last_page` still pointing at the real last page.
    pub async fn list_notes(&self, search: Option<&str>, page: i64) -> Result<NotePage, AppError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let current_page = page.max(1);

        let result = self
            .store
            .search_notes(&SearchFilter {
                title_contains: search.map(ToOwned::to_owned),
                limit: PER_PAGE,
                offset: (current_page - 1).saturating_mul(PER_PAGE),
            })
            .await?;

        Ok(NotePage {
            notes: result.notes.into_iter().map(NoteResponse::from).collect(),
            meta: PageMeta::new(current_page, result.total, PER_PAGE),
        })
    }

    /// Fills an empty store with sample notes.
    ///
    /// Returns how many notes were written; a store that already holds notes is left alone.
    pub async fn seed_samples(&self) -> Result<usize, AppError> {
        let existing = self
            .store
            .search_notes(&SearchFilter {
                title_contains: None,
                limit: 1,
                offset: 0,
            })
            .await?;
        if existing.total > 0 {
            tracing::info!("store already holds {} notes, skipping seed", existing.total);
            return Ok(0);
        }

        let generated = (1..=GENERATED_SAMPLES).map(|i| {
            NoteRequest::new(
                format!("Nota de ejemplo {i}"),
                Some(format!("Contenido generado para la nota de ejemplo número {i}.").as_str()),
            )
        });
        let fixed = SAMPLE_NOTES
            .iter()
            .map(|(title, content)| NoteRequest::new(*title, *content));

        let mut written = 0;
        for request in generated.chain(fixed) {
            self.create_note(request).await?;
            written += 1;
        }

        tracing::info!("seeded {} sample notes", written);
        Ok(written)
    }

    pub async fn check_store(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}
