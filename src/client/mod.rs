//! Client side of the notes API: a typed HTTP client plus the view state a notes UI
//! needs (list with debounced search and pagination, create/edit form).

mod api;
mod form;
mod list;

pub use api::{ClientError, NotesClient};
pub use form::{NoteForm, SAVE_ERROR_MESSAGE};
pub use list::{
    DELETE_ERROR_MESSAGE, LOAD_ERROR_MESSAGE, ListSnapshot, NoteList, RequestSequencer,
    SEARCH_DEBOUNCE,
};
