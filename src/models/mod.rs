pub mod grade;
pub mod note;
pub mod user;

pub use grade::{Grade, GradeRecord, GpaSummary, NewGradeRequest, UnknownGrade};
pub use note::{
    DEFAULT_COURSE_TAG, ListNotesQuery, NewNoteRequest, Note, NoteSelection, NoteView,
    UpdateNoteRequest,
};
pub use user::{RegisterUserRequest, User};

use crate::error::AppError;

/// A required text field: absent and blank are both rejected.
pub fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::invalid(format!("{field} is required"))),
    }
}
