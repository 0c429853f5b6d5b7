use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::models::required;

pub const DEFAULT_COURSE_TAG: &str = "General";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub course_tag: String,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub is_deleted: bool,
    pub created_at: String,
}

impl Note {
    /// The single view this note currently shows up in.
    pub fn view(&self) -> NoteView {
        if self.is_deleted {
            NoteView::Deleted
        } else if self.is_archived {
            NoteView::Archive
        } else {
            NoteView::Default
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub course_tag: Option<String>,
}

/// Merge-patch for a note: `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub course_tag: Option<String>,
    pub is_pinned: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_deleted: Option<bool>,
}

impl UpdateNoteRequest {
    pub fn soft_delete() -> Self {
        Self {
            is_deleted: Some(true),
            ..Self::default()
        }
    }

    pub fn archived(is_archived: bool) -> Self {
        Self {
            is_archived: Some(is_archived),
            ..Self::default()
        }
    }

    pub fn restore() -> Self {
        Self {
            is_archived: Some(false),
            is_deleted: Some(false),
            ..Self::default()
        }
    }

    /// Rejects blank text fields and normalises a blank course tag.
    pub fn normalized(mut self) -> Result<Self, AppError> {
        if let Some(title) = self.title.take() {
            self.title = Some(required("title", Some(title))?);
        }
        if let Some(content) = self.content.take() {
            self.content = Some(required("content", Some(content))?);
        }
        if let Some(tag) = self.course_tag.take() {
            self.course_tag = Some(course_tag_or_default(Some(tag)));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteView {
    #[default]
    Default,
    Archive,
    Deleted,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesQuery {
    #[serde(default)]
    pub view: NoteView,
    pub course_tag: Option<String>,
}

/// Which notes a listing returns, after the view and tag have been reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSelection {
    Trashed,
    Archived,
    ActiveTagged(String),
    Active,
}

impl NoteSelection {
    /// The trash and archive views ignore any course tag; a blank tag is no tag.
    pub fn resolve(view: NoteView, course_tag: Option<&str>) -> Self {
        match view {
            NoteView::Deleted => NoteSelection::Trashed,
            NoteView::Archive => NoteSelection::Archived,
            NoteView::Default => match course_tag.map(str::trim) {
                Some(tag) if !tag.is_empty() => NoteSelection::ActiveTagged(tag.to_string()),
                _ => NoteSelection::Active,
            },
        }
    }

    pub fn matches(&self, note: &Note) -> bool {
        match self {
            NoteSelection::Trashed => note.is_deleted,
            NoteSelection::Archived => note.is_archived && !note.is_deleted,
            NoteSelection::ActiveTagged(tag) => {
                &note.course_tag == tag && !note.is_archived && !note.is_deleted
            }
            NoteSelection::Active => !note.is_archived && !note.is_deleted,
        }
    }
}

pub fn course_tag_or_default(tag: Option<String>) -> String {
    match tag {
        Some(tag) if !tag.trim().is_empty() => tag.trim().to_string(),
        _ => DEFAULT_COURSE_TAG.to_string(),
    }
}
