use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::StatusCode;
use axum::routing::{delete, patch, post};
use axum::{Json, Router, extract::State, routing::get};

use crate::error::AppError;
use crate::identity::Owner;
use crate::models::*;
use crate::state::AppState;

/// `Json` whose rejections come back as `InvalidInput`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", post(register_user))
        .route("/users/me", get(me))
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/tags", get(note_tags))
        .route(
            "/notes/{id}",
            get(get_note).patch(update_note).delete(soft_delete_note),
        )
        .route("/notes/{id}/permanent", delete(permanently_delete_note))
        .route("/notes/{id}/archive", patch(archive_note))
        .route("/notes/{id}/unarchive", patch(unarchive_note))
        .route("/notes/{id}/restore", patch(restore_note))
        .route("/grades", get(list_grades).post(create_grade))
        .route("/grades/summary", get(grade_summary))
        .route("/grades/{id}", delete(delete_grade))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn register_user(
    State(state): State<AppState>,
    owner: Owner,
    ApiJson(req): ApiJson<RegisterUserRequest>,
) -> Result<Json<User>, AppError> {
    let user = state.users.register(owner.as_str(), req).await?;
    Ok(Json(user))
}

async fn me(State(state): State<AppState>, owner: Owner) -> Result<Json<User>, AppError> {
    let user = state.users.me(owner.as_str()).await?;
    Ok(Json(user))
}

async fn list_notes(
    State(state): State<AppState>,
    owner: Owner,
    ApiQuery(params): ApiQuery<ListNotesQuery>,
) -> Result<Json<Vec<Note>>, AppError> {
    let selection = NoteSelection::resolve(params.view, params.course_tag.as_deref());
    let notes = state.notes.list(owner.as_str(), &selection).await?;
    Ok(Json(notes))
}

async fn create_note(
    State(state): State<AppState>,
    owner: Owner,
    ApiJson(req): ApiJson<NewNoteRequest>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let note = state.notes.create(owner.as_str(), req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn note_tags(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<Vec<String>>, AppError> {
    let tags = state.notes.distinct_tags(owner.as_str()).await?;
    Ok(Json(tags))
}

async fn get_note(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let note = state.notes.get(owner.as_str(), &id).await?;
    Ok(Json(note))
}

async fn update_note(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateNoteRequest>,
) -> Result<Json<Note>, AppError> {
    let note = state.notes.update(owner.as_str(), &id, req).await?;
    Ok(Json(note))
}

async fn soft_delete_note(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let note = state.notes.soft_delete(owner.as_str(), &id).await?;
    Ok(Json(note))
}

async fn permanently_delete_note(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.notes.permanently_delete(owner.as_str(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn archive_note(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let note = state.notes.archive(owner.as_str(), &id).await?;
    Ok(Json(note))
}

async fn unarchive_note(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let note = state.notes.unarchive(owner.as_str(), &id).await?;
    Ok(Json(note))
}

async fn restore_note(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let note = state.notes.restore(owner.as_str(), &id).await?;
    Ok(Json(note))
}

async fn list_grades(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<Vec<GradeRecord>>, AppError> {
    let records = state.grades.list(owner.as_str()).await?;
    Ok(Json(records))
}

async fn create_grade(
    State(state): State<AppState>,
    owner: Owner,
    ApiJson(req): ApiJson<NewGradeRequest>,
) -> Result<(StatusCode, Json<GradeRecord>), AppError> {
    let record = state.grades.create(owner.as_str(), req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn grade_summary(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<GpaSummary>, AppError> {
    let summary = state.grades.summary(owner.as_str()).await?;
    Ok(Json(summary))
}

async fn delete_grade(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.grades.delete(owner.as_str(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
