//! Journal endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sturdy_core::{JournalEntry, JournalStore};

use crate::error::ServerResult;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ServerResult<Json<Vec<JournalEntry>>> {
    Ok(Json(state.journal.list()?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<JournalEntry>> {
    let id = JournalStore::parse_id(&id)?;
    Ok(Json(state.journal.get(id)?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    let id = JournalStore::parse_id(&id)?;
    state.journal.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
