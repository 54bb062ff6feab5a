//! Script generation endpoint

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sturdy_core::{JournalEntry, ScriptRequest, ScriptResponse};
use sturdy_suggest::Fallback;

use crate::error::ServerResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateParams {
    /// Persist the result as a journal entry
    #[serde(default)]
    pub journal: bool,
}

/// `POST /api/v1/scripts`
///
/// Always answers with a full response body once the request is valid:
/// 200 for model output or a not-configured fallback, 500 when the
/// upstream model failed and defaults were substituted.
pub async fn generate(
    State(state): State<AppState>,
    Query(params): Query<GenerateParams>,
    Json(req): Json<ScriptRequest>,
) -> ServerResult<(StatusCode, Json<ScriptResponse>)> {
    let generated = state.generator.generate(&req).await?;

    if params.journal {
        let clean = req.sanitized()?;
        let entry = JournalEntry::new(&clean, generated.response.clone());
        match state.journal.save(&entry) {
            Ok(()) => tracing::info!(id = %entry.id, "journaled script"),
            Err(e) => tracing::warn!(error = %e, "failed to save journal entry"),
        }
    }

    let status = match generated.fallback {
        Some(Fallback::Upstream) => StatusCode::INTERNAL_SERVER_ERROR,
        Some(Fallback::NotConfigured) | None => StatusCode::OK,
    };
    Ok((status, Json(generated.response)))
}
