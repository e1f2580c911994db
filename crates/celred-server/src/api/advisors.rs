//! Admin advisor directory handlers.
//!
//! The directory is read and replaced as a whole ordered list, the same way
//! the admin panel saves it. Validation (number normalization, duplicate
//! rejection) happens by folding the submitted entries into a
//! [`celred_core::Roster`] before anything touches the database.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use celred_core::{AdvisorRecord, Roster};

use crate::middleware::RequestId;

use super::{
    map_db_error, parse_url_or_validation_error, ApiError, ApiResponse, AppState, ResponseMeta,
};

/// One submitted directory entry. Numbers arrive as the admin typed them and
/// are normalized server-side.
#[derive(Debug, Deserialize)]
pub(super) struct AdvisorEntry {
    pub number: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReplaceDirectoryBody {
    pub advisors: Vec<AdvisorEntry>,
}

fn build_roster(request_id: &str, entries: &[AdvisorEntry]) -> Result<Roster, ApiError> {
    let mut roster = Roster::new();
    for entry in entries {
        roster
            .add(&entry.number, entry.name.as_deref())
            .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))?;
        if let Some(ref url) = entry.image_url {
            parse_url_or_validation_error(request_id, "image_url", url)?;
            let number = celred_core::normalize_number(&entry.number);
            roster.set_image_url(&number, url);
        }
    }
    Ok(roster)
}

/// GET /api/v1/admin/advisors — the current directory, in order.
pub(super) async fn get_directory(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<AdvisorRecord>>>, ApiError> {
    let rows = celred_db::list_advisors(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(celred_db::AdvisorRow::into_core).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/admin/advisors — replace the whole directory.
///
/// An empty list is valid; assignment resolution then degrades to
/// none-available until advisors are added back.
pub(super) async fn replace_directory(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ReplaceDirectoryBody>,
) -> Result<Json<ApiResponse<Vec<AdvisorRecord>>>, ApiError> {
    let rid = &req_id.0;
    let roster = build_roster(rid, &body.advisors)?;
    let records = roster.into_records();

    celred_db::replace_advisors(&state.pool, &records)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(count = records.len(), "advisor directory replaced");

    Ok(Json(ApiResponse {
        data: records,
        meta: ResponseMeta::new(req_id.0),
    }))
}
