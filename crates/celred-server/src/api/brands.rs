//! Brand list and admin CRUD handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use celred_core::Brand;

use crate::middleware::RequestId;

use super::{
    is_pg_error, map_db_error, parse_url_or_validation_error, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

const MAX_NAME_LEN: usize = 120;

/// Admin payload for brand create and full-replace update.
#[derive(Debug, Deserialize)]
pub(super) struct BrandRequest {
    pub name: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
}

impl BrandRequest {
    fn validate(&self, request_id: &str) -> Result<&str, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::new(
                request_id,
                "validation_error",
                "brand name must be non-empty",
            ));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(ApiError::new(
                request_id,
                "validation_error",
                format!("brand name must be at most {MAX_NAME_LEN} characters"),
            ));
        }
        if let Some(ref url) = self.logo_url {
            parse_url_or_validation_error(request_id, "logo_url", url)?;
        }
        Ok(name)
    }
}

fn duplicate_name_error(request_id: &str, name: &str) -> ApiError {
    ApiError::new(
        request_id,
        "conflict",
        format!("a brand named '{name}' already exists"),
    )
}

/// GET /api/v1/catalog/brands — brands for the catalog filter bar.
pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Brand>>>, ApiError> {
    let rows = celred_db::list_brands(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(celred_db::BrandRow::into_core).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/admin/brands — create a brand.
///
/// Brand names are unique case-insensitively; a duplicate is a 409.
pub(super) async fn create_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<BrandRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Brand>>), ApiError> {
    let rid = &req_id.0;
    let name = body.validate(rid)?;

    let row = celred_db::create_brand(
        &state.pool,
        name,
        body.logo_url.as_deref(),
        body.description.as_deref(),
    )
    .await
    .map_err(|e| {
        if is_pg_error(&e, "23505") {
            duplicate_name_error(rid, name)
        } else {
            map_db_error(rid.clone(), &e)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row.into_core(),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PUT /api/v1/admin/brands/:id — full-replace update.
pub(super) async fn update_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(brand_id): Path<i64>,
    Json(body): Json<BrandRequest>,
) -> Result<Json<ApiResponse<Brand>>, ApiError> {
    let rid = &req_id.0;
    let name = body.validate(rid)?;

    let row = celred_db::update_brand(
        &state.pool,
        brand_id,
        name,
        body.logo_url.as_deref(),
        body.description.as_deref(),
    )
    .await
    .map_err(|e| match e {
        celred_db::DbError::NotFound => {
            ApiError::new(rid, "not_found", format!("brand {brand_id} not found"))
        }
        other if is_pg_error(&other, "23505") => duplicate_name_error(rid, name),
        other => map_db_error(rid.clone(), &other),
    })?;

    Ok(Json(ApiResponse {
        data: row.into_core(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/admin/brands/:id.
///
/// Products keep a restricting foreign key to their brand, so deleting a
/// brand that still has products is a 409 rather than a cascade.
pub(super) async fn delete_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(brand_id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let deleted = celred_db::delete_brand(&state.pool, brand_id)
        .await
        .map_err(|e| {
            if is_pg_error(&e, "23503") {
                ApiError::new(
                    rid,
                    "conflict",
                    "brand still has products; reassign or delete them first",
                )
            } else {
                map_db_error(rid.clone(), &e)
            }
        })?;

    if !deleted {
        return Err(ApiError::new(
            rid,
            "not_found",
            format!("brand {brand_id} not found"),
        ));
    }

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
