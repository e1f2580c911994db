//! HTTP API surface.
//!
//! Public (visitor-facing):
//! - `GET /api/v1/health`
//! - `GET /api/v1/catalog/products`            — brand/search filtered list
//! - `GET /api/v1/catalog/products/{id}`       — detail, honoring `sp`
//! - `GET /api/v1/catalog/brands`              — brand list for filters
//! - `GET /api/v1/assignment`                  — advisor assignment resolution
//!
//! Admin (bearer-token protected):
//! - `POST/PUT/DELETE /api/v1/admin/products[...]`
//! - `POST/PUT/DELETE /api/v1/admin/brands[...]`
//! - `GET/PUT /api/v1/admin/advisors`          — whole-directory read/replace
//! - `GET /api/v1/admin/share-link`            — shareable link generation

mod advisors;
mod assignment;
mod brands;
mod products;
mod share;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Origin used when generating shareable links.
    pub public_base_url: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &celred_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Matches a Postgres error code raised by the failed statement, e.g.
/// `23505` (unique violation) or `23503` (foreign-key violation).
pub(super) fn is_pg_error(error: &celred_db::DbError, code: &str) -> bool {
    if let celred_db::DbError::Sqlx(sqlx::Error::Database(db_err)) = error {
        return db_err.code().as_deref() == Some(code);
    }
    false
}

/// Parse a URL and convert parse failures into a standardized validation error.
pub(super) fn parse_url_or_validation_error(
    request_id: &str,
    field: &str,
    value: &str,
) -> Result<reqwest::Url, ApiError> {
    reqwest::Url::parse(value).map_err(|_| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("'{field}' must be a valid URL, got '{value}'"),
        )
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn admin_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/admin/products", post(products::create_product))
        .route(
            "/api/v1/admin/products/{product_id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/api/v1/admin/brands", post(brands::create_brand))
        .route(
            "/api/v1/admin/brands/{brand_id}",
            put(brands::update_brand).delete(brands::delete_brand),
        )
        .route(
            "/api/v1/admin/advisors",
            get(advisors::get_directory).put(advisors::replace_directory),
        )
        .route("/api/v1/admin/share-link", get(share::build_share_link))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/catalog/products", get(products::list_products))
        .route(
            "/api/v1/catalog/products/{product_id}",
            get(products::get_product),
        )
        .route("/api/v1/catalog/brands", get(brands::list_brands))
        .route("/api/v1/assignment", get(assignment::resolve));

    Router::new()
        .merge(public_routes)
        .merge(admin_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match celred_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_not_found_maps_to_404() {
        let response = ApiError::new("req-1", "not_found", "missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_conflict_maps_to_409() {
        let response = ApiError::new("req-1", "conflict", "duplicate").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_unknown_code_maps_to_500() {
        let response = ApiError::new("req-1", "mystery", "???").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn parse_url_or_validation_error_accepts_https() {
        let url = parse_url_or_validation_error("req-1", "logo_url", "https://cdn.example.com/x.png");
        assert!(url.is_ok());
    }

    #[test]
    fn parse_url_or_validation_error_rejects_garbage() {
        let err = parse_url_or_validation_error("req-1", "logo_url", "not a url")
            .expect_err("should reject");
        assert_eq!(err.error.code, "validation_error");
        assert!(err.error.message.contains("logo_url"));
    }
}
