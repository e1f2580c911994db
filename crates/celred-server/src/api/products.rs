//! Catalog and admin product handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use celred_core::{show_price_param, validate_product_input, BrandRef, Product, ProductSpecs};
use celred_db::{NewProduct, ProductListFilters};

use crate::middleware::RequestId;

use super::{
    is_pg_error, map_db_error, normalize_limit, parse_url_or_validation_error, ApiError,
    ApiResponse, AppState, ResponseMeta,
};

/// Shown instead of the price when a share link did not reveal it.
const FINANCING_NOTE: &str =
    "¡Financiación disponible! Consulta el precio y las cuotas personalizadas con un asesor.";

#[derive(Debug, Deserialize)]
pub(super) struct ProductListQuery {
    pub brand_id: Option<i64>,
    /// Case-insensitive substring match on the product name.
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductDetailQuery {
    /// `"1"` reveals the price (share-link contract).
    pub sp: Option<String>,
}

/// Product detail as the visitor sees it: the price is withheld unless the
/// share link revealed it, replaced by the financing note.
#[derive(Debug, Serialize)]
pub(super) struct ProductDetail {
    pub id: i64,
    pub name: String,
    pub brand: BrandRef,
    pub price: Option<Decimal>,
    pub stock: i32,
    pub description: String,
    pub image_url: Option<String>,
    pub specs: ProductSpecs,
    pub financing_note: Option<String>,
}

impl ProductDetail {
    fn from_core(product: Product, show_price: bool) -> Self {
        let (price, financing_note) = if show_price {
            (Some(product.price), None)
        } else {
            (None, Some(FINANCING_NOTE.to_owned()))
        };
        Self {
            id: product.id,
            name: product.name,
            brand: product.brand,
            price,
            stock: product.stock,
            description: product.description,
            image_url: product.image_url,
            specs: product.specs,
            financing_note,
        }
    }
}

/// Admin payload for product create and full-replace update.
///
/// `brand` accepts either a bare brand id or an expanded brand object; only
/// the id is used for persistence.
#[derive(Debug, Deserialize)]
pub(super) struct ProductRequest {
    pub name: String,
    pub brand: BrandRef,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub specs: ProductSpecs,
}

impl ProductRequest {
    fn validate(&self, request_id: &str) -> Result<(), ApiError> {
        validate_product_input(&self.name, self.price)
            .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))?;
        if let Some(ref url) = self.image_url {
            parse_url_or_validation_error(request_id, "image_url", url)?;
        }
        Ok(())
    }

    fn as_new_product<'a>(&'a self, specs: &'a serde_json::Value) -> NewProduct<'a> {
        NewProduct {
            brand_id: self.brand.id(),
            name: self.name.trim(),
            price: self.price,
            stock: self.stock,
            description: &self.description,
            image_url: self.image_url.as_deref(),
            specs,
        }
    }
}

fn map_product_write_error(request_id: &str, error: &celred_db::DbError) -> ApiError {
    if is_pg_error(error, "23503") {
        return ApiError::new(
            request_id,
            "validation_error",
            "brand does not exist",
        );
    }
    map_db_error(request_id.to_owned(), error)
}

fn specs_to_value(specs: &ProductSpecs) -> serde_json::Value {
    serde_json::to_value(specs).unwrap_or_else(|_| serde_json::json!({}))
}

/// GET /api/v1/catalog/products — filtered catalog listing.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let rows = celred_db::list_products(
        &state.pool,
        ProductListFilters {
            brand_id: query.brand_id,
            search: query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            limit: Some(normalize_limit(query.limit)),
        },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(celred_db::ProductWithBrandRow::into_core)
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/catalog/products/:id — visitor-facing detail.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
    Query(query): Query<ProductDetailQuery>,
) -> Result<Json<ApiResponse<ProductDetail>>, ApiError> {
    let rid = &req_id.0;
    let row = celred_db::get_product(&state.pool, product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(rid, "not_found", format!("product {product_id} not found"))
        })?;

    let show_price = show_price_param(query.sp.as_deref());
    let data = ProductDetail::from_core(row.into_core(), show_price);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/admin/products — create a product.
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let rid = &req_id.0;
    body.validate(rid)?;

    let specs = specs_to_value(&body.specs);
    let row = celred_db::create_product(&state.pool, body.as_new_product(&specs))
        .await
        .map_err(|e| map_product_write_error(rid, &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row.into_core(),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PUT /api/v1/admin/products/:id — full-replace update.
pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
    Json(body): Json<ProductRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = &req_id.0;
    body.validate(rid)?;

    let specs = specs_to_value(&body.specs);
    let row = celred_db::update_product(&state.pool, product_id, body.as_new_product(&specs))
        .await
        .map_err(|e| match e {
            celred_db::DbError::NotFound => {
                ApiError::new(rid, "not_found", format!("product {product_id} not found"))
            }
            other => map_product_write_error(rid, &other),
        })?;

    Ok(Json(ApiResponse {
        data: row.into_core(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/admin/products/:id.
pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let deleted = celred_db::delete_product(&state.pool, product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    if !deleted {
        return Err(ApiError::new(
            rid,
            "not_found",
            format!("product {product_id} not found"),
        ));
    }

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
