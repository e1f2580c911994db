//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A product row joined with its brand, as served to the catalog.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductWithBrandRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: String,
    pub image_url: Option<String>,
    pub specs: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub brand_id: i64,
    pub brand_name: String,
    pub brand_logo_url: Option<String>,
    pub brand_description: Option<String>,
}

impl ProductWithBrandRow {
    /// Projects the row into the core entity, with the brand expanded.
    ///
    /// A `specs` blob that does not match the known shape deserializes to the
    /// empty spec sheet rather than failing the whole product.
    #[must_use]
    pub fn into_core(self) -> celred_core::Product {
        let specs = serde_json::from_value(self.specs).unwrap_or_default();
        celred_core::Product {
            id: self.id,
            name: self.name,
            brand: celred_core::BrandRef::Expanded(celred_core::Brand {
                id: self.brand_id,
                name: self.brand_name,
                logo_url: self.brand_logo_url,
                description: self.brand_description,
            }),
            price: self.price,
            stock: self.stock,
            description: self.description,
            image_url: self.image_url,
            specs,
        }
    }
}

/// Optional filters for the catalog listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductListFilters<'a> {
    pub brand_id: Option<i64>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<&'a str>,
    pub limit: Option<i64>,
}

/// Fields for a new product. Validation (non-empty name, non-negative price)
/// happens in the API layer before this is called.
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub brand_id: i64,
    pub name: &'a str,
    pub price: Decimal,
    pub stock: i32,
    pub description: &'a str,
    pub image_url: Option<&'a str>,
    pub specs: &'a serde_json::Value,
}

/// Full-replacement changes for an existing product (PUT semantics).
pub type ProductChanges<'a> = NewProduct<'a>;

const SELECT_WITH_BRAND: &str = "SELECT p.id, p.public_id, p.name, p.price, p.stock, \
        p.description, p.image_url, p.specs, p.created_at, p.updated_at, \
        p.brand_id, b.name AS brand_name, b.logo_url AS brand_logo_url, \
        b.description AS brand_description \
     FROM products p \
     JOIN brands b ON b.id = p.brand_id";

/// Returns catalog products, newest first, honoring the optional brand and
/// name-search filters.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(
    pool: &PgPool,
    filters: ProductListFilters<'_>,
) -> Result<Vec<ProductWithBrandRow>, DbError> {
    let search_pattern = filters.search.map(|s| format!("%{}%", s.trim()));

    let rows = sqlx::query_as::<_, ProductWithBrandRow>(&format!(
        "{SELECT_WITH_BRAND} \
         WHERE ($1::BIGINT IS NULL OR p.brand_id = $1) \
           AND ($2::TEXT IS NULL OR p.name ILIKE $2) \
         ORDER BY p.created_at DESC \
         LIMIT $3"
    ))
    .bind(filters.brand_id)
    .bind(search_pattern)
    .bind(filters.limit.unwrap_or(200))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single product with its brand, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(
    pool: &PgPool,
    product_id: i64,
) -> Result<Option<ProductWithBrandRow>, DbError> {
    let row = sqlx::query_as::<_, ProductWithBrandRow>(&format!(
        "{SELECT_WITH_BRAND} WHERE p.id = $1"
    ))
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a product and returns it joined with its brand.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including a foreign-key
/// violation for an unknown `brand_id`.
pub async fn create_product(
    pool: &PgPool,
    product: NewProduct<'_>,
) -> Result<ProductWithBrandRow, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO products (brand_id, name, price, stock, description, image_url, specs) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(product.brand_id)
    .bind(product.name)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.description)
    .bind(product.image_url)
    .bind(product.specs.clone())
    .fetch_one(pool)
    .await?;

    get_product(pool, id).await?.ok_or(DbError::NotFound)
}

/// Replaces a product's editable fields (PUT semantics).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has that id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_product(
    pool: &PgPool,
    product_id: i64,
    changes: ProductChanges<'_>,
) -> Result<ProductWithBrandRow, DbError> {
    let updated: Option<i64> = sqlx::query_scalar(
        "UPDATE products \
         SET brand_id = $1, name = $2, price = $3, stock = $4, description = $5, \
             image_url = $6, specs = $7, updated_at = NOW() \
         WHERE id = $8 \
         RETURNING id",
    )
    .bind(changes.brand_id)
    .bind(changes.name)
    .bind(changes.price)
    .bind(changes.stock)
    .bind(changes.description)
    .bind(changes.image_url)
    .bind(changes.specs.clone())
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(id) => get_product(pool, id).await?.ok_or(DbError::NotFound),
        None => Err(DbError::NotFound),
    }
}

/// Deletes a product. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_product(pool: &PgPool, product_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
