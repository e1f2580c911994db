//! Database operations for the `brands` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BrandRow {
    /// Projects the row into the core catalog entity.
    #[must_use]
    pub fn into_core(self) -> celred_core::Brand {
        celred_core::Brand {
            id: self.id,
            name: self.name,
            logo_url: self.logo_url,
            description: self.description,
        }
    }
}

const BRAND_COLUMNS: &str = "id, public_id, name, logo_url, description, created_at, updated_at";

/// Returns all brands, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(pool: &PgPool) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single brand by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand(pool: &PgPool, brand_id: i64) -> Result<Option<BrandRow>, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1"
    ))
    .bind(brand_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates a new brand row and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including the unique
/// constraint violation on the case-insensitive name.
pub async fn create_brand(
    pool: &PgPool,
    name: &str,
    logo_url: Option<&str>,
    description: Option<&str>,
) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(&format!(
        "INSERT INTO brands (name, logo_url, description) \
         VALUES ($1, $2, $3) \
         RETURNING {BRAND_COLUMNS}"
    ))
    .bind(name)
    .bind(logo_url)
    .bind(description)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Replaces a brand's editable fields (PUT semantics) and returns the row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no brand has that id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_brand(
    pool: &PgPool,
    brand_id: i64,
    name: &str,
    logo_url: Option<&str>,
    description: Option<&str>,
) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(&format!(
        "UPDATE brands \
         SET name = $1, logo_url = $2, description = $3, updated_at = NOW() \
         WHERE id = $4 \
         RETURNING {BRAND_COLUMNS}"
    ))
    .bind(name)
    .bind(logo_url)
    .bind(description)
    .bind(brand_id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Deletes a brand. Returns `true` if a row was removed.
///
/// Brands referenced by products are protected by a `RESTRICT` foreign key;
/// that violation surfaces as [`DbError::Sqlx`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_brand(pool: &PgPool, brand_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM brands WHERE id = $1")
        .bind(brand_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
