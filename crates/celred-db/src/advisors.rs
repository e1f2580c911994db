//! Database operations for the `advisors` table — the persisted Advisor
//! Directory.
//!
//! The directory is stored and replaced as a whole ordered list, matching the
//! admin panel's save semantics. `position` preserves insertion order and
//! `number` is unique, so a roster that passed core validation always
//! persists cleanly.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use celred_core::AdvisorRecord;

use crate::DbError;

/// A row from the `advisors` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdvisorRow {
    pub id: i64,
    pub position: i32,
    pub number: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AdvisorRow {
    #[must_use]
    pub fn into_core(self) -> AdvisorRecord {
        AdvisorRecord {
            number: self.number,
            name: self.name,
            image_url: self.image_url,
        }
    }
}

/// Returns the advisor directory in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_advisors(pool: &PgPool) -> Result<Vec<AdvisorRow>, DbError> {
    let rows = sqlx::query_as::<_, AdvisorRow>(
        "SELECT id, position, number, name, image_url, created_at \
         FROM advisors \
         ORDER BY position",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replaces the whole advisor directory with the given records, preserving
/// their order.
///
/// Runs in a transaction so readers never observe a half-written directory.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the directory is left
/// unchanged in that case.
pub async fn replace_advisors(pool: &PgPool, advisors: &[AdvisorRecord]) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM advisors").execute(&mut *tx).await?;

    for (position, advisor) in advisors.iter().enumerate() {
        sqlx::query(
            "INSERT INTO advisors (position, number, name, image_url) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .bind(&advisor.number)
        .bind(advisor.name.as_deref())
        .bind(advisor.image_url.as_deref())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
