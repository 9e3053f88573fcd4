//! Per-user cart persistence.
//!
//! Each authenticated user owns at most one row; the lines document is
//! replaced whole on every write (no delta merge). Ordering and staleness are
//! handled upstream by the cart sync queue.

use sqlx::PgPool;
use sqlx::types::Json;

use feira_core::UserId;

use super::RepositoryError;
use crate::cart::CartLineRecord;

/// Fetch the stored cart lines for a user. A missing row is an empty cart.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get(pool: &PgPool, user_id: &UserId) -> Result<Vec<CartLineRecord>, RepositoryError> {
    let row: Option<(Json<Vec<CartLineRecord>>,)> =
        sqlx::query_as("SELECT lines FROM carts WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(lines,)| lines.0).unwrap_or_default())
}

/// Replace a user's cart document with the given lines.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the upsert fails.
pub async fn put(
    pool: &PgPool,
    user_id: &UserId,
    lines: &[CartLineRecord],
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO carts (user_id, lines, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (user_id)
        DO UPDATE SET lines = EXCLUDED.lines, updated_at = now()
        ",
    )
    .bind(user_id.as_str())
    .bind(Json(lines))
    .execute(pool)
    .await?;

    Ok(())
}
