//! Store settings reads.
//!
//! Checkout reads the shipping configuration at submit time; the singleton
//! row is seeded by migration and edited by the admin binary.

use rust_decimal::Decimal;
use sqlx::PgPool;

use feira_core::StoreSettings;

use super::RepositoryError;

/// Fetch the store settings, falling back to defaults if the row is missing.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get(pool: &PgPool) -> Result<StoreSettings, RepositoryError> {
    let row: Option<(Decimal, Decimal)> = sqlx::query_as(
        "SELECT flat_shipping_fee, free_shipping_threshold FROM store_settings WHERE id = TRUE",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map_or_else(StoreSettings::default, |(fee, threshold)| StoreSettings {
        flat_shipping_fee: fee,
        free_shipping_threshold: threshold,
    }))
}
