//! Store settings reads and writes.
//!
//! The settings singleton drives checkout pricing on the storefront side, so
//! an update here takes effect on the very next checkout.

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

/// Replace the store settings singleton.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the upsert fails.
pub async fn update(pool: &PgPool, settings: &StoreSettings) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO store_settings (id, flat_shipping_fee, free_shipping_threshold)
        VALUES (TRUE, $1, $2)
        ON CONFLICT (id) DO UPDATE SET
            flat_shipping_fee = EXCLUDED.flat_shipping_fee,
            free_shipping_threshold = EXCLUDED.free_shipping_threshold,
            updated_at = now()
        ",
    )
    .bind(settings.flat_shipping_fee)
    .bind(settings.free_shipping_threshold)
    .execute(pool)
    .await?;

    Ok(())
}
