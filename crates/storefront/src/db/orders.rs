//! Order persistence (storefront side: insert only).
//!
//! The order document is immutable after creation except for `status`, which
//! is mutated exclusively by the admin binary.

use sqlx::PgPool;
use sqlx::types::Json;

use feira_core::{Order, OrderId};

use super::RepositoryError;

/// Insert a new order and return its id.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create(pool: &PgPool, order: &Order) -> Result<OrderId, RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO orders
            (id, user_id, items, subtotal, shipping_fee, total,
             status, payment_method, customer_info, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ",
    )
    .bind(order.id.as_uuid())
    .bind(order.user_id.as_str())
    .bind(Json(&order.items))
    .bind(order.subtotal)
    .bind(order.shipping_fee)
    .bind(order.total)
    .bind(&order.status)
    .bind(order.payment_method.as_str())
    .bind(Json(&order.customer_info))
    .bind(order.created_at)
    .execute(pool)
    .await?;

    Ok(order.id)
}
