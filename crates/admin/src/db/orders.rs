//! Order reads and status writes for the admin panel.
//!
//! Orders are append-only documents; the only column that ever changes after
//! insert is `status`, and only through `set_status` below.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use feira_core::{CustomerInfo, Order, OrderId, OrderItem, PaymentMethod, UserId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: String,
    items: Json<Vec<OrderItem>>,
    subtotal: Decimal,
    shipping_fee: Decimal,
    total: Decimal,
    status: String,
    payment_method: String,
    customer_info: Json<CustomerInfo>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_method = row.payment_method.parse::<PaymentMethod>().map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order {}: unknown payment method '{}'",
                row.id, row.payment_method
            ))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            items: row.items.0,
            subtotal: row.subtotal,
            shipping_fee: row.shipping_fee,
            total: row.total,
            status: row.status,
            payment_method,
            customer_info: row.customer_info.0,
            created_at: row.created_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, items, subtotal, shipping_fee, total, \
                             status, payment_method, customer_info, created_at";

/// List the most recent orders, optionally filtered by raw status string.
///
/// The filter matches the stored text verbatim so operators can also find
/// orders carrying unrecognized legacy statuses.
///
/// # Errors
///
/// Returns `RepositoryError` if the query fails or a row cannot be decoded.
pub async fn list_recent(
    pool: &PgPool,
    status: Option<&str>,
    limit: i64,
) -> Result<Vec<Order>, RepositoryError> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders
        WHERE ($1::text IS NULL OR status = $1)
        ORDER BY created_at DESC
        LIMIT $2
        "
    ))
    .bind(status)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Order::try_from).collect()
}

/// Fetch an order by id.
///
/// # Errors
///
/// Returns `RepositoryError` if the query fails or the row cannot be decoded.
pub async fn get_by_id(pool: &PgPool, id: OrderId) -> Result<Option<Order>, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    row.map(Order::try_from).transpose()
}

/// Overwrite an order's status. Returns `false` if the id does not exist.
///
/// The transition guard lives in the route handler; this function writes
/// whatever canonical status string it is given.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn set_status(
    pool: &PgPool,
    id: OrderId,
    status: &str,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
        .bind(id.as_uuid())
        .bind(status)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
