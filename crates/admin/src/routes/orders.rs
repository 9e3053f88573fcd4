//! Order management handlers.
//!
//! Status parsing is asymmetric on purpose: the requested status must be one
//! of the known values (strict), while the stored status is read leniently so
//! an order carrying an unrecognized legacy value behaves like a fresh
//! `pending` order instead of being stuck forever.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use feira_core::{CustomerInfo, Order, OrderId, OrderItem, OrderStatus, format_brl};

use crate::db;
use crate::error::{AppError, Result};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 500;

/// Order listing filters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// Order display data for the admin panel.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub item_count: u32,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub total_display: String,
    pub status: String,
    pub status_label: &'static str,
    pub status_color: &'static str,
    pub allowed_transitions: Vec<OrderStatus>,
    pub payment_method: &'static str,
    pub payment_method_label: &'static str,
    pub customer: CustomerInfo,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let status = order.status();
        let presentation = status.presentation();
        let item_count = order.item_count();
        Self {
            id: order.id,
            user_id: order.user_id.into_inner(),
            item_count,
            subtotal: order.subtotal,
            shipping_fee: order.shipping_fee,
            total: order.total,
            total_display: format_brl(order.total),
            status_label: presentation.label,
            status_color: presentation.color,
            allowed_transitions: status.allowed_transitions(),
            payment_method: order.payment_method.as_str(),
            payment_method_label: order.payment_method.label(),
            customer: order.customer_info,
            created_at: order.created_at,
            items: order.items,
            status: order.status,
        }
    }
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// List recent orders, optionally filtered by status.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OrderView>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let orders = db::orders::list_recent(state.pool(), query.status.as_deref(), limit).await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// Order detail by id.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<OrderView>> {
    let id = OrderId::new(id);
    db::orders::get_by_id(state.pool(), id)
        .await?
        .map(|order| Json(OrderView::from(order)))
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

/// Move an order to a new lifecycle status.
#[instrument(skip(state, request))]
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderView>> {
    let id = OrderId::new(id);
    let order = db::orders::get_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let next = check_transition(&order.status, &request.status)?;

    if !db::orders::set_status(state.pool(), id, next.as_str()).await? {
        return Err(AppError::NotFound(format!("order {id}")));
    }
    tracing::info!(order_id = %id, from = %order.status, to = %next, "order status updated");

    let mut order = order;
    order.status = next.as_str().to_string();
    Ok(Json(OrderView::from(order)))
}

/// Validate a requested transition against the stored status.
///
/// The requested value is parsed strictly; the stored value leniently.
fn check_transition(stored: &str, requested: &str) -> Result<OrderStatus> {
    let next = requested
        .parse::<OrderStatus>()
        .map_err(AppError::BadRequest)?;
    let current = OrderStatus::parse_lenient(stored);

    if !current.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: stored.to_string(),
            to: next.as_str().to_string(),
        });
    }
    Ok(next)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_transition_allows_forward_step() {
        assert_eq!(
            check_transition("pending", "processing").unwrap(),
            OrderStatus::Processing
        );
        assert_eq!(
            check_transition("shipped", "delivered").unwrap(),
            OrderStatus::Delivered
        );
    }

    #[test]
    fn test_check_transition_rejects_unknown_target() {
        let err = check_transition("pending", "refunded").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_check_transition_rejects_skip_and_reopen() {
        assert!(matches!(
            check_transition("pending", "delivered").unwrap_err(),
            AppError::InvalidTransition { .. }
        ));
        assert!(matches!(
            check_transition("delivered", "processing").unwrap_err(),
            AppError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn test_check_transition_treats_unknown_stored_as_pending() {
        // A legacy status behaves like a fresh order.
        assert_eq!(
            check_transition("awaiting_carrier", "processing").unwrap(),
            OrderStatus::Processing
        );
        assert!(matches!(
            check_transition("awaiting_carrier", "delivered").unwrap_err(),
            AppError::InvalidTransition { .. }
        ));
    }
}
