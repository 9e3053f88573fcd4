//! Checkout route handler.
//!
//! Order creation and cart clearing are two independent writes executed in
//! sequence, not a transaction. If the insert fails the cart is left intact
//! so the customer can retry without re-adding items; if the insert succeeds
//! and the clear then fails, the order stands and the cart heals on its next
//! mutation — an accepted inconsistency window, never fatal.

use axum::{Json, extract::State};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use feira_core::{CustomerInfo, OrderId, PaymentMethod};

use crate::checkout::{PaymentInstructions, build_order, payment_instructions, validate_customer};
use crate::db;
use crate::error::{AppError, Result};
use crate::routes::cart::cart_owner;
use crate::state::AppState;

/// Checkout submission body.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    pub customer: CustomerInfo,
}

/// Checkout response: the persisted order's key figures plus the
/// payment-instruction flow for the chosen method.
#[derive(Debug, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub status: &'static str,
    pub payment: PaymentInstructions,
}

/// Submit the checkout: validate, price, persist, clear, instruct.
#[instrument(skip(state, session, request))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutReceipt>> {
    let owner = cart_owner(&session).await?;
    let Some(user_id) = owner.user_id().cloned() else {
        return Err(AppError::Unauthorized(
            "Entre na sua conta para finalizar a compra.".to_owned(),
        ));
    };

    validate_customer(&request.customer).map_err(AppError::Validation)?;

    let cart = state.cart(&owner).await?;
    let mut cart = cart.lock().await;
    if cart.is_empty() {
        return Err(AppError::BadRequest("O carrinho está vazio.".to_owned()));
    }

    let settings = db::settings::get(state.pool()).await?;
    let order = build_order(
        user_id,
        cart.lines(),
        &settings,
        request.payment_method,
        request.customer,
        Utc::now(),
    );

    // Persist first; the cart survives a failed insert so the customer can
    // simply retry.
    let order_id = db::orders::create(state.pool(), &order).await?;
    tracing::info!(order_id = %order_id, total = %order.total, "order created");

    cart.clear();
    state.sync_cart(&owner, &cart);

    let payment = payment_instructions(request.payment_method, &order, &state.config().payment);

    Ok(Json(CheckoutReceipt {
        order_id,
        subtotal: order.subtotal,
        shipping_fee: order.shipping_fee,
        total: order.total,
        status: "pending",
        payment,
    }))
}
