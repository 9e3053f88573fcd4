//! Cart route handlers.
//!
//! Handlers resolve the cart owner from the session (authenticated user id
//! or an anonymous cart key), mutate the live cart under its lock, and queue
//! a sync snapshot for authenticated owners before responding.

use axum::{
    Json,
    extract::State,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use feira_core::{ProductId, UserId, format_brl};

use crate::cart::{Cart, CartOwner};
use crate::error::{AppError, Result};
use crate::middleware::session::keys;
use crate::state::AppState;

/// Cart item display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub title: String,
    pub image: String,
    pub quantity: u32,
    pub price: Decimal,
    pub line_total: Decimal,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: Decimal,
    pub subtotal_display: String,
    pub item_count: u32,
}

impl CartView {
    fn from_cart(cart: &Cart) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| CartItemView {
                    product_id: line.product_id.clone(),
                    title: line.title.clone(),
                    image: line.image.clone(),
                    quantity: line.quantity,
                    price: line.price,
                    line_total: line.line_total(),
                })
                .collect(),
            subtotal: cart.subtotal(),
            subtotal_display: format_brl(cart.subtotal()),
            item_count: cart.item_count(),
        }
    }
}

/// Resolve the cart owner for this session.
///
/// Authenticated sessions own a durable cart keyed by user id; anonymous
/// sessions get a generated cart key stored in the session.
pub async fn cart_owner(session: &Session) -> Result<CartOwner> {
    if let Some(user_id) = session.get::<String>(keys::USER_ID).await? {
        return Ok(CartOwner::User(UserId::new(user_id)));
    }
    if let Some(key) = session.get::<String>(keys::GUEST_CART_KEY).await? {
        return Ok(CartOwner::Guest(key));
    }
    let key = Uuid::new_v4().to_string();
    session.insert(keys::GUEST_CART_KEY, key.clone()).await?;
    Ok(CartOwner::Guest(key))
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: String,
}

/// Cart count badge payload.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Current cart view.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let owner = cart_owner(&session).await?;
    let cart = state.cart(&owner).await?;
    let cart = cart.lock().await;
    Ok(Json(CartView::from_cart(&cart)))
}

/// Add one unit of a product.
///
/// An unresolvable product id leaves the cart untouched and answers 404; the
/// client surfaces that as a notice, cart integrity is never at stake.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product_id = ProductId::new(request.product_id);
    let Some(product) = state.product(&product_id).await? else {
        tracing::warn!(product_id = %product_id, "add to cart: product not found");
        return Err(AppError::NotFound(format!("product {product_id}")));
    };

    let owner = cart_owner(&session).await?;
    let cart = state.cart(&owner).await?;
    let mut cart = cart.lock().await;
    cart.add_item(&product);
    state.sync_cart(&owner, &cart);

    Ok(Json(CartView::from_cart(&cart)))
}

/// Set a line's quantity; zero or negative removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let product_id = ProductId::new(request.product_id);
    let owner = cart_owner(&session).await?;
    let cart = state.cart(&owner).await?;
    let mut cart = cart.lock().await;
    cart.update_quantity(&product_id, request.quantity);
    state.sync_cart(&owner, &cart);

    Ok(Json(CartView::from_cart(&cart)))
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let product_id = ProductId::new(request.product_id);
    let owner = cart_owner(&session).await?;
    let cart = state.cart(&owner).await?;
    let mut cart = cart.lock().await;
    cart.remove_item(&product_id);
    state.sync_cart(&owner, &cart);

    Ok(Json(CartView::from_cart(&cart)))
}

/// Item count badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CartCount>> {
    let owner = cart_owner(&session).await?;
    let cart = state.cart(&owner).await?;
    let cart = cart.lock().await;
    Ok(Json(CartCount {
        count: cart.item_count(),
    }))
}
