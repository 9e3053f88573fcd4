//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the database)
//!
//! # Products
//! GET  /products               - Product listing (?category=, ?featured=)
//! GET  /products/{id}          - Product detail
//!
//! # Cart
//! GET  /cart                   - Current cart view
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Set a line's quantity (<= 0 removes)
//! POST /cart/remove            - Remove a line
//! GET  /cart/count             - Item count badge
//!
//! # Checkout
//! POST /checkout               - Validate, persist the order, return
//!                                payment instructions
//!
//! # Session (identity comes from an external provider)
//! POST   /auth/session         - Attach a verified user id to the session
//! DELETE /auth/session         - Detach the user id
//! ```

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;

/// Build the storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list))
        .route("/products/{id}", get(products::show))
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/count", get(cart::count))
        .route("/checkout", post(checkout::submit))
        .route("/auth/session", post(auth::login).delete(auth::logout))
}
