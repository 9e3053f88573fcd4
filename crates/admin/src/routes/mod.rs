//! Admin route handlers.
//!
//! # Route Table
//!
//! | Method | Path                  | Handler            |
//! |--------|-----------------------|--------------------|
//! | GET    | /products             | products::list     |
//! | POST   | /products             | products::create   |
//! | GET    | /products/{id}        | products::show     |
//! | PUT    | /products/{id}        | products::update   |
//! | DELETE | /products/{id}        | products::delete   |
//! | GET    | /orders               | orders::list       |
//! | GET    | /orders/{id}          | orders::show       |
//! | PATCH  | /orders/{id}/status   | orders::set_status |
//! | GET    | /settings             | settings::show     |
//! | PUT    | /settings             | settings::update   |

use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

pub mod orders;
pub mod products;
pub mod settings;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", patch(orders::set_status))
        .route("/settings", get(settings::show).put(settings::update))
}
