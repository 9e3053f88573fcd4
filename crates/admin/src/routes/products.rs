//! Catalog management handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use feira_core::{Product, ProductId};

use crate::db;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product create/update payload. The id is taken from the URL (update) or
/// generated (create), never from the body.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub is_smart: bool,
}

impl ProductPayload {
    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::Validation(
                "price must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            image: self.image,
            category: self.category,
            size: self.size,
            features: self.features,
            featured: self.featured,
            is_smart: self.is_smart,
        }
    }
}

/// List the full catalog.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = db::products::list(state.pool()).await?;
    Ok(Json(products))
}

/// Product detail by id.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id = ProductId::new(id);
    db::products::get_by_id(state.pool(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Create a product with a generated id.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    payload.validate()?;

    let product = payload.into_product(ProductId::new(Uuid::new_v4().to_string()));
    db::products::create(state.pool(), &product).await?;
    tracing::info!(product_id = %product.id, title = %product.title, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields.
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    payload.validate()?;

    let product = payload.into_product(ProductId::new(id));
    if !db::products::update(state.pool(), &product).await? {
        return Err(AppError::NotFound(format!("product {}", product.id)));
    }
    tracing::info!(product_id = %product.id, "product updated");

    Ok(Json(product))
}

/// Delete a product from the catalog.
///
/// Existing orders keep their denormalized item snapshots; carts still
/// pointing at the id drop the line on their next hydration.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = ProductId::new(id);
    if !db::products::delete(state.pool(), &id).await? {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    tracing::info!(product_id = %id, "product deleted");

    Ok(StatusCode::NO_CONTENT)
}
