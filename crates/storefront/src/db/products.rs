//! Read-only product queries.
//!
//! The storefront never writes to the catalog; products are managed by the
//! admin binary.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use feira_core::{Product, ProductId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    title: String,
    description: String,
    price: Decimal,
    image: String,
    category: String,
    size: Option<String>,
    features: Json<Vec<String>>,
    featured: bool,
    is_smart: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            title: row.title,
            description: row.description,
            price: row.price,
            image: row.image,
            category: row.category,
            size: row.size,
            features: row.features.0,
            featured: row.featured,
            is_smart: row.is_smart,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, title, description, price, image, category, size, features, featured, is_smart";

/// Fetch a product by id.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_id(pool: &PgPool, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Product::from))
}

/// List products, optionally filtered by category and/or featured flag.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list(
    pool: &PgPool,
    category: Option<&str>,
    featured: Option<bool>,
) -> Result<Vec<Product>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        r"
        SELECT {PRODUCT_COLUMNS}
        FROM products
        WHERE ($1::text IS NULL OR category = $1)
          AND ($2::boolean IS NULL OR featured = $2)
        ORDER BY title
        "
    ))
    .bind(category)
    .bind(featured)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Product::from).collect())
}
