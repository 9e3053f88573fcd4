//! Catalog writes and reads for the admin panel.

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

/// List the full catalog, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list(pool: &PgPool) -> Result<Vec<Product>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Product::from).collect())
}

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

/// Insert a new product. Fails if the id already exists.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails, including on a
/// duplicate id.
pub async fn create(pool: &PgPool, product: &Product) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO products
            (id, title, description, price, image, category, size, features,
             featured, is_smart)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ",
    )
    .bind(product.id.as_str())
    .bind(&product.title)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.image)
    .bind(&product.category)
    .bind(product.size.as_deref())
    .bind(Json(&product.features))
    .bind(product.featured)
    .bind(product.is_smart)
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace a product's fields. Returns `false` if the id does not exist.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn update(pool: &PgPool, product: &Product) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE products SET
            title = $2, description = $3, price = $4, image = $5,
            category = $6, size = $7, features = $8, featured = $9,
            is_smart = $10, updated_at = now()
        WHERE id = $1
        ",
    )
    .bind(product.id.as_str())
    .bind(&product.title)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.image)
    .bind(&product.category)
    .bind(product.size.as_deref())
    .bind(Json(&product.features))
    .bind(product.featured)
    .bind(product.is_smart)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a product. Returns `false` if the id does not exist.
///
/// Past orders keep their denormalized copy of the product data, so deleting
/// from the catalog never touches order history.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn delete(pool: &PgPool, id: &ProductId) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
