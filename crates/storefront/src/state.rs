//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tokio::sync::Mutex;

use feira_core::{Product, ProductId};

use crate::cart::sync::{CartSyncHandle, PgCartWriter, spawn};
use crate::cart::{Cart, CartOwner, CartSessions};
use crate::config::StorefrontConfig;
use crate::db::{self, RepositoryError};
use crate::error::AppError;

/// How long product lookups stay cached. Products are immutable within a
/// session from the storefront's point of view.
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300);

/// How long an untouched live cart stays resident before eviction. User
/// carts rehydrate from the database on next touch; guest carts are gone.
const CART_IDLE_TTL: Duration = Duration::from_secs(60 * 60 * 2);

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    carts: CartSessions,
    products: Cache<ProductId, Product>,
    syncer: CartSyncHandle,
}

impl AppState {
    /// Create the application state and start the cart sync worker.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let syncer = spawn(PgCartWriter::new(pool.clone()));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                carts: CartSessions::new(CART_IDLE_TTL),
                products: Cache::builder()
                    .time_to_live(PRODUCT_CACHE_TTL)
                    .max_capacity(10_000)
                    .build(),
                syncer,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Resolve a product by id, via the in-memory cache.
    ///
    /// Only hits are cached; a miss goes back to the database every time so
    /// a freshly created product shows up immediately.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the lookup fails.
    pub async fn product(&self, id: &ProductId) -> Result<Option<Product>, AppError> {
        lookup_product(&self.inner.pool, &self.inner.products, id)
            .await
            .map_err(AppError::from)
    }

    /// The live cart for `owner`, hydrating user carts from the database on
    /// first touch.
    ///
    /// Hydration re-resolves every stored product id; lines whose product no
    /// longer exists are silently dropped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if hydration fails.
    pub async fn cart(&self, owner: &CartOwner) -> Result<Arc<Mutex<Cart>>, AppError> {
        let pool = self.inner.pool.clone();
        let products = self.inner.products.clone();
        let for_init = owner.clone();

        self.inner
            .carts
            .get_or_try_init(owner.clone(), async move {
                match for_init {
                    CartOwner::Guest(_) => Ok(Cart::new()),
                    CartOwner::User(user_id) => {
                        let records = db::carts::get(&pool, &user_id).await?;
                        let mut pairs = Vec::with_capacity(records.len());
                        for record in records {
                            let product =
                                lookup_product(&pool, &products, &record.product_id).await?;
                            pairs.push((record, product));
                        }
                        Ok(Cart::from_hydrated(crate::cart::sessions::hydrate_lines(
                            pairs,
                        )))
                    }
                }
            })
            .await
            .map_err(|e: Arc<RepositoryError>| AppError::Internal(e.to_string()))
    }

    /// Drop the live cart for `owner` (login/logout), forcing rehydration.
    pub async fn invalidate_cart(&self, owner: &CartOwner) {
        self.inner.carts.invalidate(owner).await;
    }

    /// Queue the cart's current state for persistence when the owner is an
    /// authenticated user. Guest carts never sync.
    pub fn sync_cart(&self, owner: &CartOwner, cart: &Cart) {
        if let Some(user_id) = owner.user_id() {
            self.inner
                .syncer
                .enqueue(user_id.clone(), cart.epoch(), cart.version(), cart.records());
        }
    }
}

/// Cache-through product lookup shared by `AppState::product` and cart
/// hydration.
async fn lookup_product(
    pool: &PgPool,
    cache: &Cache<ProductId, Product>,
    id: &ProductId,
) -> Result<Option<Product>, RepositoryError> {
    if let Some(product) = cache.get(id).await {
        return Ok(Some(product));
    }
    let product = db::products::get_by_id(pool, id).await?;
    if let Some(product) = &product {
        cache.insert(id.clone(), product.clone()).await;
    }
    Ok(product)
}
