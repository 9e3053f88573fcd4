//! Live cart registry keyed by owner.
//!
//! Carts are owned by an explicit key, never ambient state: authenticated
//! users get a durable cart hydrated from the database, guests get an
//! in-memory cart tied to their session id. Entries live in a `moka` cache
//! with idle eviction; an evicted user cart simply rehydrates on next touch,
//! an evicted guest cart is gone (guest carts are not durable, by design).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;

use feira_core::{Product, UserId};

use super::{Cart, CartLine, CartLineRecord};

/// Who a live cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
    /// Authenticated user; cart syncs to the database.
    User(UserId),
    /// Anonymous session; cart never syncs and dies with its cache entry.
    Guest(String),
}

impl CartOwner {
    /// The user id, when the owner is authenticated.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::User(id) => Some(id),
            Self::Guest(_) => None,
        }
    }
}

/// Registry of live carts.
pub struct CartSessions {
    cache: Cache<CartOwner, Arc<Mutex<Cart>>>,
}

impl CartSessions {
    /// Create a registry whose entries are evicted after `idle` without use.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .time_to_idle(idle)
                .max_capacity(100_000)
                .build(),
        }
    }

    /// Get the live cart for `owner`, initializing it with `init` on a miss.
    ///
    /// Concurrent callers for the same owner share a single initialization.
    ///
    /// # Errors
    ///
    /// Propagates the initialization error (wrapped in `Arc` by the cache).
    pub async fn get_or_try_init<E, F>(
        &self,
        owner: CartOwner,
        init: F,
    ) -> Result<Arc<Mutex<Cart>>, Arc<E>>
    where
        E: Send + Sync + 'static,
        F: Future<Output = Result<Cart, E>>,
    {
        self.cache
            .try_get_with(owner, async move { init.await.map(|c| Arc::new(Mutex::new(c))) })
            .await
    }

    /// Drop the live cart for `owner`, forcing rehydration on next touch.
    ///
    /// Used on login/logout so a user change never reads another owner's
    /// lines.
    pub async fn invalidate(&self, owner: &CartOwner) {
        self.cache.invalidate(owner).await;
    }
}

/// Turn persisted records plus their resolved products into display lines.
///
/// Lines whose product no longer resolves are silently dropped (products can
/// be deleted by the admin after a cart referenced them); a stored zero
/// quantity is treated the same way, since zero means removal.
#[must_use]
pub fn hydrate_lines(pairs: Vec<(CartLineRecord, Option<Product>)>) -> Vec<CartLine> {
    pairs
        .into_iter()
        .filter_map(|(record, product)| {
            if record.quantity == 0 {
                return None;
            }
            match product {
                Some(p) => Some(CartLine {
                    product_id: p.id,
                    title: p.title,
                    price: p.price,
                    image: p.image,
                    quantity: record.quantity,
                }),
                None => {
                    tracing::debug!(
                        product_id = %record.product_id,
                        "dropping cart line: product no longer resolves"
                    );
                    None
                }
            }
        })
        .collect()
}
