//! In-session cart state machine.
//!
//! The `Cart` is the authoritative in-session view of what the customer is
//! buying. It holds display-ready lines (product id plus title/price/image
//! hydrated from the catalog) and derives `subtotal` and `item_count` from
//! the lines on every read; no aggregate is ever stored.
//!
//! Invariants:
//! - at most one line per product id
//! - every stored quantity is >= 1 (quantity 0 means removal)
//! - `version` increases on every state change, feeding the sync queue's
//!   stale-write detection; `epoch` identifies the in-memory instance, since
//!   a rehydrated cart restarts its version counter
//!
//! Persistence and concurrency live elsewhere: [`sessions`] keys live carts
//! by owner and hydrates user carts from the database, [`sync`] serializes
//! remote writes.

pub mod sessions;
pub mod sync;

pub use sessions::{CartOwner, CartSessions};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use feira_core::{Product, ProductId};

/// A display-ready cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub title: String,
    /// Unit price, denormalized at hydration time.
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartLine {
    /// Line total (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The persisted shape of a cart line: product id and quantity only.
///
/// Display fields are never persisted; they are re-resolved from the catalog
/// on hydration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineRecord {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The in-session cart.
#[derive(Debug)]
pub struct Cart {
    epoch: Uuid,
    lines: Vec<CartLine>,
    version: u64,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Uuid::new_v4(),
            lines: Vec::new(),
            version: 0,
        }
    }

    /// Build a cart from lines hydrated out of the persisted record.
    ///
    /// The version counter restarts at 0 under a fresh epoch.
    #[must_use]
    pub fn from_hydrated(lines: Vec<CartLine>) -> Self {
        Self {
            epoch: Uuid::new_v4(),
            lines,
            version: 0,
        }
    }

    /// Add one unit of a product.
    ///
    /// If a line for the product exists its quantity is incremented by 1,
    /// otherwise a new line is appended with quantity 1, denormalizing the
    /// display fields from the product.
    pub fn add_item(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                product_id: product.id.clone(),
                title: product.title.clone(),
                price: product.price,
                image: product.image.clone(),
                quantity: 1,
            });
        }
        self.version += 1;
    }

    /// Set a line's quantity. Zero or negative removes the line.
    ///
    /// There is no inventory model; positive values beyond the line's
    /// storage range clamp to `u32::MAX` rather than dropping the line.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.lines.iter_mut().find(|l| &l.product_id == product_id) {
            line.quantity = quantity;
            self.version += 1;
        }
    }

    /// Remove a line. No-op when the product is not in the cart.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        let before = self.lines.len();
        self.lines.retain(|l| &l.product_id != product_id);
        if self.lines.len() != before {
            self.version += 1;
        }
    }

    /// Empty the cart. Used after successful checkout.
    pub fn clear(&mut self) {
        if !self.lines.is_empty() {
            self.lines.clear();
            self.version += 1;
        }
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Reduce the cart to its persisted shape.
    #[must_use]
    pub fn records(&self) -> Vec<CartLineRecord> {
        self.lines
            .iter()
            .map(|l| CartLineRecord {
                product_id: l.product_id.clone(),
                quantity: l.quantity,
            })
            .collect()
    }

    /// Monotonic mutation counter, used to discard stale sync writes.
    ///
    /// Only comparable within one [`epoch`](Self::epoch): a rehydrated cart
    /// starts over at 0.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Identity of this in-memory cart instance.
    ///
    /// Regenerated on every hydration so the sync worker never compares
    /// version counters across cart generations.
    #[must_use]
    pub const fn epoch(&self) -> Uuid {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Produto {id}"),
            description: String::new(),
            price: Decimal::new(price_cents, 2),
            image: format!("https://cdn.example.com/{id}.jpg"),
            category: "geral".to_owned(),
            size: None,
            features: Vec::new(),
            featured: false,
            is_smart: false,
        }
    }

    #[test]
    fn test_add_item_new_line_has_quantity_one() {
        let mut cart = Cart::new();
        cart.add_item(&product("p-1", 5000));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(cart.lines()[0].title, "Produto p-1");
    }

    #[test]
    fn test_add_item_increments_existing_line() {
        let mut cart = Cart::new();
        let p = product("p-1", 5000);
        cart.add_item(&p);
        cart.add_item(&p);
        cart.add_item(&p);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_at_most_one_line_per_product_over_mixed_ops() {
        let mut cart = Cart::new();
        let a = product("p-a", 5000);
        let b = product("p-b", 3000);

        cart.add_item(&a);
        cart.add_item(&b);
        cart.add_item(&a);
        cart.update_quantity(&a.id, 5);
        cart.add_item(&a);

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_subtotal_exact_over_sequences() {
        let mut cart = Cart::new();
        cart.add_item(&product("p-1", 1999)); // 19.99
        cart.add_item(&product("p-2", 333)); // 3.33
        cart.update_quantity(&ProductId::new("p-2"), 3);

        // 19.99 + 3 * 3.33 = 29.98 exactly, no float drift
        assert_eq!(cart.subtotal(), Decimal::new(2998, 2));
    }

    #[test]
    fn test_update_quantity_zero_equals_remove() {
        let p = product("p-1", 5000);

        let mut via_update = Cart::new();
        via_update.add_item(&p);
        via_update.update_quantity(&p.id, 0);

        let mut via_remove = Cart::new();
        via_remove.add_item(&p);
        via_remove.remove_item(&p.id);

        assert_eq!(via_update.lines(), via_remove.lines());
        assert!(via_update.is_empty());
    }

    #[test]
    fn test_update_quantity_negative_removes() {
        let p = product("p-1", 5000);
        let mut cart = Cart::new();
        cart.add_item(&p);
        cart.update_quantity(&p.id, -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_above_u32_max_clamps() {
        let p = product("p-1", 5000);
        let mut cart = Cart::new();
        cart.add_item(&p);
        cart.update_quantity(&p.id, 5_000_000_000);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_update_quantity_replaces_value() {
        let p = product("p-1", 5000);
        let mut cart = Cart::new();
        cart.add_item(&p);
        cart.update_quantity(&p.id, 12);
        assert_eq!(cart.lines()[0].quantity, 12);
    }

    #[test]
    fn test_update_quantity_unknown_product_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product("p-1", 5000));
        let version = cart.version();
        cart.update_quantity(&ProductId::new("p-ghost"), 2);
        assert_eq!(cart.version(), version);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_item_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product("p-1", 5000));
        let version = cart.version();
        cart.remove_item(&ProductId::new("p-ghost"));
        assert_eq!(cart.version(), version);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_clear_then_count_is_zero() {
        let mut cart = Cart::new();
        cart.add_item(&product("p-1", 5000));
        cart.add_item(&product("p-2", 3000));
        cart.update_quantity(&ProductId::new("p-1"), 9);

        cart.clear();
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.subtotal(), Decimal::ZERO);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_disjoint_adds_commute() {
        let a = product("p-a", 5000);
        let b = product("p-b", 3000);

        let mut ab = Cart::new();
        ab.add_item(&a);
        ab.add_item(&b);

        let mut ba = Cart::new();
        ba.add_item(&b);
        ba.add_item(&a);

        let mut ab_records = ab.records();
        let mut ba_records = ba.records();
        ab_records.sort_by(|x, y| x.product_id.as_str().cmp(y.product_id.as_str()));
        ba_records.sort_by(|x, y| x.product_id.as_str().cmp(y.product_id.as_str()));

        assert_eq!(ab_records, ba_records);
        assert!(ab_records.iter().all(|r| r.quantity == 1));
        assert_eq!(ab_records.len(), 2);
    }

    #[test]
    fn test_records_strip_display_fields() {
        let mut cart = Cart::new();
        cart.add_item(&product("p-1", 5000));
        let records = cart.records();
        assert_eq!(
            records,
            vec![CartLineRecord {
                product_id: ProductId::new("p-1"),
                quantity: 1,
            }]
        );
    }

    #[test]
    fn test_every_instance_gets_its_own_epoch() {
        let first = Cart::new();
        let rehydrated = Cart::from_hydrated(Vec::new());
        assert_ne!(first.epoch(), rehydrated.epoch());
        assert_eq!(rehydrated.version(), 0);
    }

    #[test]
    fn test_version_increases_only_on_change() {
        let p = product("p-1", 5000);
        let mut cart = Cart::new();
        assert_eq!(cart.version(), 0);

        cart.add_item(&p);
        assert_eq!(cart.version(), 1);
        cart.update_quantity(&p.id, 4);
        assert_eq!(cart.version(), 2);
        cart.clear();
        assert_eq!(cart.version(), 3);

        // No-ops don't bump the version.
        cart.clear();
        cart.remove_item(&p.id);
        assert_eq!(cart.version(), 3);
    }
}
