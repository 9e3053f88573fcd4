//! Order types.
//!
//! Order line items are snapshots taken at checkout: title and price are
//! copied out of the product so that later edits or deletions in the catalog
//! never change an existing order. After creation, only `status` may change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId, UserId};
use super::status::{OrderStatus, PaymentMethod};

/// A single line of an order, denormalized from the product at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub title: String,
    /// Unit price at the moment of purchase.
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    /// Line total (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Shipping and contact information captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    /// Postal code.
    pub cep: String,
    /// Street number.
    pub numero: String,
    /// Optional address complement (apartment, block, ...).
    #[serde(default)]
    pub complemento: Option<String>,
    pub email: String,
}

/// A persisted order.
///
/// `status` is kept as the raw stored string so that rows holding values this
/// build does not know about still load; display and transition checks parse
/// it leniently (unknown degrades to `pending`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub status: String,
    pub payment_method: PaymentMethod,
    pub customer_info: CustomerInfo,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Assemble a new order at checkout time.
    ///
    /// Guarantees the creation invariants: a fresh id, `status = pending`,
    /// `subtotal` recomputed from the items, and `total = subtotal +
    /// shipping_fee`.
    #[must_use]
    pub fn new(
        user_id: UserId,
        items: Vec<OrderItem>,
        shipping_fee: Decimal,
        payment_method: PaymentMethod,
        customer_info: CustomerInfo,
        created_at: DateTime<Utc>,
    ) -> Self {
        let subtotal: Decimal = items.iter().map(OrderItem::line_total).sum();
        Self {
            id: OrderId::generate(),
            user_id,
            items,
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
            status: OrderStatus::Pending.as_str().to_owned(),
            payment_method,
            customer_info,
            created_at,
        }
    }

    /// Current status, with unknown stored values degrading to `Pending`.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        OrderStatus::parse_lenient(&self.status)
    }

    /// Total quantity across all items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_customer() -> CustomerInfo {
        CustomerInfo {
            name: "Ana Souza".to_owned(),
            phone: "+55 11 91234-5678".to_owned(),
            address: "Rua das Flores".to_owned(),
            cep: "01310-100".to_owned(),
            numero: "42".to_owned(),
            complemento: None,
            email: "ana@example.com".to_owned(),
        }
    }

    #[test]
    fn test_new_order_invariants() {
        let items = vec![
            OrderItem {
                product_id: ProductId::new("p-1"),
                title: "Produto A".to_owned(),
                price: Decimal::new(5000, 2),
                quantity: 2,
            },
            OrderItem {
                product_id: ProductId::new("p-2"),
                title: "Produto B".to_owned(),
                price: Decimal::new(3000, 2),
                quantity: 1,
            },
        ];
        let order = Order::new(
            UserId::new("u-1"),
            items,
            Decimal::ZERO,
            PaymentMethod::Pix,
            sample_customer(),
            Utc::now(),
        );

        assert_eq!(order.subtotal, Decimal::new(13000, 2));
        assert_eq!(order.total, Decimal::new(13000, 2));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_total_includes_shipping_fee() {
        let items = vec![OrderItem {
            product_id: ProductId::new("p-1"),
            title: "Produto A".to_owned(),
            price: Decimal::new(9999, 2),
            quantity: 1,
        }];
        let order = Order::new(
            UserId::new("u-1"),
            items,
            Decimal::new(1500, 2),
            PaymentMethod::Whatsapp,
            sample_customer(),
            Utc::now(),
        );

        assert_eq!(order.total, order.subtotal + order.shipping_fee);
        assert_eq!(order.total, Decimal::new(11499, 2));
    }

    #[test]
    fn test_unknown_stored_status_reads_as_pending() {
        let items = vec![OrderItem {
            product_id: ProductId::new("p-1"),
            title: "Produto A".to_owned(),
            price: Decimal::ONE,
            quantity: 1,
        }];
        let mut order = Order::new(
            UserId::new("u-1"),
            items,
            Decimal::ZERO,
            PaymentMethod::Credit,
            sample_customer(),
            Utc::now(),
        );
        order.status = "lost_in_migration".to_owned();
        assert_eq!(order.status(), OrderStatus::Pending);
    }
}
