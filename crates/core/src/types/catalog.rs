//! Catalog types: products and store-wide settings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A catalog product.
///
/// Products are created and edited exclusively through the admin API. The
/// storefront treats them as immutable within a session and re-fetches by id
/// when hydrating a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// Unit price in BRL. Never negative.
    pub price: Decimal,
    /// Primary image URI.
    pub image: String,
    /// Category tag (e.g. "iluminacao", "seguranca").
    pub category: String,
    /// Optional size tag.
    pub size: Option<String>,
    /// Ordered list of feature bullet points.
    pub features: Vec<String>,
    /// Shown on the home page highlight strip.
    pub featured: bool,
    /// Smart-home capable product.
    pub is_smart: bool,
}

/// Store-wide settings edited in the admin panel.
///
/// Checkout reads these at submit time; the values are never hard-coded in
/// the pricing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Flat shipping fee charged below the free-shipping threshold.
    pub flat_shipping_fee: Decimal,
    /// Subtotal at which shipping becomes free (inclusive).
    pub free_shipping_threshold: Decimal,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            flat_shipping_fee: Decimal::new(1500, 2),
            free_shipping_threshold: Decimal::new(10000, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = StoreSettings::default();
        assert_eq!(settings.flat_shipping_fee, Decimal::new(1500, 2));
        assert_eq!(settings.free_shipping_threshold, Decimal::new(10000, 2));
    }

    #[test]
    fn test_product_serde_roundtrip() {
        let product = Product {
            id: ProductId::new("p-1"),
            title: "Lâmpada inteligente".to_owned(),
            description: "Wi-Fi, 9W".to_owned(),
            price: Decimal::new(7990, 2),
            image: "https://cdn.example.com/p-1.jpg".to_owned(),
            category: "iluminacao".to_owned(),
            size: None,
            features: vec!["16 milhões de cores".to_owned()],
            featured: true,
            is_smart: true,
        };
        let json = serde_json::to_string(&product).expect("serialize");
        let back: Product = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, product);
    }
}
