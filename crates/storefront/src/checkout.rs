//! Checkout: validation, pricing, order assembly, payment instructions.
//!
//! The pure pieces live here so they can be tested without a database: field
//! validation, the shipping-fee policy, turning cart lines into an order
//! document, and composing the three payment-instruction flows. The HTTP
//! handler in `routes::checkout` wires them to persistence.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use feira_core::{
    CustomerInfo, Order, OrderItem, PaymentMethod, StoreSettings, UserId, format_brl,
};

use crate::cart::CartLine;
use crate::config::PaymentConfig;

/// Validate the shipping/contact form.
///
/// Every required field must be non-empty after trimming. Returns the full
/// list of missing fields so the client can highlight them all at once.
/// This runs server-side on every submission; client-side checks are a
/// convenience, not a boundary.
pub fn validate_customer(info: &CustomerInfo) -> Result<(), Vec<&'static str>> {
    let mut missing = Vec::new();
    let required: [(&'static str, &str); 6] = [
        ("name", &info.name),
        ("phone", &info.phone),
        ("address", &info.address),
        ("cep", &info.cep),
        ("numero", &info.numero),
        ("email", &info.email),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            missing.push(field);
        }
    }
    if missing.is_empty() { Ok(()) } else { Err(missing) }
}

/// Shipping fee for a subtotal: free at or above the threshold (inclusive),
/// the configured flat fee below it.
#[must_use]
pub fn shipping_fee(subtotal: Decimal, settings: &StoreSettings) -> Decimal {
    if subtotal >= settings.free_shipping_threshold {
        Decimal::ZERO
    } else {
        settings.flat_shipping_fee
    }
}

/// Assemble the order document from the current cart.
///
/// Each line's title and price are copied out of the cart (which denormalized
/// them from the catalog at hydration), so the order never changes
/// retroactively when a product is edited or deleted.
#[must_use]
pub fn build_order(
    user_id: UserId,
    lines: &[CartLine],
    settings: &StoreSettings,
    payment_method: PaymentMethod,
    customer: CustomerInfo,
    now: DateTime<Utc>,
) -> Order {
    let items: Vec<OrderItem> = lines
        .iter()
        .map(|line| OrderItem {
            product_id: line.product_id.clone(),
            title: line.title.clone(),
            price: line.price,
            quantity: line.quantity,
        })
        .collect();

    let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();
    let fee = shipping_fee(subtotal, settings);

    Order::new(user_id, items, fee, payment_method, customer, now)
}

/// Post-purchase payment instructions, one of three flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentInstructions {
    /// Open a messaging deep link with the order summary prefilled.
    Whatsapp { link: String, message: String },
    /// Show the fixed Pix key with copy-and-pay steps; confirmation is
    /// manual and out-of-band.
    Pix { key: String, steps: Vec<String> },
    /// Card payments continue over the messaging deep link; no card data is
    /// ever collected here.
    Card { link: String, note: String },
}

/// Compose the instructions for the chosen payment method.
#[must_use]
pub fn payment_instructions(
    method: PaymentMethod,
    order: &Order,
    payment: &PaymentConfig,
) -> PaymentInstructions {
    match method {
        PaymentMethod::Whatsapp => {
            let message = order_summary_message(order);
            PaymentInstructions::Whatsapp {
                link: whatsapp_link(&payment.whatsapp_number, &message),
                message,
            }
        }
        PaymentMethod::Pix => PaymentInstructions::Pix {
            key: payment.pix_key.clone(),
            steps: vec![
                "Abra o aplicativo do seu banco e escolha pagar com Pix.".to_owned(),
                "Copie a chave Pix acima e cole no campo de destinatário.".to_owned(),
                format!(
                    "Transfira {} e guarde o comprovante.",
                    format_brl(order.total)
                ),
                format!(
                    "Envie o comprovante pelo WhatsApp citando o pedido #{}.",
                    order.id.short()
                ),
            ],
        },
        PaymentMethod::Credit | PaymentMethod::Debit => {
            let message = format!(
                "Olá! Quero pagar o pedido #{} ({}) com {}.",
                order.id.short(),
                format_brl(order.total),
                method.label().to_lowercase(),
            );
            PaymentInstructions::Card {
                link: whatsapp_link(&payment.whatsapp_number, &message),
                note: "Continue pelo WhatsApp para combinar o pagamento com cartão. \
                       Nenhum dado de cartão é coletado por este site."
                    .to_owned(),
            }
        }
    }
}

/// Human-readable order summary used as prefilled deep-link text.
#[must_use]
pub fn order_summary_message(order: &Order) -> String {
    let mut message = format!("*Novo pedido #{}*\n\n", order.id.short());

    for item in &order.items {
        message.push_str(&format!(
            "{}x {} — {}\n",
            item.quantity,
            item.title,
            format_brl(item.line_total()),
        ));
    }

    let freight = if order.shipping_fee.is_zero() {
        "Grátis".to_owned()
    } else {
        format_brl(order.shipping_fee)
    };
    message.push_str(&format!(
        "\nSubtotal: {}\nFrete: {}\nTotal: {}\n",
        format_brl(order.subtotal),
        freight,
        format_brl(order.total),
    ));

    let info = &order.customer_info;
    message.push_str(&format!(
        "\nNome: {}\nEndereço: {}, {}",
        info.name, info.address, info.numero,
    ));
    if let Some(complemento) = &info.complemento {
        message.push_str(&format!(" ({complemento})"));
    }
    message.push_str(&format!(
        "\nCEP: {}\nTelefone: {}\n",
        info.cep, info.phone,
    ));

    message
}

/// `wa.me` deep link with the message URL-encoded as prefilled text.
#[must_use]
pub fn whatsapp_link(number: &str, message: &str) -> String {
    format!("https://wa.me/{number}?text={}", urlencoding::encode(message))
}

#[cfg(test)]
mod tests {
    use feira_core::{OrderStatus, ProductId};

    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 2)
    }

    fn settings() -> StoreSettings {
        StoreSettings {
            flat_shipping_fee: dec(1500),
            free_shipping_threshold: dec(10000),
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Ana Souza".to_owned(),
            phone: "+55 11 91234-5678".to_owned(),
            address: "Rua das Flores".to_owned(),
            cep: "01310-100".to_owned(),
            numero: "42".to_owned(),
            complemento: Some("ap 31".to_owned()),
            email: "ana@example.com".to_owned(),
        }
    }

    fn line(id: &str, price_cents: i64, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            title: format!("Produto {id}"),
            price: dec(price_cents),
            image: String::new(),
            quantity,
        }
    }

    fn payment_config() -> PaymentConfig {
        PaymentConfig {
            whatsapp_number: "5511912345678".to_owned(),
            pix_key: "pagamentos@example.com".to_owned(),
        }
    }

    #[test]
    fn test_validate_customer_ok() {
        assert_eq!(validate_customer(&customer()), Ok(()));
    }

    #[test]
    fn test_validate_customer_lists_all_missing_fields() {
        let mut info = customer();
        info.name = String::new();
        info.cep = "   ".to_owned();
        info.email = String::new();

        let missing = validate_customer(&info).expect_err("should fail");
        assert_eq!(missing, vec!["name", "cep", "email"]);
    }

    #[test]
    fn test_validate_customer_complement_is_optional() {
        let mut info = customer();
        info.complemento = None;
        assert_eq!(validate_customer(&info), Ok(()));
    }

    #[test]
    fn test_shipping_fee_boundary_is_inclusive() {
        // 99.99 pays the flat fee; 100.00 ships free.
        assert_eq!(shipping_fee(dec(9999), &settings()), dec(1500));
        assert_eq!(shipping_fee(dec(10000), &settings()), Decimal::ZERO);
        assert_eq!(shipping_fee(dec(10001), &settings()), Decimal::ZERO);
    }

    #[test]
    fn test_shipping_fee_reads_configured_values() {
        let custom = StoreSettings {
            flat_shipping_fee: dec(899),
            free_shipping_threshold: dec(25000),
        };
        assert_eq!(shipping_fee(dec(20000), &custom), dec(899));
        assert_eq!(shipping_fee(dec(25000), &custom), Decimal::ZERO);
    }

    #[test]
    fn test_build_order_over_threshold_ships_free() {
        // [{price: 50, qty: 2}, {price: 30, qty: 1}] -> subtotal 130 >= 100
        let lines = vec![line("p-a", 5000, 2), line("p-b", 3000, 1)];
        let order = build_order(
            UserId::new("u-1"),
            &lines,
            &settings(),
            PaymentMethod::Pix,
            customer(),
            Utc::now(),
        );

        assert_eq!(order.subtotal, dec(13000));
        assert_eq!(order.shipping_fee, Decimal::ZERO);
        assert_eq!(order.total, dec(13000));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn test_build_order_under_threshold_adds_flat_fee() {
        let lines = vec![line("p-a", 9999, 1)];
        let order = build_order(
            UserId::new("u-1"),
            &lines,
            &settings(),
            PaymentMethod::Whatsapp,
            customer(),
            Utc::now(),
        );

        assert_eq!(order.shipping_fee, dec(1500));
        assert_eq!(order.total, dec(11499));
    }

    #[test]
    fn test_build_order_snapshots_cart_lines() {
        let lines = vec![line("p-a", 5000, 2)];
        let order = build_order(
            UserId::new("u-1"),
            &lines,
            &settings(),
            PaymentMethod::Credit,
            customer(),
            Utc::now(),
        );

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, ProductId::new("p-a"));
        assert_eq!(order.items[0].title, "Produto p-a");
        assert_eq!(order.items[0].price, dec(5000));
        assert_eq!(order.items[0].quantity, 2);
    }

    #[test]
    fn test_whatsapp_instructions_carry_encoded_summary() {
        let lines = vec![line("p-a", 5000, 2), line("p-b", 3000, 1)];
        let order = build_order(
            UserId::new("u-1"),
            &lines,
            &settings(),
            PaymentMethod::Whatsapp,
            customer(),
            Utc::now(),
        );

        let instructions =
            payment_instructions(PaymentMethod::Whatsapp, &order, &payment_config());
        let PaymentInstructions::Whatsapp { link, message } = instructions else {
            panic!("expected whatsapp instructions");
        };

        assert!(message.contains("2x Produto p-a — R$ 100,00"));
        assert!(message.contains("1x Produto p-b — R$ 30,00"));
        assert!(message.contains("Frete: Grátis"));
        assert!(message.contains("Total: R$ 130,00"));
        assert!(message.contains("Ana Souza"));
        assert!(message.contains("(ap 31)"));

        assert!(link.starts_with("https://wa.me/5511912345678?text="));
        // The prefilled text must be URL-encoded.
        assert!(!link.contains(' '));
        assert!(link.contains("Novo%20pedido"));
    }

    #[test]
    fn test_pix_instructions_expose_key_and_steps() {
        let lines = vec![line("p-a", 5000, 1)];
        let order = build_order(
            UserId::new("u-1"),
            &lines,
            &settings(),
            PaymentMethod::Pix,
            customer(),
            Utc::now(),
        );

        let instructions = payment_instructions(PaymentMethod::Pix, &order, &payment_config());
        let PaymentInstructions::Pix { key, steps } = instructions else {
            panic!("expected pix instructions");
        };

        assert_eq!(key, "pagamentos@example.com");
        assert_eq!(steps.len(), 4);
        assert!(steps[2].contains("R$ 65,00")); // 50.00 + 15.00 freight
    }

    #[test]
    fn test_card_instructions_never_collect_card_data() {
        let lines = vec![line("p-a", 20000, 1)];
        let order = build_order(
            UserId::new("u-1"),
            &lines,
            &settings(),
            PaymentMethod::Debit,
            customer(),
            Utc::now(),
        );

        let instructions = payment_instructions(PaymentMethod::Debit, &order, &payment_config());
        let PaymentInstructions::Card { link, note } = instructions else {
            panic!("expected card instructions");
        };

        assert!(link.starts_with("https://wa.me/"));
        assert!(note.contains("Nenhum dado de cartão"));
    }
}
