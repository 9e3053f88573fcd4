//! Order status lifecycle and payment methods.
//!
//! Statuses are stored as text in the database so that rows written by older
//! deployments never fail to load. Parsing is strict on the write path
//! (admin transitions) and lenient on the read path: anything unrecognized
//! renders with the `pending` presentation.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Every order starts as `Pending`. Transitions follow a monotonic flow,
/// with cancellation allowed from any non-terminal state:
///
/// ```text
/// pending -> processing -> shipped -> delivered
///    \            \            \
///     `------------`------------`--> cancelled
/// ```
///
/// `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Fixed label/color pair for rendering a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPresentation {
    /// Customer-facing label (Portuguese).
    pub label: &'static str,
    /// CSS color token used by status badges.
    pub color: &'static str,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Stable wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a stored status, degrading unknown values to `Pending`.
    ///
    /// This is the read-path rule: an unrecognized status must never fail a
    /// page or a transition check, it just behaves like a fresh order.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Whether an admin may move an order from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered | Self::Cancelled)
        )
    }

    /// Statuses reachable from `self` in a single transition.
    #[must_use]
    pub fn allowed_transitions(self) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }

    /// Label/color pair for this status.
    #[must_use]
    pub const fn presentation(self) -> StatusPresentation {
        match self {
            Self::Pending => StatusPresentation {
                label: "Pendente",
                color: "yellow",
            },
            Self::Processing => StatusPresentation {
                label: "Em processamento",
                color: "blue",
            },
            Self::Shipped => StatusPresentation {
                label: "Enviado",
                color: "purple",
            },
            Self::Delivered => StatusPresentation {
                label: "Entregue",
                color: "green",
            },
            Self::Cancelled => StatusPresentation {
                label: "Cancelado",
                color: "red",
            },
        }
    }
}

/// Presentation for a raw status string as stored in the database.
///
/// Unknown values fall back to the `pending` presentation.
#[must_use]
pub fn presentation_for(raw: &str) -> StatusPresentation {
    OrderStatus::parse_lenient(raw).presentation()
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment method chosen at checkout.
///
/// No card data ever touches this system: the `Credit`/`Debit` methods only
/// select which payment instructions the customer sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Whatsapp,
    Pix,
    Credit,
    Debit,
}

impl PaymentMethod {
    /// Stable wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Pix => "pix",
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// Customer-facing label (Portuguese).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Whatsapp => "WhatsApp",
            Self::Pix => "Pix",
            Self::Credit => "Cartão de crédito",
            Self::Debit => "Cartão de débito",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whatsapp" => Ok(Self::Whatsapp),
            "pix" => Ok(Self::Pix),
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}
