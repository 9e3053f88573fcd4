//! Core types for Feira.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod id;
pub mod money;
pub mod order;
pub mod status;

pub use catalog::{Product, StoreSettings};
pub use id::*;
pub use money::format_brl;
pub use order::{CustomerInfo, Order, OrderItem};
pub use status::*;
