//! Feira Core - Shared types library.
//!
//! This crate provides common types used across all Feira components:
//! - `storefront` - Public catalog, cart and checkout API
//! - `admin` - Internal administration API (order lifecycle, settings)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, money formatting, catalog/order models,
//!   and the order status lifecycle

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
