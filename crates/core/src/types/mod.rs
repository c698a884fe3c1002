//! Core types for Tidepool.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod collection;
pub mod id;
pub mod item;
pub mod price;

pub use collection::CollectionKind;
pub use id::ProductId;
pub use item::{CartLine, LineItem, WishlistEntry};
pub use price::{CurrencyCode, PriceTable};
