//! Cart and wishlist records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::{CurrencyCode, PriceTable};

/// A cart line: one product and the quantity requested.
///
/// Product fields are denormalized at add time so the cart renders without
/// a catalog lookup. Quantity is never 0 - reaching 0 removes the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    pub prices: PriceTable,
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl LineItem {
    /// Unit price in the given display currency (USD fallback).
    #[must_use]
    pub fn unit_price(&self, currency: CurrencyCode) -> Option<Decimal> {
        self.prices.amount_in(currency)
    }

    /// Line total (unit price times quantity) in the given currency.
    #[must_use]
    pub fn line_total(&self, currency: CurrencyCode) -> Option<Decimal> {
        self.unit_price(currency).map(|price| price * Decimal::from(self.quantity))
    }
}

/// A wishlist entry: denormalized product fields, membership keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub id: ProductId,
    pub name: String,
    pub prices: PriceTable,
    pub image_url: Option<String>,
}

/// One row of a bulk cart push: `{"productId": .., "quantity": ..}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tea() -> LineItem {
        LineItem {
            id: ProductId::new(7),
            name: "Jasmine Tea".to_owned(),
            prices: PriceTable::new().with(CurrencyCode::USD, Decimal::new(18, 0)),
            image_url: None,
            quantity: 3,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(
            tea().line_total(CurrencyCode::USD),
            Some(Decimal::new(54, 0))
        );
    }

    #[test]
    fn test_line_total_unpriced() {
        let mut item = tea();
        item.prices = PriceTable::new();
        assert_eq!(item.line_total(CurrencyCode::USD), None);
    }

    #[test]
    fn test_wire_field_names() {
        let line = CartLine {
            product_id: ProductId::new(7),
            quantity: 2,
        };
        assert_eq!(
            serde_json::to_string(&line).unwrap(),
            r#"{"productId":7,"quantity":2}"#
        );

        let item = tea();
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert_eq!(json.get("id").and_then(serde_json::Value::as_i64), Some(7));
    }
}
