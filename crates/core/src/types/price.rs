//! Per-currency price tables using decimal arithmetic.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the storefront.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The display symbol for this currency (e.g., "$").
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The ISO 4217 code for this currency (e.g., "USD").
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Format an amount for display (e.g., "$19.99").
    #[must_use]
    pub fn format_amount(self, amount: Decimal) -> String {
        format!("{}{amount:.2}", self.symbol())
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(format!("invalid currency code: {s}")),
        }
    }
}

/// Product prices denormalized by currency.
///
/// Catalog records carry one price per supported currency. Lookups fall
/// back to USD when the selected currency has no entry, so a record priced
/// only in USD still renders under any display currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct PriceTable(BTreeMap<CurrencyCode, Decimal>);

impl PriceTable {
    /// Create an empty price table.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert, for literals in tests and fixtures.
    #[must_use]
    pub fn with(mut self, currency: CurrencyCode, amount: Decimal) -> Self {
        self.0.insert(currency, amount);
        self
    }

    /// Add or replace the price for a currency.
    pub fn set(&mut self, currency: CurrencyCode, amount: Decimal) {
        self.0.insert(currency, amount);
    }

    /// Look up the price in the given currency, falling back to USD.
    ///
    /// Returns `None` only when the table has neither the requested
    /// currency nor a USD entry.
    #[must_use]
    pub fn amount_in(&self, currency: CurrencyCode) -> Option<Decimal> {
        self.0
            .get(&currency)
            .or_else(|| self.0.get(&CurrencyCode::USD))
            .copied()
    }

    /// True when no currency has a price.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
