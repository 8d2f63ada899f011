//! Domain errors surfaced by the bulk-buy core.

use thiserror::Error;

/// Failures the bulk-buy core can report. None of them are fatal; every path
/// degrades to "no active session" plus a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkBuyError {
    /// No description line matched the price template.
    #[error("could not find a price for {item}")]
    PriceNotFound {
        /// First description line (usually the item name), kept for the diagnostic.
        item: String,
    },
    /// The balance does not cover the price of the next purchase.
    #[error("cannot afford {price} with a balance of {balance}")]
    InsufficientFunds {
        /// Spendable currency at the time of the check.
        balance: u64,
        /// Price that had to be covered.
        price: u64,
    },
    /// A configuration value was out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
