#![warn(clippy::all, missing_docs)]

//! Core logic for shop bulk buying.
//!
//! A shift-click on a shop item queues a batch of purchases; game ticks then
//! send one purchase click at a time until the batch is bought, the player
//! runs out of money, or the shop closes. Tooltips of shop items preview the
//! cost of a whole batch.

pub mod afford;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod feature;
pub mod models;
pub mod ports;
pub mod price;
pub mod schedule;
pub mod session;
pub mod tooltip;

pub use crate::config::{AppConfig, BulkBuySpeed, ConfigHandle};
pub use error::BulkBuyError;
pub use feature::{BulkBuy, ClickResponse, SlotClick};
pub use models::{ClickKind, ItemEntry, ShopContainer};
pub use ports::{BalanceSource, Notifier, PurchaseRequest, PurchaseSink};
pub use session::{BulkPurchaseSession, GestureOutcome, SessionManager, SessionStatus, TickOutcome};
