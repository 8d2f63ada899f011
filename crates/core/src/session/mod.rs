#![allow(missing_docs)]

//! The single bulk-purchase session and the state machine that owns it.

pub mod manager;
mod models;

pub use manager::{GestureOutcome, SessionManager, TickOutcome, CANNOT_AFFORD_MESSAGE};
pub use models::{BulkPurchaseSession, SessionStatus};
