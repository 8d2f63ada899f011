//! Collaborators the core drives but does not own.

use crate::models::{ClickKind, ItemEntry};

/// One purchase click, addressed the way the container transport expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseRequest<'a> {
    /// Slot holding the item being bought.
    pub slot: usize,
    /// Id of the open shop container.
    pub container_id: i32,
    /// Click to send.
    pub click: ClickKind,
    /// Container contents as last seen by the client.
    pub contents: &'a [Option<ItemEntry>],
}

/// Performs purchase clicks. Fire-and-forget: the core never looks at a result.
pub trait PurchaseSink {
    /// Send one purchase click.
    fn purchase(&mut self, request: PurchaseRequest<'_>);
}

/// Reports how much currency the player can spend right now.
pub trait BalanceSource {
    /// Spendable amount.
    fn balance(&self) -> u64;
}

/// Shows messages to the player.
pub trait Notifier {
    /// Display an error message.
    fn notify_error(&mut self, message: &str);
}
