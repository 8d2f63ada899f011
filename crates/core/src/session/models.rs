use std::sync::Arc;

use crate::models::{ItemEntry, ShopContainer};

/// An in-progress bulk purchase.
///
/// Slot, item and container are fixed at creation; only `remaining` moves.
#[derive(Debug, Clone)]
pub struct BulkPurchaseSession {
    slot: usize,
    item: ItemEntry,
    container: Arc<ShopContainer>,
    remaining: u32,
    unit_price: Option<u64>,
}

impl BulkPurchaseSession {
    pub(crate) fn new(
        slot: usize,
        item: ItemEntry,
        container: Arc<ShopContainer>,
        remaining: u32,
        unit_price: Option<u64>,
    ) -> Self {
        Self {
            slot,
            item,
            container,
            remaining,
            unit_price,
        }
    }

    /// Slot being bought from.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Item being bought.
    pub fn item(&self) -> &ItemEntry {
        &self.item
    }

    /// Shop container the purchases are addressed to.
    pub fn container(&self) -> &ShopContainer {
        &self.container
    }

    /// Units still to buy.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Price of one unit; `None` when the description had no readable price.
    pub fn unit_price(&self) -> Option<u64> {
        self.unit_price
    }

    pub(crate) fn extend(&mut self, batch_size: u32) {
        self.remaining = self.remaining.saturating_add(batch_size);
    }

    pub(crate) fn decrement(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Snapshot for status displays.
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            slot: self.slot,
            item_name: self.item.plain_name(),
            remaining: self.remaining,
            unit_price: self.unit_price,
            total_cost: self
                .unit_price
                .map(|price| price.saturating_mul(u64::from(self.remaining))),
        }
    }
}

/// Read-only view of the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub slot: usize,
    pub item_name: String,
    pub remaining: u32,
    pub unit_price: Option<u64>,
    /// Cost of everything still queued.
    pub total_cost: Option<u64>,
}
