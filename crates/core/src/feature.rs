//! Signal entry points tying the bulk-buy pieces together.
//!
//! The client layer owns the event sources (slot updates, clicks, ticks,
//! tooltip rendering, container close) and calls the matching `on_*` method
//! synchronously for each signal, in arrival order.

use std::sync::Arc;

use crate::{
    config::ConfigHandle,
    eligibility::{is_bulk_buyable, is_shop_opening},
    models::{ClickKind, ItemEntry, ShopContainer},
    ports::{BalanceSource, Notifier, PurchaseSink},
    schedule::Scheduler,
    session::{BulkPurchaseSession, GestureOutcome, SessionManager, SessionStatus, TickOutcome},
    tooltip::{bulk_buy_hints, rewrite_prices},
};

/// A click on a container slot.
#[derive(Debug, Clone, Copy)]
pub struct SlotClick<'a> {
    /// Clicked slot index.
    pub slot: usize,
    /// Item in the clicked slot.
    pub item: &'a ItemEntry,
    /// Container the slot belongs to.
    pub container: &'a Arc<ShopContainer>,
    /// How the slot was clicked.
    pub kind: ClickKind,
    /// Whether the bulk-buy modifier (Shift) was held.
    pub modifier_held: bool,
}

/// What the caller should do with a click after bulk buy has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickResponse {
    /// Suppress the shop's default single purchase.
    pub cancel_default: bool,
    /// Session change caused by the click, if any.
    pub outcome: Option<GestureOutcome>,
}

/// Bulk-buy feature state for one client.
#[derive(Debug)]
pub struct BulkBuy {
    config: ConfigHandle,
    sessions: SessionManager,
    scheduler: Scheduler,
}

impl BulkBuy {
    /// Create the feature around a live config.
    pub fn new(config: ConfigHandle) -> Self {
        Self {
            scheduler: Scheduler::new(config.clone()),
            sessions: SessionManager::new(),
            config,
        }
    }

    /// Live configuration.
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Active session, if any.
    pub fn session(&self) -> Option<&BulkPurchaseSession> {
        self.sessions.session()
    }

    /// Snapshot of the active session for the status widget.
    pub fn status(&self) -> Option<SessionStatus> {
        self.sessions.status()
    }

    /// Slot update while a container is open. Returns `true` when it marks a
    /// shop opening and the status widget should be shown.
    pub fn on_shop_opened(&self, slot: usize, container: &ShopContainer) -> bool {
        is_shop_opening(slot, container)
    }

    /// Shift-click handling.
    ///
    /// Every modifier-held click on a bulk-buyable item is captured, but only a
    /// quick-move click starts or extends a session.
    pub fn on_slot_clicked(&mut self, click: SlotClick<'_>) -> ClickResponse {
        if !click.modifier_held || !is_bulk_buyable(click.container, click.item) {
            return ClickResponse::default();
        }

        let outcome = (click.kind == ClickKind::QuickMove).then(|| {
            self.sessions.begin_or_extend(
                click.slot,
                click.item,
                click.container,
                self.config.batch_size(),
            )
        });

        ClickResponse {
            cancel_default: true,
            outcome,
        }
    }

    /// The shop closed; any session is discarded.
    pub fn on_container_closed(&mut self) -> Option<BulkPurchaseSession> {
        self.sessions.close()
    }

    /// Game tick carrying the world time counter.
    pub fn on_tick(
        &mut self,
        time: u64,
        balance: &dyn BalanceSource,
        sink: &mut dyn PurchaseSink,
        notifier: &mut dyn Notifier,
    ) -> TickOutcome {
        self.scheduler
            .on_tick(time, &mut self.sessions, balance, sink, notifier)
    }

    /// Tooltip about to render for `item`; returns the lines to show.
    ///
    /// Non-shop items pass through untouched. Shop items get the bulk-buy hints
    /// appended, and while the modifier is held their price line shows the
    /// cost of a whole batch.
    pub fn on_tooltip(
        &self,
        container: &ShopContainer,
        item: &ItemEntry,
        lines: &[String],
        modifier_held: bool,
        balance: u64,
    ) -> Vec<String> {
        if !is_bulk_buyable(container, item) {
            return lines.to_vec();
        }

        let batch_size = self.config.batch_size();
        let mut tooltip = if modifier_held {
            rewrite_prices(lines, batch_size, balance)
        } else {
            lines.to_vec()
        };
        tooltip.extend(bulk_buy_hints(batch_size));
        tooltip
    }
}
