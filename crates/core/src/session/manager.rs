//! State machine for the single bulk-purchase session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    afford::ensure_affordable,
    error::BulkBuyError,
    models::{ClickKind, ItemEntry, ShopContainer},
    ports::{Notifier, PurchaseRequest, PurchaseSink},
    price::find_item_price,
};

use super::models::{BulkPurchaseSession, SessionStatus};

/// Message shown when the balance runs out mid-session.
pub const CANNOT_AFFORD_MESSAGE: &str = "You cannot afford to keep bulk buying this item.";

/// Result of a qualifying shift-click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// A new session started.
    Created {
        /// Units queued.
        remaining: u32,
    },
    /// The active session got another batch.
    Extended {
        /// Units queued after the extension.
        remaining: u32,
    },
    /// Nothing changed: a session for another slot is running, or the batch
    /// size was zero.
    Ignored,
}

/// Result of a tick signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session is active.
    Idle,
    /// The tick did not land on a cadence boundary.
    NotDue,
    /// One unit was bought and more are queued.
    Purchased {
        /// Units still queued.
        remaining: u32,
    },
    /// The last queued unit was bought; the session ended.
    Completed,
    /// The balance did not cover the unit price; the session ended without buying.
    CannotAfford(BulkBuyError),
}

/// Owns the at-most-one active [`BulkPurchaseSession`].
#[derive(Debug, Default)]
pub struct SessionManager {
    session: Option<BulkPurchaseSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&BulkPurchaseSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn status(&self) -> Option<SessionStatus> {
        self.session.as_ref().map(BulkPurchaseSession::status)
    }

    /// Start a session on `slot`, or add a batch to the one already running there.
    ///
    /// The unit price is read from the item description once, at creation. A
    /// description without a price still starts a session; it will stop at its
    /// first due tick because an unknown price is never affordable.
    pub fn begin_or_extend(
        &mut self,
        slot: usize,
        item: &ItemEntry,
        container: &Arc<ShopContainer>,
        batch_size: u32,
    ) -> GestureOutcome {
        if batch_size == 0 {
            return GestureOutcome::Ignored;
        }
        if let Some(session) = self.session.as_mut() {
            if session.slot() != slot {
                debug!(
                    active_slot = session.slot(),
                    slot, "Ignoring shift-click on another slot during bulk buy"
                );
                return GestureOutcome::Ignored;
            }
            session.extend(batch_size);
            info!(slot, remaining = session.remaining(), "Bulk buy extended");
            return GestureOutcome::Extended {
                remaining: session.remaining(),
            };
        }

        let unit_price = match find_item_price(&item.lore) {
            Ok(price) => Some(price),
            Err(err) => {
                warn!("Bulk buy {err}");
                None
            }
        };
        let session = BulkPurchaseSession::new(
            slot,
            item.clone(),
            Arc::clone(container),
            batch_size,
            unit_price,
        );
        info!(
            slot,
            item = %item.plain_name(),
            remaining = batch_size,
            unit_price = ?unit_price,
            "Bulk buy started"
        );
        self.session = Some(session);
        GestureOutcome::Created {
            remaining: batch_size,
        }
    }

    /// Drop the session because the shop closed. Purchases already sent are not
    /// reconciled.
    pub fn close(&mut self) -> Option<BulkPurchaseSession> {
        let closed = self.session.take();
        if let Some(session) = &closed {
            info!(
                slot = session.slot(),
                remaining = session.remaining(),
                "Bulk buy cancelled by container close"
            );
        }
        closed
    }

    /// Advance the session by one purchase.
    ///
    /// Callers decide whether the tick is due; see [`crate::schedule::Scheduler`].
    pub fn tick(
        &mut self,
        balance: u64,
        sink: &mut dyn PurchaseSink,
        notifier: &mut dyn Notifier,
    ) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };

        if let Err(err) = ensure_affordable(balance, session.unit_price()) {
            info!(slot = session.slot(), balance, "Bulk buy stopped: {err}");
            notifier.notify_error(CANNOT_AFFORD_MESSAGE);
            self.session = None;
            return TickOutcome::CannotAfford(err);
        }

        sink.purchase(PurchaseRequest {
            slot: session.slot(),
            container_id: session.container().id,
            click: ClickKind::Right,
            contents: &session.container().slots,
        });
        session.decrement();
        let remaining = session.remaining();
        debug!(slot = session.slot(), remaining, "Bulk buy purchase sent");

        if remaining == 0 {
            info!(slot = session.slot(), "Bulk buy completed");
            self.session = None;
            TickOutcome::Completed
        } else {
            TickOutcome::Purchased { remaining }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{SHOP_CONTAINER_SIZE, TITLE_SLOT};

    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub clicks: Vec<(usize, i32, ClickKind)>,
    }

    impl PurchaseSink for RecordingSink {
        fn purchase(&mut self, request: PurchaseRequest<'_>) {
            self.clicks
                .push((request.slot, request.container_id, request.click));
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub errors: Vec<String>,
    }

    impl Notifier for RecordingNotifier {
        fn notify_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    pub(crate) fn priced_item(price: u64) -> ItemEntry {
        ItemEntry::new(
            "§fRecall Scroll",
            vec![
                "§fRecall Scroll".to_string(),
                "§6Price:".to_string(),
                format!("§6 - §a✔ §f{price}§7²"),
            ],
        )
    }

    pub(crate) fn scroll_shop() -> Arc<ShopContainer> {
        let mut slots = vec![None; SHOP_CONTAINER_SIZE];
        slots[TITLE_SLOT] = Some(ItemEntry::new("§aScroll Shop", Vec::new()));
        slots[10] = Some(priced_item(100));
        slots[11] = Some(priced_item(40));
        Arc::new(ShopContainer::new(12, slots))
    }

    #[test]
    fn second_gesture_extends_remaining() {
        let shop = scroll_shop();
        let mut manager = SessionManager::new();
        let item = priced_item(100);

        assert_eq!(
            manager.begin_or_extend(10, &item, &shop, 4),
            GestureOutcome::Created { remaining: 4 }
        );
        assert_eq!(
            manager.begin_or_extend(10, &item, &shop, 4),
            GestureOutcome::Extended { remaining: 8 }
        );
        let session = manager.session().expect("active session");
        assert_eq!(session.remaining(), 8);
        assert_eq!(session.unit_price(), Some(100));
        assert_eq!(session.slot(), 10);
    }

    #[test]
    fn zero_batch_never_starts_a_session() {
        let shop = scroll_shop();
        let mut manager = SessionManager::new();
        let mut sink = RecordingSink::default();
        let mut notifier = RecordingNotifier::default();

        assert_eq!(
            manager.begin_or_extend(10, &priced_item(100), &shop, 0),
            GestureOutcome::Ignored
        );
        assert!(!manager.is_active());
        assert_eq!(
            manager.tick(1_000, &mut sink, &mut notifier),
            TickOutcome::Idle
        );
        assert!(sink.clicks.is_empty());

        manager.begin_or_extend(10, &priced_item(100), &shop, 2);
        assert_eq!(
            manager.begin_or_extend(10, &priced_item(100), &shop, 0),
            GestureOutcome::Ignored
        );
        assert_eq!(manager.session().map(|s| s.remaining()), Some(2));
    }

    #[test]
    fn gesture_on_other_slot_leaves_session_alone() {
        let shop = scroll_shop();
        let mut manager = SessionManager::new();
        manager.begin_or_extend(10, &priced_item(100), &shop, 4);
        assert_eq!(
            manager.begin_or_extend(11, &priced_item(40), &shop, 4),
            GestureOutcome::Ignored
        );
        let status = manager.status().expect("active session");
        assert_eq!(status.slot, 10);
        assert_eq!(status.remaining, 4);
        assert_eq!(status.total_cost, Some(400));
    }

    #[test]
    fn last_affordable_tick_completes_session() {
        let shop = scroll_shop();
        let mut manager = SessionManager::new();
        let mut sink = RecordingSink::default();
        let mut notifier = RecordingNotifier::default();
        manager.begin_or_extend(10, &priced_item(100), &shop, 1);

        let outcome = manager.tick(1_000, &mut sink, &mut notifier);
        assert_eq!(outcome, TickOutcome::Completed);
        assert!(!manager.is_active());
        assert_eq!(sink.clicks, vec![(10, 12, ClickKind::Right)]);
        assert!(notifier.errors.is_empty());
    }

    #[test]
    fn affordable_tick_decrements_by_one() {
        let shop = scroll_shop();
        let mut manager = SessionManager::new();
        let mut sink = RecordingSink::default();
        let mut notifier = RecordingNotifier::default();
        manager.begin_or_extend(10, &priced_item(100), &shop, 3);

        assert_eq!(
            manager.tick(1_000, &mut sink, &mut notifier),
            TickOutcome::Purchased { remaining: 2 }
        );
        assert_eq!(
            manager.tick(1_000, &mut sink, &mut notifier),
            TickOutcome::Purchased { remaining: 1 }
        );
        assert_eq!(sink.clicks.len(), 2);
    }

    #[test]
    fn unaffordable_tick_ends_session_without_buying() {
        let shop = scroll_shop();
        let mut manager = SessionManager::new();
        let mut sink = RecordingSink::default();
        let mut notifier = RecordingNotifier::default();
        manager.begin_or_extend(10, &priced_item(100), &shop, 4);

        let outcome = manager.tick(50, &mut sink, &mut notifier);
        assert_eq!(
            outcome,
            TickOutcome::CannotAfford(BulkBuyError::InsufficientFunds {
                balance: 50,
                price: 100
            })
        );
        assert!(!manager.is_active());
        assert!(sink.clicks.is_empty());
        assert_eq!(notifier.errors, vec![CANNOT_AFFORD_MESSAGE.to_string()]);
    }

    #[test]
    fn unknown_price_stops_at_first_tick() {
        let shop = scroll_shop();
        let mut manager = SessionManager::new();
        let mut sink = RecordingSink::default();
        let mut notifier = RecordingNotifier::default();
        let unpriced = ItemEntry::new("§fMystery", vec!["§6Price:".to_string()]);

        assert_eq!(
            manager.begin_or_extend(10, &unpriced, &shop, 4),
            GestureOutcome::Created { remaining: 4 }
        );
        assert_eq!(manager.session().and_then(|s| s.unit_price()), None);
        assert!(matches!(
            manager.tick(u64::MAX, &mut sink, &mut notifier),
            TickOutcome::CannotAfford(_)
        ));
        assert!(sink.clicks.is_empty());
    }

    #[test]
    fn close_discards_any_session() {
        let shop = scroll_shop();
        let mut manager = SessionManager::new();
        assert!(manager.close().is_none());

        manager.begin_or_extend(10, &priced_item(100), &shop, 4);
        manager.begin_or_extend(10, &priced_item(100), &shop, 4);
        let closed = manager.close().expect("session was active");
        assert_eq!(closed.remaining(), 8);
        assert!(!manager.is_active());

        let mut sink = RecordingSink::default();
        let mut notifier = RecordingNotifier::default();
        assert_eq!(
            manager.tick(1_000, &mut sink, &mut notifier),
            TickOutcome::Idle
        );
    }
}
