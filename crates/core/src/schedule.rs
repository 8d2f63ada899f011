//! Tick-driven cadence for automated purchases.

use crate::{
    config::ConfigHandle,
    ports::{BalanceSource, Notifier, PurchaseSink},
    session::{SessionManager, TickOutcome},
};

/// Forwards tick signals to the [`SessionManager`] on cadence boundaries.
///
/// The cadence is read from the live config on every tick, so a change takes
/// effect on the next one.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: ConfigHandle,
}

impl Scheduler {
    /// Build a scheduler reading its cadence from `config`.
    pub fn new(config: ConfigHandle) -> Self {
        Self { config }
    }

    /// Whether `time` lands on a cadence boundary.
    pub fn is_due(&self, time: u64) -> bool {
        time % self.config.speed().ticks_delay() == 0
    }

    /// Handle one tick signal carrying the game time counter.
    pub fn on_tick(
        &self,
        time: u64,
        manager: &mut SessionManager,
        balance: &dyn BalanceSource,
        sink: &mut dyn PurchaseSink,
        notifier: &mut dyn Notifier,
    ) -> TickOutcome {
        if !manager.is_active() {
            return TickOutcome::Idle;
        }
        if !self.is_due(time) {
            return TickOutcome::NotDue;
        }
        manager.tick(balance.balance(), sink, notifier)
    }
}
