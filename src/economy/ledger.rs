//! Ledger totals bookkeeping.
//!
//! Balance mutation happens synchronously in each command handler, under
//! the same exclusive borrow as its validation checks. The
//! [`LedgerChangeEvent`] notifications that trail those mutations are
//! tallied here.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

/// Running totals of everything earned and spent.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub total_tears_earned: u64,
    pub total_stones_earned: u64,
    pub total_spent: u64,
}

/// Accumulates [`LedgerChangeEvent`]s into [`LedgerTotals`] and logs them.
/// Runs in every state; the balances themselves were already applied by
/// the sender.
pub fn track_ledger_totals(
    mut events: EventReader<LedgerChangeEvent>,
    mut totals: ResMut<LedgerTotals>,
) {
    for ev in events.read() {
        if ev.amount >= 0 {
            let gain = ev.amount as u64;
            match ev.kind {
                CurrencyKind::Tears => {
                    totals.total_tears_earned = totals.total_tears_earned.saturating_add(gain)
                }
                CurrencyKind::Stones => {
                    totals.total_stones_earned = totals.total_stones_earned.saturating_add(gain)
                }
            }
            info!("[Ledger] {:?} +{}: {}", ev.kind, gain, ev.reason);
        } else {
            let cost = (-ev.amount) as u64;
            totals.total_spent = totals.total_spent.saturating_add(cost);
            info!("[Ledger] {:?} -{}: {}", ev.kind, cost, ev.reason);
        }
    }
}
