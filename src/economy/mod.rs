//! Economy domain — the resource ledger and the currency faucets.
//!
//! All cross-domain communication goes through `crate::shared::*` events and
//! resources. No other domain module is imported here.

use bevy::prelude::*;

use crate::shared::*;

pub mod collect;
pub mod ledger;

use collect::{handle_collect, seed_initial_offers};
use ledger::{track_ledger_totals, LedgerTotals};

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LedgerTotals>()
            .add_systems(OnEnter(GameState::Playing), seed_initial_offers)
            .add_systems(
                Update,
                // Collect requests are validated (availability, action
                // points) and paid in a single pass.
                handle_collect.run_if(in_state(GameState::Playing)),
            )
            // Change notifications can arrive from any domain in any state,
            // including the frames around the ending transition.
            .add_systems(Update, track_ledger_totals);
    }
}
