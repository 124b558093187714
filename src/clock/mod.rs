//! Clock domain — the heartbeat of Everbloom.
//!
//! Responsible for:
//! - Advancing the 24-step solar-term clock on player command
//! - Rolling cycles over after Dahan and counting completed cycles
//! - Resetting the per-step action-point budget
//! - Refreshing the collectible tear offers for the new step
//! - Sending SeasonAdvancedEvent for the other domains to process

use bevy::prelude::*;

use crate::economy::collect::roll_collectibles;
use crate::shared::*;

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            handle_advance_season.run_if(in_state(GameState::Playing)),
        )
        // Once the ending event has fired, advances are refused outright.
        .add_systems(
            Update,
            refuse_advance_after_ending.run_if(in_state(GameState::Ended)),
        );
    }
}

/// Listens for [`AdvanceSeasonEvent`]. Each advance moves the clock one
/// solar term, restores the action-point budget, and refreshes the step's
/// collectible offers before notifying the other domains.
pub fn handle_advance_season(
    mut events: EventReader<AdvanceSeasonEvent>,
    mut clock: ResMut<GardenClock>,
    mut ap: ResMut<ActionPoints>,
    mut pouch: ResMut<TearPouch>,
    mut stats: ResMut<GardenStats>,
    tear_registry: Res<TearRegistry>,
    mut advanced_writer: EventWriter<SeasonAdvancedEvent>,
) {
    for _ in events.read() {
        let wrapped = clock.step.is_last();
        clock.step = clock.step.next();
        if wrapped {
            clock.cycle += 1;
            stats.cycles_completed += 1;
            info!("[Clock] Cycle {} begins", clock.cycle);
        }

        ap.reset();
        let offers = roll_collectibles(clock.step, &tear_registry, &pouch);
        pouch.available = offers;

        info!(
            "[Clock] Advanced to {} (cycle {}, {:?}) — {} collectible(s) this step",
            clock.step.display_name(),
            clock.cycle,
            clock.season(),
            pouch.available.len()
        );

        advanced_writer.send(SeasonAdvancedEvent {
            cycle: clock.cycle,
            step: clock.step,
            new_cycle: wrapped,
        });
    }
}

/// The clock stays frozen forever once the ending event has fired. Any
/// advance command that arrives afterwards is answered with a toast.
pub fn refuse_advance_after_ending(
    mut events: EventReader<AdvanceSeasonEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for _ in events.read() {
        toast_writer.send(ToastEvent {
            message: "The garden sleeps. The seasons no longer turn.".to_string(),
            duration_secs: 3.0,
        });
    }
}
