//! Garden domain — the 5×5 cell grid, building construction and decay,
//! flower planting and the growth engine.
//!
//! Communicates with other domains exclusively through crate::shared
//! events/resources.

use bevy::prelude::*;
use crate::shared::*;

mod grid;
pub mod buildings;
pub mod flowers;

pub struct GardenPlugin;

impl Plugin for GardenPlugin {
    fn build(&self, app: &mut App) {
        app
            // ------------------------------------------------------------------
            // Command handlers — run during Playing
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (
                    buildings::handle_build,
                    buildings::handle_repair,
                    flowers::handle_plant,
                    flowers::handle_water,
                )
                    .run_if(in_state(GameState::Playing)),
            )
            // ------------------------------------------------------------------
            // Season-advance processing — decay accrues before passive growth
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (
                    buildings::decay_on_advance,
                    flowers::passive_growth_on_advance,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
