//! Story domain — milestone tracking over the memory story lines, and the
//! one-shot events pinned to the clock.

use bevy::prelude::*;
use crate::shared::*;

pub mod events;
pub mod milestones;

pub struct StoryPlugin;

impl Plugin for StoryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (milestones::run_milestone_checks, events::check_events)
                .run_if(in_state(GameState::Playing)),
        );
    }
}
