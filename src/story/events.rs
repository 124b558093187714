//! One-shot narrative events keyed to a (cycle, solar term) pair. An
//! ending event moves the game to `GameState::Ended`, freezing the clock.

use bevy::prelude::*;

use crate::shared::*;

/// Checks the event table after every season advance. The triggered set
/// in [`EventProgress`] guarantees each event fires at most once, even if
/// the clock somehow revisits the same (cycle, step).
pub fn check_events(
    mut advanced: EventReader<SeasonAdvancedEvent>,
    registry: Res<EventRegistry>,
    mut progress: ResMut<EventProgress>,
    mut next_state: ResMut<NextState<GameState>>,
    mut fired_writer: EventWriter<StoryEventFiredEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for ev in advanced.read() {
        let mut due: Vec<&EventDef> = registry
            .events
            .values()
            .filter(|d| d.cycle == ev.cycle && d.step == ev.step)
            .collect();
        due.sort_by(|a, b| a.id.cmp(&b.id));

        for def in due {
            if !progress.triggered.insert(def.id.clone()) {
                continue;
            }

            info!(
                "[Story] Event '{}' fires at cycle {} {}",
                def.id,
                ev.cycle,
                ev.step.display_name()
            );
            fired_writer.send(StoryEventFiredEvent {
                event_id: def.id.clone(),
                narration: def.narration.clone(),
                ending: def.ending,
            });
            toast_writer.send(ToastEvent {
                message: def.narration.clone(),
                duration_secs: 6.0,
            });

            if def.ending {
                info!("[Story] The garden's story ends here.");
                next_state.set(GameState::Ended);
            }
        }
    }
}
