mod shared;
mod clock;
mod economy;
mod garden;
mod quiz;
mod story;
mod save;
mod data;

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(50))),
        )
        .add_plugins(StatesPlugin)
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<GardenClock>()
        .init_resource::<ActionPoints>()
        .init_resource::<Ledger>()
        .init_resource::<GardenGrid>()
        .init_resource::<Flowers>()
        .init_resource::<Buildings>()
        .init_resource::<TearPouch>()
        .init_resource::<Aviary>()
        .init_resource::<Memories>()
        .init_resource::<StoryProgress>()
        .init_resource::<EventProgress>()
        .init_resource::<GardenStats>()
        // Registries
        .init_resource::<TearRegistry>()
        .init_resource::<FlowerRegistry>()
        .init_resource::<BuildingRegistry>()
        .init_resource::<BirdRegistry>()
        .init_resource::<MemoryRegistry>()
        .init_resource::<StoryRegistry>()
        .init_resource::<EventRegistry>()
        .init_resource::<ComboRegistry>()
        .init_resource::<QuizRegistry>()
        // Command events
        .add_event::<AdvanceSeasonEvent>()
        .add_event::<CollectCurrencyEvent>()
        .add_event::<BuildEvent>()
        .add_event::<RepairEvent>()
        .add_event::<PlantFlowerEvent>()
        .add_event::<WaterFlowerEvent>()
        .add_event::<StartQuizEvent>()
        .add_event::<AnswerQuizEvent>()
        .add_event::<AbandonQuizEvent>()
        // Notification events
        .add_event::<SeasonAdvancedEvent>()
        .add_event::<LedgerChangeEvent>()
        .add_event::<FlowerLeveledEvent>()
        .add_event::<FlowerAwakenedEvent>()
        .add_event::<BirdUnlockedEvent>()
        .add_event::<MemoryDiscoveredEvent>()
        .add_event::<MemoryUnlockedEvent>()
        .add_event::<MilestoneFiredEvent>()
        .add_event::<StoryEventFiredEvent>()
        .add_event::<ToastEvent>()
        // Domain plugins
        .add_plugins(clock::ClockPlugin)
        .add_plugins(economy::EconomyPlugin)
        .add_plugins(garden::GardenPlugin)
        .add_plugins(quiz::QuizPlugin)
        .add_plugins(story::StoryPlugin)
        .add_plugins(save::SavePlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Scripted demo driver: plays the garden until the ending fires
        .add_systems(
            Update,
            demo_driver.run_if(in_state(GameState::Playing)),
        )
        .add_systems(Update, exit_when_ended)
        .add_systems(Update, print_toasts)
        .run();
}

/// Plays one action per frame: gathers stones while the budget lasts, then
/// advances the season. Enough of a loop to watch the whole story play out
/// in the log.
fn demo_driver(
    ap: Res<ActionPoints>,
    pouch: Res<TearPouch>,
    mut collect_writer: EventWriter<CollectCurrencyEvent>,
    mut advance_writer: EventWriter<AdvanceSeasonEvent>,
) {
    if let Some(tear_id) = pouch
        .available
        .iter()
        .find(|id| !pouch.collected.contains(*id))
    {
        collect_writer.send(CollectCurrencyEvent::Tear(tear_id.clone()));
        return;
    }
    if ap.current > ap.per_step / 2 {
        collect_writer.send(CollectCurrencyEvent::Stones);
        return;
    }
    advance_writer.send(AdvanceSeasonEvent);
}

fn exit_when_ended(
    state: Res<State<GameState>>,
    stats: Res<GardenStats>,
    ledger: Res<Ledger>,
    mut exit_writer: EventWriter<AppExit>,
) {
    if state.get() == &GameState::Ended {
        info!(
            "The garden sleeps. {} cycles, {} tears collected, {} memories restored.",
            stats.cycles_completed, stats.tears_collected, ledger.echoes
        );
        exit_writer.send(AppExit::Success);
    }
}

fn print_toasts(mut toasts: EventReader<ToastEvent>) {
    for toast in toasts.read() {
        info!("» {}", toast.message);
    }
}
