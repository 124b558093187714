use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;

/// Full snapshot of the mutable garden state. Every field carries
/// `#[serde(default)]` so snapshots written by older builds keep loading
/// after fields are added.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GardenSave {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub save_timestamp: u64,
    #[serde(default)]
    pub clock: GardenClock,
    #[serde(default)]
    pub action_points: ActionPoints,
    #[serde(default)]
    pub ledger: Ledger,
    #[serde(default)]
    pub grid: GardenGrid,
    #[serde(default)]
    pub flowers: Flowers,
    #[serde(default)]
    pub buildings: Buildings,
    #[serde(default)]
    pub pouch: TearPouch,
    #[serde(default)]
    pub aviary: Aviary,
    #[serde(default)]
    pub memories: Memories,
    #[serde(default)]
    pub story_progress: StoryProgress,
    #[serde(default)]
    pub event_progress: EventProgress,
    #[serde(default)]
    pub stats: GardenStats,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Sent by the presentation layer (or the autosave hook) to snapshot the
/// active profile.
#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent;

/// Sent to restore the active profile's snapshot.
#[derive(Event, Debug, Clone)]
pub struct LoadRequestEvent;

/// Sent after a save completes (success or failure).
#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

/// Sent after a load completes.
#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// Which profile owns the snapshot file, `saves/<player_id>.json`.
#[derive(Resource, Debug, Clone)]
pub struct ActiveProfile {
    pub player_id: String,
}

impl Default for ActiveProfile {
    fn default() -> Self {
        Self {
            player_id: "default".to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveProfile>()
            .add_event::<SaveRequestEvent>()
            .add_event::<LoadRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_event::<LoadCompleteEvent>()
            .add_systems(
                Update,
                (autosave_on_advance, handle_save_request, handle_load_request)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            // The ending screen can still snapshot the finished garden.
            .add_systems(
                Update,
                handle_save_request.run_if(in_state(GameState::Ended)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FILESYSTEM HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn saves_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    exe_dir.join("saves")
}

fn profile_path(player_id: &str) -> PathBuf {
    saves_directory().join(format!("{player_id}.json"))
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ═══════════════════════════════════════════════════════════════════════
// SAVE / LOAD LOGIC
// ═══════════════════════════════════════════════════════════════════════

fn write_save(path: &PathBuf, save: &GardenSave) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| format!("Could not create saves directory: {e}"))?;
    }

    let json =
        serde_json::to_string_pretty(save).map_err(|e| format!("Serialization failed: {e}"))?;

    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json)
        .map_err(|e| format!("Write failed for {}: {e}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).map_err(|e| format!("Rename failed: {e}"))?;

    Ok(())
}

fn read_save(path: &PathBuf) -> Result<GardenSave, String> {
    if !path.exists() {
        return Err(format!("No snapshot at {}", path.display()));
    }
    let json =
        fs::read_to_string(path).map_err(|e| format!("Read failed for {}: {e}", path.display()))?;
    let save: GardenSave =
        serde_json::from_str(&json).map_err(|e| format!("Deserialization failed: {e}"))?;

    // Version check — future versions can add migration here
    if save.version != SAVE_VERSION {
        warn!(
            "Snapshot {} has version {} but current version is {}. Attempting to load anyway.",
            path.display(),
            save.version,
            SAVE_VERSION
        );
    }

    Ok(save)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
    profile: Res<ActiveProfile>,
    clock: Res<GardenClock>,
    ap: Res<ActionPoints>,
    ledger: Res<Ledger>,
    grid: Res<GardenGrid>,
    flowers: Res<Flowers>,
    buildings: Res<Buildings>,
    pouch: Res<TearPouch>,
    aviary: Res<Aviary>,
    memories: Res<Memories>,
    story_progress: Res<StoryProgress>,
    event_progress: Res<EventProgress>,
    stats: Res<GardenStats>,
) {
    if save_events.is_empty() {
        return;
    }
    save_events.clear();

    let save = GardenSave {
        version: SAVE_VERSION,
        save_timestamp: current_timestamp(),
        clock: clock.clone(),
        action_points: ap.clone(),
        ledger: ledger.clone(),
        grid: grid.clone(),
        flowers: flowers.clone(),
        buildings: buildings.clone(),
        pouch: pouch.clone(),
        aviary: aviary.clone(),
        memories: memories.clone(),
        story_progress: story_progress.clone(),
        event_progress: event_progress.clone(),
        stats: stats.clone(),
    };

    let path = profile_path(&profile.player_id);
    match write_save(&path, &save) {
        Ok(()) => {
            info!("[Save] Snapshot written for '{}'", profile.player_id);
            complete_events.send(SaveCompleteEvent {
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            warn!("[Save] Snapshot for '{}' FAILED: {e}", profile.player_id);
            complete_events.send(SaveCompleteEvent {
                success: false,
                error_message: Some(e),
            });
        }
    }
}

fn handle_load_request(
    mut load_events: EventReader<LoadRequestEvent>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
    profile: Res<ActiveProfile>,
    mut clock: ResMut<GardenClock>,
    mut ap: ResMut<ActionPoints>,
    mut ledger: ResMut<Ledger>,
    mut grid: ResMut<GardenGrid>,
    mut flowers: ResMut<Flowers>,
    mut buildings: ResMut<Buildings>,
    mut pouch: ResMut<TearPouch>,
    mut aviary: ResMut<Aviary>,
    mut memories: ResMut<Memories>,
    mut story_progress: ResMut<StoryProgress>,
    mut event_progress: ResMut<EventProgress>,
    mut stats: ResMut<GardenStats>,
) {
    if load_events.is_empty() {
        return;
    }
    load_events.clear();

    let path = profile_path(&profile.player_id);
    match read_save(&path) {
        Ok(save) => {
            *clock = save.clock;
            *ap = save.action_points;
            *ledger = save.ledger;
            *grid = save.grid;
            *flowers = save.flowers;
            *buildings = save.buildings;
            *pouch = save.pouch;
            *aviary = save.aviary;
            *memories = save.memories;
            *story_progress = save.story_progress;
            *event_progress = save.event_progress;
            *stats = save.stats;

            info!("[Save] Snapshot restored for '{}'", profile.player_id);
            complete_events.send(LoadCompleteEvent {
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            warn!("[Save] Load for '{}' FAILED: {e}", profile.player_id);
            complete_events.send(LoadCompleteEvent {
                success: false,
                error_message: Some(e),
            });
        }
    }
}

/// Every season advance snapshots the garden, so a crash costs at most one
/// step of play.
fn autosave_on_advance(
    mut advanced: EventReader<SeasonAdvancedEvent>,
    mut save_writer: EventWriter<SaveRequestEvent>,
) {
    for ev in advanced.read() {
        info!(
            "[Save] Autosave at cycle {} {}",
            ev.cycle,
            ev.step.display_name()
        );
        save_writer.send(SaveRequestEvent);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════
