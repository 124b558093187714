//! Story-line milestone tracking. A milestone fires once the gapless run
//! of unlocked memories at the head of its line reaches the threshold, and
//! never fires again.

use bevy::prelude::*;

use crate::garden::flowers;
use crate::shared::*;

/// Length of the unbroken run of unlocked memories at the head of the
/// line. Order indices are 1-based; a hole stops the count even when later
/// memories are unlocked.
pub fn consecutive_count(
    line_id: &str,
    memory_registry: &MemoryRegistry,
    memories: &Memories,
) -> u32 {
    let mut line: Vec<&MemoryDef> = memory_registry
        .memories
        .values()
        .filter(|d| d.story_line.as_deref() == Some(line_id))
        .collect();
    line.sort_by_key(|d| d.order_index);

    let mut count = 0u32;
    for def in line {
        if def.order_index != count + 1 {
            break;
        }
        if !memories.state(&def.id).unlocked {
            break;
        }
        count += 1;
    }
    count
}

/// Re-evaluates every story line after a memory unlocks. Fired flags in
/// [`StoryProgress`] make the pass idempotent: a milestone pays out exactly
/// once no matter how often the check runs.
#[allow(clippy::too_many_arguments)]
pub fn run_milestone_checks(
    mut unlocked: EventReader<MemoryUnlockedEvent>,
    story_registry: Res<StoryRegistry>,
    memory_registry: Res<MemoryRegistry>,
    memories: Res<Memories>,
    mut progress: ResMut<StoryProgress>,
    mut ledger: ResMut<Ledger>,
    mut grid: ResMut<GardenGrid>,
    mut flowers: ResMut<Flowers>,
    mut aviary: ResMut<Aviary>,
    flower_registry: Res<FlowerRegistry>,
    bird_registry: Res<BirdRegistry>,
    mut writers: (
        EventWriter<LedgerChangeEvent>,
        EventWriter<MilestoneFiredEvent>,
        EventWriter<FlowerLeveledEvent>,
        EventWriter<FlowerAwakenedEvent>,
        EventWriter<BirdUnlockedEvent>,
        EventWriter<ToastEvent>,
    ),
) {
    if unlocked.is_empty() {
        return;
    }
    unlocked.clear();

    let (
        ref mut ledger_writer,
        ref mut fired_writer,
        ref mut leveled_writer,
        ref mut awakened_writer,
        ref mut bird_writer,
        ref mut toast_writer,
    ) = writers;

    let mut line_ids: Vec<&StoryLineId> = story_registry.lines.keys().collect();
    line_ids.sort();

    for line_id in line_ids {
        let line = &story_registry.lines[line_id];
        let count = consecutive_count(line_id, &memory_registry, &memories);
        let fired = progress
            .fired
            .entry(line_id.clone())
            .or_insert_with(|| vec![false; line.milestones.len()]);

        for (idx, milestone) in line.milestones.iter().enumerate() {
            if fired[idx] || count < milestone.threshold {
                continue;
            }
            fired[idx] = true;

            info!(
                "[Story] Milestone reached on '{}': {} consecutive memories",
                line.name, milestone.threshold
            );

            if milestone.reward_amount > 0 {
                ledger.credit(milestone.reward_currency, milestone.reward_amount);
                ledger_writer.send(LedgerChangeEvent {
                    kind: milestone.reward_currency,
                    amount: milestone.reward_amount as i64,
                    reason: format!("milestone: {} x{}", line.name, milestone.threshold),
                });
            }

            if let Some((flower_id, bonus)) = &milestone.flower_bonus {
                apply_flower_bonus(
                    flower_id,
                    *bonus,
                    &flower_registry,
                    &mut flowers,
                    &mut aviary,
                    &bird_registry,
                    leveled_writer,
                    awakened_writer,
                    bird_writer,
                );
            }

            if let Some(cell) = milestone.unlock_cell {
                match grid.unlock_cell(cell) {
                    Ok(()) => info!("[Story] Cell {cell} unlocked"),
                    Err(err) => warn!("[Story] Cell unlock skipped: {err}"),
                }
            }

            fired_writer.send(MilestoneFiredEvent {
                story_line: line_id.clone(),
                threshold: milestone.threshold,
            });
            toast_writer.send(ToastEvent {
                message: format!("{}: a new chapter opens.", line.name),
                duration_secs: 4.0,
            });
        }
    }
}

/// Pours a milestone's flat growth bonus into the named flower, with the
/// same single-level-up rule as watering.
#[allow(clippy::too_many_arguments)]
fn apply_flower_bonus(
    flower_id: &str,
    bonus: f32,
    flower_registry: &FlowerRegistry,
    flowers_res: &mut Flowers,
    aviary: &mut Aviary,
    bird_registry: &BirdRegistry,
    leveled_writer: &mut EventWriter<FlowerLeveledEvent>,
    awakened_writer: &mut EventWriter<FlowerAwakenedEvent>,
    bird_writer: &mut EventWriter<BirdUnlockedEvent>,
) {
    let Some(def) = flower_registry.flowers.get(flower_id) else {
        warn!("[Story] Milestone names unknown flower '{flower_id}'");
        return;
    };
    let state = flowers_res.states.entry(flower_id.to_string()).or_default();
    let outcome = flowers::apply_growth(def, state, bonus);
    let level = state.level;
    info!("[Story] '{}' gains {bonus:.0} bonus growth", def.name);
    flowers::emit_growth_notifications(
        def,
        level,
        &outcome,
        aviary,
        bird_registry,
        leveled_writer,
        awakened_writer,
        bird_writer,
    );
}
