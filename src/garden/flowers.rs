//! Flower growth engine — planting, the composed watering formula, passive
//! seasonal growth, and the downstream unlocks (birds, judgment text).
//!
//! The watering delta composes five independent multiplicative factors:
//! tear base, preference, season, building resonance, and the hard-coded
//! narrative combos. Growth crossing the full bar levels the flower up at
//! most once per application; any surplus is discarded with the reset.

use bevy::prelude::*;

use crate::shared::*;

// ─── Growth math ─────────────────────────────────────────────────────────────

/// Computes the growth delta from watering `flower` with `tear` at the
/// given step. Pure: reads state, mutates nothing.
pub fn growth_delta(
    flower: &FlowerDef,
    tear: &TearDef,
    step: Jieqi,
    buildings: &Buildings,
    building_registry: &BuildingRegistry,
    combos: &ComboRegistry,
) -> f32 {
    let mut delta = tear.potency as f32 * 10.0;

    if flower.tear_preference.contains(&tear.id) {
        delta *= PREFERENCE_MULTIPLIER;
    }

    delta *= flower.seasonal_multiplier(step.season());

    if has_resonance(&flower.id, buildings, building_registry) {
        delta *= RESONANCE_MULTIPLIER;
    }

    for combo in &combos.combos {
        if combo.flower == flower.id && combo.step == step && combo.tear == tear.id {
            delta *= combo.multiplier;
        }
    }

    delta
}

/// True when a built structure dedicated to this flower stands anywhere in
/// the garden.
fn has_resonance(
    flower_id: &str,
    buildings: &Buildings,
    building_registry: &BuildingRegistry,
) -> bool {
    building_registry.buildings.values().any(|def| {
        def.related_flower.as_deref() == Some(flower_id)
            && buildings
                .states
                .get(&def.id)
                .map(|s| s.built)
                .unwrap_or(false)
    })
}

/// Result of pouring growth into a flower.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrowthOutcome {
    /// Set when the flower crossed the bar and gained a level.
    pub leveled_to: Option<u8>,
    /// Set when the level-up reached `max_level` (terminal awakening).
    pub awakened: bool,
}

/// Adds `delta` to the flower's growth and applies the leveling rule:
/// crossing the full bar raises the level exactly once and resets growth
/// to zero, discarding any surplus. At `max_level` growth merely clamps.
pub fn apply_growth(def: &FlowerDef, state: &mut FlowerState, delta: f32) -> GrowthOutcome {
    let mut outcome = GrowthOutcome::default();

    state.growth = (state.growth + delta.max(0.0)).min(GROWTH_MAX);

    if state.growth >= GROWTH_MAX && state.level < def.max_level {
        state.level += 1;
        state.growth = 0.0;
        outcome.leveled_to = Some(state.level);
        if state.level == def.max_level {
            state.awakened = true;
            outcome.awakened = true;
        }
    }

    outcome
}

// ─── Planting ────────────────────────────────────────────────────────────────

/// Listens for [`PlantFlowerEvent`]. A flower can be planted once its
/// prerequisite structure stands, into an empty unlocked cell.
pub fn handle_plant(
    mut events: EventReader<PlantFlowerEvent>,
    mut grid: ResMut<GardenGrid>,
    mut flowers: ResMut<Flowers>,
    mut ap: ResMut<ActionPoints>,
    flower_registry: Res<FlowerRegistry>,
    buildings: Res<Buildings>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for ev in events.read() {
        let Some(def) = flower_registry.flowers.get(&ev.flower_id) else {
            toast_writer.send(ToastEvent::error(&GardenError::UnknownId(
                ev.flower_id.clone(),
            )));
            continue;
        };

        let state = flowers.states.entry(ev.flower_id.clone()).or_default();
        if !state.unlocked {
            toast_writer.send(ToastEvent::error(&GardenError::InvalidPlacement(format!(
                "{} has not been unlocked yet",
                def.name
            ))));
            continue;
        }
        if state.position.is_some() {
            toast_writer.send(ToastEvent::error(&GardenError::InvalidPlacement(format!(
                "{} is already planted",
                def.name
            ))));
            continue;
        }
        let prerequisite_built = buildings
            .states
            .get(&def.needs_building)
            .map(|s| s.built)
            .unwrap_or(false);
        if !prerequisite_built {
            toast_writer.send(ToastEvent::error(&GardenError::InvalidPlacement(format!(
                "{} requires {} to be built first",
                def.name, def.needs_building
            ))));
            continue;
        }
        if let Err(err) = grid.check_placeable(ev.cell) {
            toast_writer.send(ToastEvent::error(&err));
            continue;
        }
        if !ap.consume(PLANT_AP_COST) {
            toast_writer.send(ToastEvent::error(&GardenError::ActionPointsDepleted {
                needed: PLANT_AP_COST,
                have: ap.current,
            }));
            continue;
        }

        if let Err(err) = grid.place(ev.cell, Occupant::Flower(ev.flower_id.clone())) {
            warn!("[Garden] place() failed after validation: {err}");
            ap.refund(PLANT_AP_COST);
            continue;
        }
        state.position = Some(ev.cell);
        info!("[Garden] Planted '{}' at cell {}", def.name, ev.cell);
    }
}

// ─── Watering ────────────────────────────────────────────────────────────────

/// Listens for [`WaterFlowerEvent`]. Consumes a collected tear, applies the
/// composed growth delta, and emits the leveling notifications.
pub fn handle_water(
    mut events: EventReader<WaterFlowerEvent>,
    mut flowers: ResMut<Flowers>,
    mut pouch: ResMut<TearPouch>,
    mut aviary: ResMut<Aviary>,
    mut ap: ResMut<ActionPoints>,
    mut stats: ResMut<GardenStats>,
    clock: Res<GardenClock>,
    buildings: Res<Buildings>,
    flower_registry: Res<FlowerRegistry>,
    tear_registry: Res<TearRegistry>,
    building_registry: Res<BuildingRegistry>,
    bird_registry: Res<BirdRegistry>,
    combos: Res<ComboRegistry>,
    mut writers: (
        EventWriter<FlowerLeveledEvent>,
        EventWriter<FlowerAwakenedEvent>,
        EventWriter<BirdUnlockedEvent>,
        EventWriter<ToastEvent>,
    ),
) {
    let (ref mut leveled_writer, ref mut awakened_writer, ref mut bird_writer, ref mut toast_writer) =
        writers;

    for ev in events.read() {
        let Some(def) = flower_registry.flowers.get(&ev.flower_id) else {
            toast_writer.send(ToastEvent::error(&GardenError::UnknownId(
                ev.flower_id.clone(),
            )));
            continue;
        };
        let Some(tear) = tear_registry.tears.get(&ev.tear_id) else {
            toast_writer.send(ToastEvent::error(&GardenError::UnknownId(
                ev.tear_id.clone(),
            )));
            continue;
        };

        let Some(state) = flowers.states.get_mut(&ev.flower_id) else {
            toast_writer.send(ToastEvent::error(&GardenError::UnknownId(
                ev.flower_id.clone(),
            )));
            continue;
        };
        if state.position.is_none() {
            toast_writer.send(ToastEvent::error(&GardenError::InvalidPlacement(format!(
                "{} is not planted",
                def.name
            ))));
            continue;
        }
        if !pouch.collected.contains(&ev.tear_id) {
            toast_writer.send(ToastEvent::error(&GardenError::InvalidPlacement(format!(
                "no {} in the pouch",
                tear.name
            ))));
            continue;
        }
        if !ap.consume(WATER_AP_COST) {
            toast_writer.send(ToastEvent::error(&GardenError::ActionPointsDepleted {
                needed: WATER_AP_COST,
                have: ap.current,
            }));
            continue;
        }

        let delta = growth_delta(def, tear, clock.step, &buildings, &building_registry, &combos);
        let outcome = apply_growth(def, state, delta);

        if tear.consumable {
            pouch.collected.remove(&ev.tear_id);
        }
        stats.waters += 1;

        info!(
            "[Garden] Watered '{}' with '{}': +{:.1} growth (level {}, growth {:.1})",
            def.name, tear.name, delta, state.level, state.growth
        );

        emit_growth_notifications(
            def,
            state.level,
            &outcome,
            &mut aviary,
            &bird_registry,
            leveled_writer,
            awakened_writer,
            bird_writer,
        );
    }
}

/// Converts a [`GrowthOutcome`] into presentation notifications and the
/// bird side effect. Shared by watering and the passive growth pass.
pub fn emit_growth_notifications(
    def: &FlowerDef,
    level: u8,
    outcome: &GrowthOutcome,
    aviary: &mut Aviary,
    bird_registry: &BirdRegistry,
    leveled_writer: &mut EventWriter<FlowerLeveledEvent>,
    awakened_writer: &mut EventWriter<FlowerAwakenedEvent>,
    bird_writer: &mut EventWriter<BirdUnlockedEvent>,
) {
    let Some(new_level) = outcome.leveled_to else {
        return;
    };

    leveled_writer.send(FlowerLeveledEvent {
        flower_id: def.id.clone(),
        new_level,
    });
    info!("[Garden] '{}' reached level {}", def.name, new_level);

    if level >= BIRD_UNLOCK_LEVEL {
        if let Some(bird_id) = next_locked_bird(&def.id, aviary, bird_registry) {
            aviary.unlocked.insert(bird_id.clone());
            bird_writer.send(BirdUnlockedEvent {
                bird_id: bird_id.clone(),
            });
            info!("[Garden] Bird '{}' unlocked by '{}'", bird_id, def.name);
        }
    }

    if outcome.awakened {
        awakened_writer.send(FlowerAwakenedEvent {
            flower_id: def.id.clone(),
            judgment: def.judgment.clone(),
        });
        info!("[Garden] '{}' fully awakened", def.name);
    }
}

/// First still-locked bird tied to this flower, in stable id order.
fn next_locked_bird(
    flower_id: &str,
    aviary: &Aviary,
    bird_registry: &BirdRegistry,
) -> Option<BirdId> {
    let mut ids: Vec<&BirdId> = bird_registry
        .birds
        .values()
        .filter(|b| b.related_flower == flower_id)
        .map(|b| &b.id)
        .collect();
    ids.sort();
    ids.into_iter()
        .find(|id| !aviary.unlocked.contains(*id))
        .cloned()
}

// ─── Passive growth ──────────────────────────────────────────────────────────

/// Every planted flower drinks the season itself: on each advance it gains
/// `seasonal_multiplier * 2`, under the same leveling rule as watering.
pub fn passive_growth_on_advance(
    mut advanced: EventReader<SeasonAdvancedEvent>,
    mut flowers: ResMut<Flowers>,
    mut aviary: ResMut<Aviary>,
    flower_registry: Res<FlowerRegistry>,
    bird_registry: Res<BirdRegistry>,
    mut leveled_writer: EventWriter<FlowerLeveledEvent>,
    mut awakened_writer: EventWriter<FlowerAwakenedEvent>,
    mut bird_writer: EventWriter<BirdUnlockedEvent>,
) {
    for ev in advanced.read() {
        let season = ev.step.season();
        let mut ids: Vec<FlowerId> = flowers.states.keys().cloned().collect();
        ids.sort();

        for id in ids {
            let Some(def) = flower_registry.flowers.get(&id) else {
                continue;
            };
            let Some(state) = flowers.states.get_mut(&id) else {
                continue;
            };
            if state.position.is_none() {
                continue;
            }

            let delta = def.seasonal_multiplier(season) * PASSIVE_GROWTH_BASE;
            let outcome = apply_growth(def, state, delta);
            let level = state.level;
            emit_growth_notifications(
                def,
                level,
                &outcome,
                &mut aviary,
                &bird_registry,
                &mut leveled_writer,
                &mut awakened_writer,
                &mut bird_writer,
            );
        }
    }
}
