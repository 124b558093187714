//! Building lifecycle — construction, per-step decay, and cost-scaled
//! repair. Buildings are never destroyed; a fully decayed structure simply
//! sits at decay 1.0 until repaired.

use bevy::prelude::*;

use crate::shared::*;

/// Stone cost to repair a structure at the given decay.
pub fn repair_stone_cost(decay: f32) -> u32 {
    (decay * 5.0).ceil() as u32
}

/// Action-point cost to repair, clamped to the 2..=3 band.
pub fn repair_ap_cost(decay: f32) -> u32 {
    ((decay * 3.0).ceil() as u32).clamp(2, 3)
}

/// Adds one step's decay to every built structure. The per-step increment
/// is the building's rate spread over the 24 steps of a cycle.
pub fn tick_decay(grid: &mut GardenGrid, registry: &BuildingRegistry) {
    for (cell_id, building_id) in grid.building_cells() {
        let Some(def) = registry.buildings.get(&building_id) else {
            continue;
        };
        let cell = &mut grid.cells[cell_id];
        cell.decay = (cell.decay + def.decay_rate / STEPS_PER_CYCLE as f32).min(1.0);
    }
}

/// Applies [`tick_decay`] once per season advance.
pub fn decay_on_advance(
    mut advanced: EventReader<SeasonAdvancedEvent>,
    mut grid: ResMut<GardenGrid>,
    registry: Res<BuildingRegistry>,
) {
    for _ in advanced.read() {
        tick_decay(&mut grid, &registry);
    }
}

// ─── Construction ────────────────────────────────────────────────────────────

/// Listens for [`BuildEvent`]. Validates everything before any mutation:
/// a denied request leaves the ledger, grid, and flower states untouched.
/// The checks and the debits share one exclusive ledger borrow, so two
/// build requests in the same frame cannot both pass on funds for one.
pub fn handle_build(
    mut events: EventReader<BuildEvent>,
    mut grid: ResMut<GardenGrid>,
    mut buildings: ResMut<Buildings>,
    mut flowers: ResMut<Flowers>,
    mut stats: ResMut<GardenStats>,
    mut ledger: ResMut<Ledger>,
    building_registry: Res<BuildingRegistry>,
    flower_registry: Res<FlowerRegistry>,
    mut ledger_writer: EventWriter<LedgerChangeEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for ev in events.read() {
        let Some(def) = building_registry.buildings.get(&ev.building_id) else {
            toast_writer.send(ToastEvent::error(&GardenError::UnknownId(
                ev.building_id.clone(),
            )));
            continue;
        };

        let state = buildings.states.entry(ev.building_id.clone()).or_default();
        if state.built {
            toast_writer.send(ToastEvent::error(&GardenError::AlreadyUnlocked(format!(
                "{} is already built",
                def.name
            ))));
            continue;
        }

        if let Err(err) = grid.check_placeable(ev.cell) {
            toast_writer.send(ToastEvent::error(&err));
            continue;
        }

        if !ledger.has(CurrencyKind::Tears, def.cost_tears) {
            toast_writer.send(ToastEvent::error(&GardenError::InsufficientCurrency {
                kind: CurrencyKind::Tears,
                needed: def.cost_tears,
                have: ledger.tears,
            }));
            continue;
        }
        if !ledger.has(CurrencyKind::Stones, def.cost_stones) {
            toast_writer.send(ToastEvent::error(&GardenError::InsufficientCurrency {
                kind: CurrencyKind::Stones,
                needed: def.cost_stones,
                have: ledger.stones,
            }));
            continue;
        }

        // ── All checks passed ──────────────────────────────────────────
        // Both balances verified above; debit them before anything else.
        ledger.tears -= def.cost_tears;
        ledger.stones -= def.cost_stones;
        if def.cost_tears > 0 {
            ledger_writer.send(LedgerChangeEvent {
                kind: CurrencyKind::Tears,
                amount: -(def.cost_tears as i64),
                reason: format!("built {}", def.name),
            });
        }
        if def.cost_stones > 0 {
            ledger_writer.send(LedgerChangeEvent {
                kind: CurrencyKind::Stones,
                amount: -(def.cost_stones as i64),
                reason: format!("built {}", def.name),
            });
        }

        // check_placeable passed above, so place() cannot fail here.
        if let Err(err) = grid.place(ev.cell, Occupant::Building(ev.building_id.clone())) {
            warn!("[Garden] place() failed after validation: {err}");
            continue;
        }
        state.built = true;
        state.position = Some(ev.cell);
        stats.builds += 1;

        // Unlock every flower waiting on this structure.
        for (flower_id, def) in &flower_registry.flowers {
            if def.needs_building == ev.building_id {
                let fstate = flowers.states.entry(flower_id.clone()).or_default();
                if !fstate.unlocked {
                    fstate.unlocked = true;
                    info!("[Garden] Flower '{}' unlocked by {}", flower_id, ev.building_id);
                }
            }
        }

        info!(
            "[Garden] Built '{}' at cell {} ({} tears, {} stones)",
            def.name, ev.cell, def.cost_tears, def.cost_stones
        );
        toast_writer.send(ToastEvent {
            message: format!("{} built!", def.name),
            duration_secs: 3.0,
        });
    }
}

// ─── Repair ──────────────────────────────────────────────────────────────────

/// Listens for [`RepairEvent`]. Repair is paid in stones plus action
/// points, both scaled by the structure's current decay; success resets
/// decay to zero.
pub fn handle_repair(
    mut events: EventReader<RepairEvent>,
    mut grid: ResMut<GardenGrid>,
    mut ap: ResMut<ActionPoints>,
    mut stats: ResMut<GardenStats>,
    mut ledger: ResMut<Ledger>,
    building_registry: Res<BuildingRegistry>,
    mut ledger_writer: EventWriter<LedgerChangeEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for ev in events.read() {
        let cell = match grid.cell(ev.cell) {
            Ok(c) => c,
            Err(err) => {
                toast_writer.send(ToastEvent::error(&err));
                continue;
            }
        };

        let Occupant::Building(building_id) = cell.occupant.clone() else {
            toast_writer.send(ToastEvent::error(&GardenError::InvalidPlacement(format!(
                "cell {} holds no structure",
                ev.cell
            ))));
            continue;
        };

        let decay = cell.decay;
        if decay <= 0.0 {
            // Nothing to repair; charging for it would be a dead spend.
            toast_writer.send(ToastEvent {
                message: "That structure is in perfect shape.".to_string(),
                duration_secs: 2.0,
            });
            continue;
        }

        let stone_cost = repair_stone_cost(decay);
        let ap_cost = repair_ap_cost(decay);

        if !ledger.has(CurrencyKind::Stones, stone_cost) {
            toast_writer.send(ToastEvent::error(&GardenError::InsufficientCurrency {
                kind: CurrencyKind::Stones,
                needed: stone_cost,
                have: ledger.stones,
            }));
            continue;
        }
        if !ap.consume(ap_cost) {
            toast_writer.send(ToastEvent::error(&GardenError::ActionPointsDepleted {
                needed: ap_cost,
                have: ap.current,
            }));
            continue;
        }

        // Stones verified above under the same exclusive borrow.
        ledger.stones -= stone_cost;
        ledger_writer.send(LedgerChangeEvent {
            kind: CurrencyKind::Stones,
            amount: -(stone_cost as i64),
            reason: format!("repaired {building_id}"),
        });

        if let Ok(cell) = grid.cell_mut(ev.cell) {
            cell.decay = 0.0;
        }
        stats.repairs += 1;

        let name = building_registry
            .buildings
            .get(&building_id)
            .map(|d| d.name.as_str())
            .unwrap_or(building_id.as_str());
        info!(
            "[Garden] Repaired '{}' at cell {} (decay was {:.2}, cost {} stones / {} AP)",
            name, ev.cell, decay, stone_cost, ap_cost
        );
    }
}
