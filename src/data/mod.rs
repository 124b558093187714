//! Data layer — populates all registries at game startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), fills every registry
//! (TearRegistry, FlowerRegistry, BuildingRegistry, BirdRegistry,
//! MemoryRegistry, StoryRegistry, EventRegistry, ComboRegistry,
//! QuizRegistry) from the game-design data defined in submodules, then
//! transitions the game into GameState::Playing.
//!
//! No other domain needs to seed these resources. All domain plugins can
//! safely read them once GameState has advanced past Loading.

mod buildings;
mod events;
mod flowers;
mod memories;
mod quizzes;
mod tears;

use bevy::prelude::*;
use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

/// Single system that populates every registry and then transitions to
/// Playing. Population order does not matter: cross-references between
/// registries are string IDs resolved at use time.
fn load_all_data(
    mut tear_registry: ResMut<TearRegistry>,
    mut flower_registry: ResMut<FlowerRegistry>,
    mut building_registry: ResMut<BuildingRegistry>,
    mut bird_registry: ResMut<BirdRegistry>,
    mut memory_registry: ResMut<MemoryRegistry>,
    mut story_registry: ResMut<StoryRegistry>,
    mut event_registry: ResMut<EventRegistry>,
    mut combo_registry: ResMut<ComboRegistry>,
    mut quiz_registry: ResMut<QuizRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("DataPlugin: populating registries…");

    tears::populate_tears(&mut tear_registry);
    info!("  Tears loaded: {}", tear_registry.tears.len());

    flowers::populate_flowers(&mut flower_registry);
    flowers::populate_birds(&mut bird_registry);
    flowers::populate_combos(&mut combo_registry);
    info!(
        "  Flowers loaded: {}, Birds: {}, Combos: {}",
        flower_registry.flowers.len(),
        bird_registry.birds.len(),
        combo_registry.combos.len()
    );

    buildings::populate_buildings(&mut building_registry);
    info!("  Buildings loaded: {}", building_registry.buildings.len());

    memories::populate_memories(&mut memory_registry);
    memories::populate_story_lines(&mut story_registry);
    info!(
        "  Memories loaded: {}, Story lines: {}",
        memory_registry.memories.len(),
        story_registry.lines.len()
    );

    events::populate_events(&mut event_registry);
    info!("  Events loaded: {}", event_registry.events.len());

    quizzes::populate_quizzes(&mut quiz_registry);
    info!("  Quiz sets loaded: {}", quiz_registry.sets.len());

    next_state.set(GameState::Playing);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> (
        TearRegistry,
        FlowerRegistry,
        BuildingRegistry,
        BirdRegistry,
        MemoryRegistry,
        StoryRegistry,
        QuizRegistry,
    ) {
        let mut tears = TearRegistry::default();
        let mut flowers_reg = FlowerRegistry::default();
        let mut buildings_reg = BuildingRegistry::default();
        let mut birds = BirdRegistry::default();
        let mut memories_reg = MemoryRegistry::default();
        let mut stories = StoryRegistry::default();
        let mut quizzes_reg = QuizRegistry::default();
        tears::populate_tears(&mut tears);
        flowers::populate_flowers(&mut flowers_reg);
        buildings::populate_buildings(&mut buildings_reg);
        flowers::populate_birds(&mut birds);
        memories::populate_memories(&mut memories_reg);
        memories::populate_story_lines(&mut stories);
        quizzes::populate_quizzes(&mut quizzes_reg);
        (
            tears,
            flowers_reg,
            buildings_reg,
            birds,
            memories_reg,
            stories,
            quizzes_reg,
        )
    }

    #[test]
    fn test_cross_references_resolve() {
        let (tears, flowers_reg, buildings_reg, birds, memories_reg, stories, _) = loaded();

        for flower in flowers_reg.flowers.values() {
            assert!(
                buildings_reg.buildings.contains_key(&flower.needs_building),
                "flower '{}' needs unknown building '{}'",
                flower.id,
                flower.needs_building
            );
            for tear_id in &flower.tear_preference {
                assert!(
                    tears.tears.contains_key(tear_id),
                    "flower '{}' prefers unknown tear '{}'",
                    flower.id,
                    tear_id
                );
            }
        }
        for building in buildings_reg.buildings.values() {
            if let Some(flower_id) = &building.related_flower {
                assert!(flowers_reg.flowers.contains_key(flower_id));
            }
        }
        for bird in birds.birds.values() {
            assert!(flowers_reg.flowers.contains_key(&bird.related_flower));
        }
        for memory in memories_reg.memories.values() {
            if let Some(line) = &memory.story_line {
                assert!(
                    stories.lines.contains_key(line),
                    "memory '{}' references unknown story line '{}'",
                    memory.id,
                    line
                );
            }
        }
    }

    #[test]
    fn test_every_memory_has_a_quiz_set() {
        let (_, _, _, _, memories_reg, _, quizzes_reg) = loaded();
        for id in memories_reg.memories.keys() {
            let set = quizzes_reg.sets.get(id);
            assert!(
                set.map(|s| !s.is_empty()).unwrap_or(false),
                "memory '{id}' has no questions"
            );
        }
    }

    #[test]
    fn test_story_line_orders_are_gapless() {
        let (_, _, _, _, memories_reg, stories, _) = loaded();
        for line_id in stories.lines.keys() {
            let mut orders: Vec<u32> = memories_reg
                .memories
                .values()
                .filter(|m| m.story_line.as_deref() == Some(line_id.as_str()))
                .map(|m| m.order_index)
                .collect();
            orders.sort_unstable();
            for (i, order) in orders.iter().enumerate() {
                assert_eq!(
                    *order,
                    i as u32 + 1,
                    "story line '{line_id}' has a hole in its order indices"
                );
            }
        }
    }
}
