use crate::shared::*;

/// Populate the BuildingRegistry with all structure definitions.
///
/// `decay_rate` is the degradation a structure accrues over one full
/// 24-step cycle; the repair cost scales with the decay at repair time
/// (ceil(decay × 5) stones, 2–3 action points).
pub fn populate_buildings(registry: &mut BuildingRegistry) {
    let buildings: Vec<BuildingDef> = vec![
        BuildingDef {
            id: "plum_pavilion".into(),
            name: "Plum Pavilion".into(),
            cost_tears: 4,
            cost_stones: 8,
            decay_rate: 0.5,
            related_flower: Some("plum_soul".into()),
        },
        BuildingDef {
            id: "orchid_terrace".into(),
            name: "Orchid Terrace".into(),
            cost_tears: 2,
            cost_stones: 6,
            decay_rate: 0.6,
            related_flower: Some("orchid_soul".into()),
        },
        BuildingDef {
            id: "lotus_pond".into(),
            name: "Lotus Pond".into(),
            cost_tears: 5,
            cost_stones: 10,
            decay_rate: 0.4,
            related_flower: Some("lotus_soul".into()),
        },
        BuildingDef {
            id: "chrysanthemum_hedge".into(),
            name: "Chrysanthemum Hedge".into(),
            cost_tears: 3,
            cost_stones: 6,
            decay_rate: 0.8,
            related_flower: Some("chrysanthemum_soul".into()),
        },
        BuildingDef {
            id: "peony_trellis".into(),
            name: "Peony Trellis".into(),
            cost_tears: 6,
            cost_stones: 12,
            decay_rate: 0.6,
            related_flower: Some("peony_soul".into()),
        },
        // A purely ornamental structure with no flower attached.
        BuildingDef {
            id: "moon_gate".into(),
            name: "Moon Gate".into(),
            cost_tears: 8,
            cost_stones: 16,
            decay_rate: 0.3,
            related_flower: None,
        },
    ];

    for building in buildings {
        registry.buildings.insert(building.id.clone(), building);
    }
}
