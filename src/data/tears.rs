use crate::shared::*;

/// Populate the TearRegistry with all tear definitions.
///
/// Potency is the raw strength of a watering before multipliers; an
/// in-season tear has a 60% chance to appear as a collectible each step,
/// off-season 10%. The moon tear is the one keepsake: it survives every
/// watering but appears rarely in any season.
pub fn populate_tears(registry: &mut TearRegistry) {
    let tears: Vec<TearDef> = vec![
        TearDef {
            id: "dew_tear".into(),
            name: "Dew Tear".into(),
            potency: 1,
            seasons: vec![Season::Spring],
            consumable: true,
        },
        TearDef {
            id: "rain_tear".into(),
            name: "Rain Tear".into(),
            potency: 2,
            seasons: vec![Season::Spring, Season::Summer],
            consumable: true,
        },
        TearDef {
            id: "honey_tear".into(),
            name: "Honey Tear".into(),
            potency: 3,
            seasons: vec![Season::Summer],
            consumable: true,
        },
        TearDef {
            id: "amber_tear".into(),
            name: "Amber Tear".into(),
            potency: 3,
            seasons: vec![Season::Autumn],
            consumable: true,
        },
        TearDef {
            id: "frost_tear".into(),
            name: "Frost Tear".into(),
            potency: 2,
            seasons: vec![Season::Autumn, Season::Winter],
            consumable: true,
        },
        TearDef {
            id: "moon_tear".into(),
            name: "Moon Tear".into(),
            potency: 4,
            seasons: vec![
                Season::Spring,
                Season::Summer,
                Season::Autumn,
                Season::Winter,
            ],
            consumable: false,
        },
    ];

    for tear in tears {
        registry.tears.insert(tear.id.clone(), tear);
    }
}
