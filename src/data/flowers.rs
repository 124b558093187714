use crate::shared::*;

/// Populate the FlowerRegistry with all flower soul definitions.
///
/// Seasonal growth multipliers are indexed [spring, summer, autumn,
/// winter]. Each soul peaks in its own season at 1.5 and withers in the
/// opposite one. A soul unlocks when its dedicated structure is built.
pub fn populate_flowers(registry: &mut FlowerRegistry) {
    let flowers: Vec<FlowerDef> = vec![
        FlowerDef {
            id: "plum_soul".into(),
            name: "Plum Soul".into(),
            max_level: 5,
            seasonal_growth: [0.6, 0.4, 0.8, 1.5],
            tear_preference: vec!["frost_tear".into(), "moon_tear".into()],
            needs_building: "plum_pavilion".into(),
            judgment: "She bloomed first because no one told her it was still winter.".into(),
        },
        FlowerDef {
            id: "orchid_soul".into(),
            name: "Orchid Soul".into(),
            max_level: 4,
            seasonal_growth: [1.5, 1.0, 0.6, 0.4],
            tear_preference: vec!["dew_tear".into()],
            needs_building: "orchid_terrace".into(),
            judgment: "She kept her fragrance for the empty valley.".into(),
        },
        FlowerDef {
            id: "lotus_soul".into(),
            name: "Lotus Soul".into(),
            max_level: 5,
            seasonal_growth: [0.8, 1.5, 0.6, 0.3],
            tear_preference: vec!["rain_tear".into()],
            needs_building: "lotus_pond".into(),
            judgment: "She rose from the mud and never once looked down on it.".into(),
        },
        FlowerDef {
            id: "chrysanthemum_soul".into(),
            name: "Chrysanthemum Soul".into(),
            max_level: 5,
            seasonal_growth: [0.5, 0.7, 1.5, 0.9],
            tear_preference: vec!["amber_tear".into()],
            needs_building: "chrysanthemum_hedge".into(),
            judgment: "She stayed behind after the garden emptied, and called it home.".into(),
        },
        FlowerDef {
            id: "peony_soul".into(),
            name: "Peony Soul".into(),
            max_level: 6,
            seasonal_growth: [1.2, 1.2, 0.6, 0.4],
            tear_preference: vec!["honey_tear".into(), "rain_tear".into()],
            needs_building: "peony_trellis".into(),
            judgment: "She spent everything on one season and regretted nothing.".into(),
        },
    ];

    for flower in flowers {
        registry.flowers.insert(flower.id.clone(), flower);
    }
}

/// Populate the BirdRegistry. One bird roosts with each flower soul; it
/// arrives when its flower reaches level 3.
pub fn populate_birds(registry: &mut BirdRegistry) {
    let birds: Vec<BirdDef> = vec![
        BirdDef {
            id: "snow_wren".into(),
            name: "Snow Wren".into(),
            related_flower: "plum_soul".into(),
        },
        BirdDef {
            id: "dawn_swallow".into(),
            name: "Dawn Swallow".into(),
            related_flower: "orchid_soul".into(),
        },
        BirdDef {
            id: "reed_heron".into(),
            name: "Reed Heron".into(),
            related_flower: "lotus_soul".into(),
        },
        BirdDef {
            id: "amber_finch".into(),
            name: "Amber Finch".into(),
            related_flower: "chrysanthemum_soul".into(),
        },
        BirdDef {
            id: "garden_magpie".into(),
            name: "Garden Magpie".into(),
            related_flower: "peony_soul".into(),
        },
    ];

    for bird in birds {
        registry.birds.insert(bird.id.clone(), bird);
    }
}

/// Populate the ComboRegistry with the narrative (flower, solar term,
/// tear) triples that amplify a watering.
pub fn populate_combos(registry: &mut ComboRegistry) {
    registry.combos = vec![
        // Plum under major snow, watered with frost.
        ComboDef {
            flower: "plum_soul".into(),
            step: Jieqi::Daxue,
            tear: "frost_tear".into(),
            multiplier: 2.0,
        },
        // Orchid in the rain-water term, watered with dew.
        ComboDef {
            flower: "orchid_soul".into(),
            step: Jieqi::Yushui,
            tear: "dew_tear".into(),
            multiplier: 1.8,
        },
        // Lotus at the summer solstice, watered with rain.
        ComboDef {
            flower: "lotus_soul".into(),
            step: Jieqi::Xiazhi,
            tear: "rain_tear".into(),
            multiplier: 2.0,
        },
        // Chrysanthemum at the autumn equinox, watered with amber.
        ComboDef {
            flower: "chrysanthemum_soul".into(),
            step: Jieqi::Qiufen,
            tear: "amber_tear".into(),
            multiplier: 2.0,
        },
    ];
}
