use crate::shared::*;

/// Populate the EventRegistry with the one-shot narrative beats.
///
/// Each event is pinned to an exact (cycle, solar term) pair. The ending
/// event closes the third winter: once it fires, the clock stops for good.
pub fn populate_events(registry: &mut EventRegistry) {
    let events: Vec<EventDef> = vec![
        EventDef {
            id: "first_sweeping".into(),
            cycle: 1,
            step: Jieqi::Qingming,
            narration: "You sweep the old path clear. Somebody kept this garden once.".into(),
            ending: false,
        },
        EventDef {
            id: "midsummer_lanterns".into(),
            cycle: 2,
            step: Jieqi::Xiazhi,
            narration: "On the longest day, paper lanterns you never hung sway over the pond."
                .into(),
            ending: false,
        },
        EventDef {
            id: "solstice_visitor".into(),
            cycle: 2,
            step: Jieqi::Dongzhi,
            narration: "Footprints cross the snow to the plum tree and stop there.".into(),
            ending: false,
        },
        EventDef {
            id: "the_garden_sleeps".into(),
            cycle: 3,
            step: Jieqi::Dahan,
            narration: "The deepest cold settles in. The garden draws its breath and sleeps, \
                        holding everything you gave it."
                .into(),
            ending: true,
        },
    ];

    for event in events {
        registry.events.insert(event.id.clone(), event);
    }
}
