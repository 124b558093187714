use crate::shared::*;

/// Populate the MemoryRegistry with all memory definitions.
///
/// Two story lines run through the garden: the mother's letters (five
/// memories, paying tears) and the garden keeper's notes (four, paying
/// stones). The unsent postcard stands alone and is available from the
/// first step.
pub fn populate_memories(registry: &mut MemoryRegistry) {
    let memories: Vec<MemoryDef> = vec![
        // ── Mother's Letters ────────────────────────────────────────────
        MemoryDef {
            id: "letter_under_the_plum".into(),
            title: "A Letter Under the Plum".into(),
            currency: CurrencyKind::Tears,
            base_reward: 8,
            story_line: Some("mothers_letters".into()),
            order_index: 1,
            related_jieqi: Some(Jieqi::Yushui),
        },
        MemoryDef {
            id: "letter_after_the_rain".into(),
            title: "A Letter After the Rain".into(),
            currency: CurrencyKind::Tears,
            base_reward: 10,
            story_line: Some("mothers_letters".into()),
            order_index: 2,
            related_jieqi: Some(Jieqi::Guyu),
        },
        MemoryDef {
            id: "letter_at_midsummer".into(),
            title: "A Letter at Midsummer".into(),
            currency: CurrencyKind::Tears,
            base_reward: 10,
            story_line: Some("mothers_letters".into()),
            order_index: 3,
            related_jieqi: Some(Jieqi::Xiazhi),
        },
        MemoryDef {
            id: "letter_in_white_dew".into(),
            title: "A Letter in White Dew".into(),
            currency: CurrencyKind::Tears,
            base_reward: 12,
            story_line: Some("mothers_letters".into()),
            order_index: 4,
            related_jieqi: Some(Jieqi::Bailu),
        },
        MemoryDef {
            id: "letter_never_sent".into(),
            title: "The Letter Never Sent".into(),
            currency: CurrencyKind::Tears,
            base_reward: 16,
            story_line: Some("mothers_letters".into()),
            order_index: 5,
            related_jieqi: Some(Jieqi::Dongzhi),
        },
        // ── The Garden Keeper's Notes ───────────────────────────────────
        MemoryDef {
            id: "keeper_planting_notes".into(),
            title: "The Keeper's Planting Notes".into(),
            currency: CurrencyKind::Stones,
            base_reward: 6,
            story_line: Some("garden_keeper".into()),
            order_index: 1,
            related_jieqi: Some(Jieqi::Jingzhe),
        },
        MemoryDef {
            id: "keeper_pond_ledger".into(),
            title: "The Keeper's Pond Ledger".into(),
            currency: CurrencyKind::Stones,
            base_reward: 6,
            story_line: Some("garden_keeper".into()),
            order_index: 2,
            related_jieqi: Some(Jieqi::Xiaoshu),
        },
        MemoryDef {
            id: "keeper_harvest_tally".into(),
            title: "The Keeper's Harvest Tally".into(),
            currency: CurrencyKind::Stones,
            base_reward: 8,
            story_line: Some("garden_keeper".into()),
            order_index: 3,
            related_jieqi: Some(Jieqi::Shuangjiang),
        },
        MemoryDef {
            id: "keeper_last_entry".into(),
            title: "The Keeper's Last Entry".into(),
            currency: CurrencyKind::Stones,
            base_reward: 12,
            story_line: Some("garden_keeper".into()),
            order_index: 4,
            related_jieqi: Some(Jieqi::Xiaohan),
        },
        // ── Standalone ──────────────────────────────────────────────────
        MemoryDef {
            id: "unsent_postcard".into(),
            title: "The Unsent Postcard".into(),
            currency: CurrencyKind::Tears,
            base_reward: 5,
            story_line: None,
            order_index: 1,
            related_jieqi: None,
        },
    ];

    for memory in memories {
        registry.memories.insert(memory.id.clone(), memory);
    }
}

/// Populate the StoryRegistry with the milestone ladders.
///
/// Thresholds count the gapless run of unlocked memories at the head of
/// the line. Cells 20–24 start locked; milestones open them one by one.
pub fn populate_story_lines(registry: &mut StoryRegistry) {
    let lines: Vec<StoryLineDef> = vec![
        StoryLineDef {
            id: "mothers_letters".into(),
            name: "Mother's Letters".into(),
            milestones: vec![
                MilestoneDef {
                    threshold: 2,
                    reward_currency: CurrencyKind::Tears,
                    reward_amount: 10,
                    flower_bonus: None,
                    unlock_cell: None,
                },
                MilestoneDef {
                    threshold: 4,
                    reward_currency: CurrencyKind::Tears,
                    reward_amount: 12,
                    flower_bonus: Some(("plum_soul".into(), 50.0)),
                    unlock_cell: Some(20),
                },
                MilestoneDef {
                    threshold: 5,
                    reward_currency: CurrencyKind::Tears,
                    reward_amount: 20,
                    flower_bonus: None,
                    unlock_cell: Some(21),
                },
            ],
        },
        StoryLineDef {
            id: "garden_keeper".into(),
            name: "The Garden Keeper".into(),
            milestones: vec![
                MilestoneDef {
                    threshold: 2,
                    reward_currency: CurrencyKind::Stones,
                    reward_amount: 8,
                    flower_bonus: None,
                    unlock_cell: None,
                },
                MilestoneDef {
                    threshold: 4,
                    reward_currency: CurrencyKind::Stones,
                    reward_amount: 14,
                    flower_bonus: Some(("chrysanthemum_soul".into(), 40.0)),
                    unlock_cell: Some(22),
                },
            ],
        },
    ];

    for line in lines {
        registry.lines.insert(line.id.clone(), line);
    }
}
