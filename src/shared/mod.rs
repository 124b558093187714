//! Shared resources, events, and states for Everbloom.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    /// A quiz dialog is open; the per-question timer runs only here.
    Quiz,
    /// The ending event has fired. Season advances are frozen.
    Ended,
}

// ═══════════════════════════════════════════════════════════════════════
// SEASON CLOCK
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn next(self) -> Self {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Autumn => 2,
            Season::Winter => 3,
        }
    }
}

/// One of the 24 solar terms composing a full cycle. Six per season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jieqi {
    // Spring
    Lichun,
    Yushui,
    Jingzhe,
    Chunfen,
    Qingming,
    Guyu,
    // Summer
    Lixia,
    Xiaoman,
    Mangzhong,
    Xiazhi,
    Xiaoshu,
    Dashu,
    // Autumn
    Liqiu,
    Chushu,
    Bailu,
    Qiufen,
    Hanlu,
    Shuangjiang,
    // Winter
    Lidong,
    Xiaoxue,
    Daxue,
    Dongzhi,
    Xiaohan,
    Dahan,
}

pub const ALL_JIEQI: [Jieqi; 24] = [
    Jieqi::Lichun,
    Jieqi::Yushui,
    Jieqi::Jingzhe,
    Jieqi::Chunfen,
    Jieqi::Qingming,
    Jieqi::Guyu,
    Jieqi::Lixia,
    Jieqi::Xiaoman,
    Jieqi::Mangzhong,
    Jieqi::Xiazhi,
    Jieqi::Xiaoshu,
    Jieqi::Dashu,
    Jieqi::Liqiu,
    Jieqi::Chushu,
    Jieqi::Bailu,
    Jieqi::Qiufen,
    Jieqi::Hanlu,
    Jieqi::Shuangjiang,
    Jieqi::Lidong,
    Jieqi::Xiaoxue,
    Jieqi::Daxue,
    Jieqi::Dongzhi,
    Jieqi::Xiaohan,
    Jieqi::Dahan,
];

impl Jieqi {
    pub fn index(self) -> usize {
        ALL_JIEQI.iter().position(|&j| j == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Self {
        ALL_JIEQI[index % STEPS_PER_CYCLE]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// True when `next()` wraps back to the first step of a new cycle.
    pub fn is_last(self) -> bool {
        self.index() == STEPS_PER_CYCLE - 1
    }

    pub fn season(self) -> Season {
        match self.index() / 6 {
            0 => Season::Spring,
            1 => Season::Summer,
            2 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Jieqi::Lichun => "Start of Spring",
            Jieqi::Yushui => "Rain Water",
            Jieqi::Jingzhe => "Awakening of Insects",
            Jieqi::Chunfen => "Spring Equinox",
            Jieqi::Qingming => "Pure Brightness",
            Jieqi::Guyu => "Grain Rain",
            Jieqi::Lixia => "Start of Summer",
            Jieqi::Xiaoman => "Grain Buds",
            Jieqi::Mangzhong => "Grain in Ear",
            Jieqi::Xiazhi => "Summer Solstice",
            Jieqi::Xiaoshu => "Minor Heat",
            Jieqi::Dashu => "Major Heat",
            Jieqi::Liqiu => "Start of Autumn",
            Jieqi::Chushu => "End of Heat",
            Jieqi::Bailu => "White Dew",
            Jieqi::Qiufen => "Autumn Equinox",
            Jieqi::Hanlu => "Cold Dew",
            Jieqi::Shuangjiang => "Frost's Descent",
            Jieqi::Lidong => "Start of Winter",
            Jieqi::Xiaoxue => "Minor Snow",
            Jieqi::Daxue => "Major Snow",
            Jieqi::Dongzhi => "Winter Solstice",
            Jieqi::Xiaohan => "Minor Cold",
            Jieqi::Dahan => "Major Cold",
        }
    }
}

/// The garden's heartbeat: which solar term we are on and how many full
/// cycles have elapsed. Advanced only by the player's explicit action.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GardenClock {
    pub cycle: u32,
    pub step: Jieqi,
}

impl Default for GardenClock {
    fn default() -> Self {
        Self {
            cycle: 1,
            step: Jieqi::Lichun,
        }
    }
}

impl GardenClock {
    pub fn season(&self) -> Season {
        self.step.season()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ACTION POINTS
// ═══════════════════════════════════════════════════════════════════════

/// Per-step budget gating how many paid actions the player may take before
/// the next season advance. Reset to `per_step` on every advance.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct ActionPoints {
    pub per_step: u32,
    pub current: u32,
}

impl Default for ActionPoints {
    fn default() -> Self {
        Self {
            per_step: ACTION_POINTS_PER_STEP,
            current: ACTION_POINTS_PER_STEP,
        }
    }
}

impl ActionPoints {
    /// Deducts `cost` if the budget covers it. A failed check leaves the
    /// budget untouched; the caller must then apply no other mutation.
    #[must_use]
    pub fn consume(&mut self, cost: u32) -> bool {
        if cost == 0 {
            return true;
        }
        if self.current < cost {
            return false;
        }
        self.current -= cost;
        true
    }

    /// Returns points from an action that was rolled back before its
    /// effects applied. Never exceeds the per-step budget.
    pub fn refund(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.per_step);
    }

    pub fn reset(&mut self) {
        self.current = self.per_step;
    }

    /// Observable warning flag for the presentation layer. Carries no
    /// gating rules of its own.
    pub fn is_low(&self) -> bool {
        self.current <= AP_WARNING_THRESHOLD
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LEDGER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyKind {
    Tears,
    Stones,
}

/// The spendable balances plus the narrative echo counter. The tear balance
/// is credited when a tear is collected; the per-tear collected flag in
/// [`TearPouch`] is a separate watering inventory, not a second copy of
/// this number.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub tears: u32,
    pub stones: u32,
    /// Incremented once per memory unlocked. Never spent.
    pub echoes: u32,
}

impl Ledger {
    pub fn balance(&self, kind: CurrencyKind) -> u32 {
        match kind {
            CurrencyKind::Tears => self.tears,
            CurrencyKind::Stones => self.stones,
        }
    }

    pub fn has(&self, kind: CurrencyKind, amount: u32) -> bool {
        self.balance(kind) >= amount
    }

    pub fn credit(&mut self, kind: CurrencyKind, amount: u32) {
        let balance = self.balance_mut(kind);
        *balance = balance.saturating_add(amount);
    }

    /// Debits `amount` if the balance covers it. A failed check leaves the
    /// balance untouched; the caller must then apply no other mutation.
    #[must_use]
    pub fn spend(&mut self, kind: CurrencyKind, amount: u32) -> bool {
        let balance = self.balance_mut(kind);
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        true
    }

    fn balance_mut(&mut self, kind: CurrencyKind) -> &mut u32 {
        match kind {
            CurrencyKind::Tears => &mut self.tears,
            CurrencyKind::Stones => &mut self.stones,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// IDENTIFIERS
// ═══════════════════════════════════════════════════════════════════════

// String IDs for data-driven flexibility, as one registry namespace each.
pub type TearId = String;
pub type FlowerId = String;
pub type BuildingId = String;
pub type BirdId = String;
pub type MemoryId = String;
pub type StoryLineId = String;
pub type EventId = String;

/// Index into the garden grid, `0..GRID_CELLS`.
pub type CellId = usize;

// ═══════════════════════════════════════════════════════════════════════
// GARDEN GRID
// ═══════════════════════════════════════════════════════════════════════

/// What a cell holds. Exactly one variant per cell; the tag eliminates the
/// "wrong occupant kind" class of lookup bugs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Occupant {
    #[default]
    Empty,
    Building(BuildingId),
    Flower(FlowerId),
    Memory(MemoryId),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cell {
    pub occupant: Occupant,
    /// 0.0–1.0 degradation. Only meaningful while the occupant is a building.
    pub decay: f32,
    pub unlocked: bool,
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GardenGrid {
    pub cells: Vec<Cell>,
}

impl Default for GardenGrid {
    fn default() -> Self {
        let cells = (0..GRID_CELLS)
            .map(|id| Cell {
                occupant: Occupant::Empty,
                decay: 0.0,
                unlocked: id < INITIAL_UNLOCKED_CELLS,
            })
            .collect();
        Self { cells }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DEFINITIONS — static data loaded into registries at startup
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TearDef {
    pub id: TearId,
    pub name: String,
    pub potency: u32,
    /// Seasons during which this tear can appear as collectible.
    pub seasons: Vec<Season>,
    /// Non-consumable tears survive being used in a watering.
    pub consumable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowerDef {
    pub id: FlowerId,
    pub name: String,
    pub max_level: u8,
    /// Growth multiplier per season, indexed by `Season::index()`.
    pub seasonal_growth: [f32; 4],
    pub tear_preference: Vec<TearId>,
    /// Building that must be built before this flower unlocks.
    pub needs_building: BuildingId,
    /// Flavor line revealed once the flower fully awakens.
    pub judgment: String,
}

impl FlowerDef {
    pub fn seasonal_multiplier(&self, season: Season) -> f32 {
        self.seasonal_growth[season.index()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingDef {
    pub id: BuildingId,
    pub name: String,
    pub cost_tears: u32,
    pub cost_stones: u32,
    /// Decay accumulated per season step is `decay_rate / 24`.
    pub decay_rate: f32,
    pub related_flower: Option<FlowerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirdDef {
    pub id: BirdId,
    pub name: String,
    pub related_flower: FlowerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDef {
    pub id: MemoryId,
    pub title: String,
    /// Which ledger balance the unlock reward pays into.
    pub currency: CurrencyKind,
    pub base_reward: u32,
    pub story_line: Option<StoryLineId>,
    /// 1-based position within its story line.
    pub order_index: u32,
    /// The solar term at which this memory surfaces. `None` = available
    /// from the start.
    pub related_jieqi: Option<Jieqi>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneDef {
    /// Fires once the gapless run of unlocked memories reaches this length.
    pub threshold: u32,
    pub reward_currency: CurrencyKind,
    pub reward_amount: u32,
    /// Optional one-time flat growth bonus poured into a named flower.
    pub flower_bonus: Option<(FlowerId, f32)>,
    /// Optional grid cell unlocked as part of the reward.
    pub unlock_cell: Option<CellId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryLineDef {
    pub id: StoryLineId,
    pub name: String,
    pub milestones: Vec<MilestoneDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    pub id: EventId,
    pub cycle: u32,
    pub step: Jieqi,
    pub narration: String,
    /// An ending event freezes all further season advances.
    pub ending: bool,
}

/// A narrative (flower, solar term, tear) triple that doubles a watering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboDef {
    pub flower: FlowerId,
    pub step: Jieqi,
    pub tear: TearId,
    pub multiplier: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: usize,
}

// ═══════════════════════════════════════════════════════════════════════
// REGISTRIES — populated by the data plugin during Loading
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Default)]
pub struct TearRegistry {
    pub tears: HashMap<TearId, TearDef>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct FlowerRegistry {
    pub flowers: HashMap<FlowerId, FlowerDef>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct BuildingRegistry {
    pub buildings: HashMap<BuildingId, BuildingDef>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct BirdRegistry {
    pub birds: HashMap<BirdId, BirdDef>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct MemoryRegistry {
    pub memories: HashMap<MemoryId, MemoryDef>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct StoryRegistry {
    pub lines: HashMap<StoryLineId, StoryLineDef>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct EventRegistry {
    pub events: HashMap<EventId, EventDef>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ComboRegistry {
    pub combos: Vec<ComboDef>,
}

/// Quiz question sets keyed by memory id. Loaded from the embedded RON
/// content document; a memory with no entry here cannot start its quiz.
#[derive(Resource, Debug, Clone, Default)]
pub struct QuizRegistry {
    pub sets: HashMap<MemoryId, Vec<QuizQuestion>>,
}

// ═══════════════════════════════════════════════════════════════════════
// MUTABLE STATE — persisted in the snapshot
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowerState {
    pub level: u8,
    pub growth: f32,
    /// `None` = unplanted. `Some(cell)` implies that cell's occupant is
    /// this flower.
    pub position: Option<CellId>,
    pub unlocked: bool,
    pub awakened: bool,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Flowers {
    pub states: HashMap<FlowerId, FlowerState>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingState {
    pub built: bool,
    pub position: Option<CellId>,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Buildings {
    pub states: HashMap<BuildingId, BuildingState>,
}

/// The watering inventory: which tear kinds are currently in hand, and
/// which kinds appeared as collectible this season step.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TearPouch {
    pub collected: HashSet<TearId>,
    pub available: Vec<TearId>,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Aviary {
    pub unlocked: HashSet<BirdId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryState {
    pub discoverable: bool,
    pub verified: bool,
    pub unlocked: bool,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Memories {
    pub states: HashMap<MemoryId, MemoryState>,
}

impl Memories {
    pub fn state(&self, id: &str) -> MemoryState {
        self.states.get(id).cloned().unwrap_or_default()
    }
}

/// Per-story-line fired flags, parallel to the line's milestone list.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryProgress {
    pub fired: HashMap<StoryLineId, Vec<bool>>,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventProgress {
    pub triggered: HashSet<EventId>,
}

/// Play statistics accumulated across the run. Persisted in the snapshot.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GardenStats {
    pub tears_collected: u64,
    pub stones_gathered: u64,
    pub waters: u64,
    pub repairs: u64,
    pub builds: u64,
    pub quizzes_completed: u64,
    pub cycles_completed: u64,
}

// ═══════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════

/// Failure taxonomy for the command surface. Expected conditions are
/// returned, never panicked; [`GardenError::InvariantViolation`] is the one
/// programmer-error case and is asserted against in tests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GardenError {
    #[error("not enough {kind:?}: need {needed}, have {have}")]
    InsufficientCurrency {
        kind: CurrencyKind,
        needed: u32,
        have: u32,
    },

    #[error("not enough action points: need {needed}, have {have}")]
    ActionPointsDepleted { needed: u32, have: u32 },

    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    /// Re-triggering an idempotent unlock. Benign no-op, surfaced so the
    /// caller can skip its side effects.
    #[error("already unlocked: {0}")]
    AlreadyUnlocked(String),

    #[error("content failed to load: {0}")]
    ContentLoadFailed(String),

    #[error("unknown id: {0}")]
    UnknownId(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — command surface
// ═══════════════════════════════════════════════════════════════════════

/// Advance the season clock by one solar term.
#[derive(Event, Debug, Clone)]
pub struct AdvanceSeasonEvent;

/// Pick up a collectible tear, or gather stones.
#[derive(Event, Debug, Clone)]
pub enum CollectCurrencyEvent {
    Tear(TearId),
    Stones,
}

#[derive(Event, Debug, Clone)]
pub struct BuildEvent {
    pub building_id: BuildingId,
    pub cell: CellId,
}

#[derive(Event, Debug, Clone)]
pub struct RepairEvent {
    pub cell: CellId,
}

#[derive(Event, Debug, Clone)]
pub struct PlantFlowerEvent {
    pub flower_id: FlowerId,
    pub cell: CellId,
}

#[derive(Event, Debug, Clone)]
pub struct WaterFlowerEvent {
    pub flower_id: FlowerId,
    pub tear_id: TearId,
}

#[derive(Event, Debug, Clone)]
pub struct StartQuizEvent {
    pub memory_id: MemoryId,
}

#[derive(Event, Debug, Clone)]
pub struct AnswerQuizEvent {
    pub option: usize,
}

/// Close the quiz dialog, discarding uncommitted question state.
#[derive(Event, Debug, Clone)]
pub struct AbandonQuizEvent;

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — notifications for the presentation layer
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct SeasonAdvancedEvent {
    pub cycle: u32,
    pub step: Jieqi,
    pub new_cycle: bool,
}

/// Notification that a balance already changed. The sending system mutates
/// the [`Ledger`] itself, under the same exclusive borrow as its validation
/// checks; this event only feeds totals bookkeeping and the presentation
/// layer.
#[derive(Event, Debug, Clone)]
pub struct LedgerChangeEvent {
    pub kind: CurrencyKind,
    /// Positive = gain, negative = spend.
    pub amount: i64,
    pub reason: String,
}

#[derive(Event, Debug, Clone)]
pub struct FlowerLeveledEvent {
    pub flower_id: FlowerId,
    pub new_level: u8,
}

#[derive(Event, Debug, Clone)]
pub struct FlowerAwakenedEvent {
    pub flower_id: FlowerId,
    pub judgment: String,
}

#[derive(Event, Debug, Clone)]
pub struct BirdUnlockedEvent {
    pub bird_id: BirdId,
}

#[derive(Event, Debug, Clone)]
pub struct MemoryDiscoveredEvent {
    pub memory_id: MemoryId,
    pub cell: Option<CellId>,
}

#[derive(Event, Debug, Clone)]
pub struct MemoryUnlockedEvent {
    pub memory_id: MemoryId,
    pub reward: u32,
}

#[derive(Event, Debug, Clone)]
pub struct MilestoneFiredEvent {
    pub story_line: StoryLineId,
    pub threshold: u32,
}

#[derive(Event, Debug, Clone)]
pub struct StoryEventFiredEvent {
    pub event_id: EventId,
    pub narration: String,
    pub ending: bool,
}

/// Player-facing feedback for denied or completed actions. The core never
/// depends on a toast being rendered.
#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
}

impl ToastEvent {
    pub fn error(err: &GardenError) -> Self {
        Self {
            message: err.to_string(),
            duration_secs: 3.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const STEPS_PER_CYCLE: usize = 24;

pub const GRID_WIDTH: usize = 5;
pub const GRID_CELLS: usize = GRID_WIDTH * GRID_WIDTH;
/// Cells `0..INITIAL_UNLOCKED_CELLS` start unlocked; the rest are opened
/// by story-line milestones.
pub const INITIAL_UNLOCKED_CELLS: usize = 20;

pub const ACTION_POINTS_PER_STEP: u32 = 10;
pub const AP_WARNING_THRESHOLD: u32 = 2;

pub const COLLECT_AP_COST: u32 = 1;
pub const PLANT_AP_COST: u32 = 1;
pub const WATER_AP_COST: u32 = 1;
pub const QUIZ_AP_COST: u32 = 1;

pub const STONE_YIELD_PER_GATHER: u32 = 2;

pub const GROWTH_MAX: f32 = 100.0;
pub const PASSIVE_GROWTH_BASE: f32 = 2.0;
pub const PREFERENCE_MULTIPLIER: f32 = 2.0;
pub const RESONANCE_MULTIPLIER: f32 = 1.5;
pub const BIRD_UNLOCK_LEVEL: u8 = 3;

pub const QUESTION_TIME_LIMIT_SECS: f32 = 30.0;

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════
