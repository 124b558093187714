//! Quiz domain — memory discovery, the timed question session, and the
//! unlock payout.
//!
//! Starting a quiz moves the game into `GameState::Quiz`; every other
//! domain's command handlers stop running until the session resolves, so a
//! memory can never be unlocked twice by racing commands.

pub mod reward;

use bevy::prelude::*;

use crate::shared::*;
use reward::{total_reward, QuestionRecord};

/// Live quiz state. Inserted by [`handle_start_quiz`], removed on
/// completion or abandon.
#[derive(Resource, Debug, Clone)]
pub struct QuizSession {
    pub memory_id: MemoryId,
    pub questions: Vec<QuizQuestion>,
    /// Index of the question currently on screen.
    pub index: usize,
    /// Wrong attempts on the current question.
    pub current_mistakes: u32,
    pub timer: Timer,
    pub records: Vec<QuestionRecord>,
}

impl QuizSession {
    fn new(memory_id: MemoryId, questions: Vec<QuizQuestion>) -> Self {
        Self {
            memory_id,
            questions,
            index: 0,
            current_mistakes: 0,
            timer: Timer::from_seconds(QUESTION_TIME_LIMIT_SECS, TimerMode::Once),
            records: Vec::new(),
        }
    }

    fn complete(&self) -> bool {
        self.index >= self.questions.len()
    }

    fn advance(&mut self, record: QuestionRecord) {
        self.records.push(record);
        self.index += 1;
        self.current_mistakes = 0;
        self.timer.reset();
    }
}

pub struct QuizPlugin;

impl Plugin for QuizPlugin {
    fn build(&self, app: &mut App) {
        app
            // Memories surface when their solar term arrives; the ones with
            // no term surface as soon as play begins.
            .add_systems(OnEnter(GameState::Playing), seed_initial_memories)
            .add_systems(
                Update,
                (discover_memories, handle_start_quiz).run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    tick_question_timer,
                    handle_answer,
                    handle_abandon,
                    finish_completed_session,
                )
                    .chain()
                    .run_if(in_state(GameState::Quiz)),
            );
    }
}

// ─── Discovery ───────────────────────────────────────────────────────────────

/// Marks `memory` discoverable and seats it in the first empty unlocked
/// cell, if any. Idempotent: returns `None` when the memory already
/// surfaced or unlocked.
fn surface_memory(
    def: &MemoryDef,
    memories: &mut Memories,
    grid: &mut GardenGrid,
) -> Option<MemoryDiscoveredEvent> {
    let state = memories.states.entry(def.id.clone()).or_default();
    if state.discoverable || state.unlocked {
        return None;
    }
    state.discoverable = true;

    let cell = grid.find_empty_unlocked();
    if let Some(cell_id) = cell {
        // Validated empty a line above, place cannot fail.
        let _ = grid.place(cell_id, Occupant::Memory(def.id.clone()));
    }

    info!(
        "[Quiz] Memory '{}' surfaced{}",
        def.title,
        cell.map(|c| format!(" at cell {c}")).unwrap_or_default()
    );
    Some(MemoryDiscoveredEvent {
        memory_id: def.id.clone(),
        cell,
    })
}

/// Surfaces the memories with no associated solar term. Runs on every
/// return to Playing but the surfacing itself is idempotent.
fn seed_initial_memories(
    registry: Res<MemoryRegistry>,
    mut memories: ResMut<Memories>,
    mut grid: ResMut<GardenGrid>,
    mut discovered_writer: EventWriter<MemoryDiscoveredEvent>,
) {
    let mut defs: Vec<&MemoryDef> = registry
        .memories
        .values()
        .filter(|d| d.related_jieqi.is_none())
        .collect();
    defs.sort_by(|a, b| a.id.cmp(&b.id));

    for def in defs {
        if let Some(ev) = surface_memory(def, &mut memories, &mut grid) {
            discovered_writer.send(ev);
        }
    }
}

/// Surfaces the memories tied to the solar term the clock just reached.
fn discover_memories(
    mut advanced: EventReader<SeasonAdvancedEvent>,
    registry: Res<MemoryRegistry>,
    mut memories: ResMut<Memories>,
    mut grid: ResMut<GardenGrid>,
    mut discovered_writer: EventWriter<MemoryDiscoveredEvent>,
) {
    for ev in advanced.read() {
        let mut defs: Vec<&MemoryDef> = registry
            .memories
            .values()
            .filter(|d| d.related_jieqi == Some(ev.step))
            .collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));

        for def in defs {
            if let Some(ev) = surface_memory(def, &mut memories, &mut grid) {
                discovered_writer.send(ev);
            }
        }
    }
}

// ─── Session start ───────────────────────────────────────────────────────────

/// Listens for [`StartQuizEvent`]. The action-point cost is debited up
/// front and refunded if the question set turns out to be missing, so a
/// content failure leaves the player whole.
fn handle_start_quiz(
    mut events: EventReader<StartQuizEvent>,
    mut commands: Commands,
    mut ap: ResMut<ActionPoints>,
    memories: Res<Memories>,
    memory_registry: Res<MemoryRegistry>,
    quiz_registry: Res<QuizRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for ev in events.read() {
        let Some(def) = memory_registry.memories.get(&ev.memory_id) else {
            toast_writer.send(ToastEvent::error(&GardenError::UnknownId(
                ev.memory_id.clone(),
            )));
            continue;
        };

        let state = memories.state(&ev.memory_id);
        if state.unlocked {
            toast_writer.send(ToastEvent::error(&GardenError::AlreadyUnlocked(
                def.title.clone(),
            )));
            continue;
        }
        if !state.discoverable {
            toast_writer.send(ToastEvent::error(&GardenError::InvalidPlacement(format!(
                "'{}' has not surfaced yet",
                def.title
            ))));
            continue;
        }
        if !ap.consume(QUIZ_AP_COST) {
            toast_writer.send(ToastEvent::error(&GardenError::ActionPointsDepleted {
                needed: QUIZ_AP_COST,
                have: ap.current,
            }));
            continue;
        }

        let questions = quiz_registry.sets.get(&ev.memory_id).cloned();
        let Some(questions) = questions.filter(|q| !q.is_empty()) else {
            ap.refund(QUIZ_AP_COST);
            warn!("[Quiz] No question set for memory '{}'", ev.memory_id);
            toast_writer.send(ToastEvent::error(&GardenError::ContentLoadFailed(format!(
                "questions for '{}'",
                def.title
            ))));
            continue;
        };

        info!(
            "[Quiz] Session started for '{}' ({} questions)",
            def.title,
            questions.len()
        );
        commands.insert_resource(QuizSession::new(ev.memory_id.clone(), questions));
        next_state.set(GameState::Quiz);
        // One session at a time; further start commands this frame expire.
        break;
    }
}

// ─── Session systems ─────────────────────────────────────────────────────────

/// Counts the current question down. On timeout the question is recorded
/// as worth nothing and the session moves on.
fn tick_question_timer(time: Res<Time>, session: Option<ResMut<QuizSession>>) {
    let Some(mut session) = session else {
        return;
    };
    if session.complete() {
        return;
    }

    session.timer.tick(time.delta());
    if session.timer.finished() {
        let mistakes = session.current_mistakes;
        warn!(
            "[Quiz] Question {} timed out ({} wrong attempts)",
            session.index + 1,
            mistakes
        );
        session.advance(QuestionRecord {
            time_spent: QUESTION_TIME_LIMIT_SECS,
            mistakes,
            timed_out: true,
        });
    }
}

/// Listens for [`AnswerQuizEvent`]. A correct option resolves the question;
/// a wrong one adds a mistake and leaves the clock running.
fn handle_answer(
    mut events: EventReader<AnswerQuizEvent>,
    session: Option<ResMut<QuizSession>>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    let Some(mut session) = session else {
        return;
    };

    for ev in events.read() {
        if session.complete() {
            break;
        }
        let question = &session.questions[session.index];
        if ev.option >= question.options.len() {
            toast_writer.send(ToastEvent::error(&GardenError::UnknownId(format!(
                "option {}",
                ev.option
            ))));
            continue;
        }

        if ev.option == question.correct {
            let record = QuestionRecord {
                time_spent: session.timer.elapsed_secs(),
                mistakes: session.current_mistakes,
                timed_out: false,
            };
            info!(
                "[Quiz] Question {} answered in {:.1}s with {} mistake(s)",
                session.index + 1,
                record.time_spent,
                record.mistakes
            );
            session.advance(record);
        } else {
            session.current_mistakes += 1;
            toast_writer.send(ToastEvent {
                message: "Not quite. Try again.".to_string(),
                duration_secs: 2.0,
            });
        }
    }
}

/// Listens for [`AbandonQuizEvent`]. The session is discarded without
/// payout; the action point spent on starting stays spent.
fn handle_abandon(
    mut events: EventReader<AbandonQuizEvent>,
    mut commands: Commands,
    session: Option<Res<QuizSession>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();
    let Some(session) = session else {
        return;
    };

    info!(
        "[Quiz] Session for '{}' abandoned at question {}",
        session.memory_id,
        session.index + 1
    );
    commands.remove_resource::<QuizSession>();
    next_state.set(GameState::Playing);
}

/// Resolves a finished session: computes the payout from the question
/// records, unlocks the memory, frees its grid cell, and returns to play.
fn finish_completed_session(
    mut commands: Commands,
    session: Option<Res<QuizSession>>,
    memory_registry: Res<MemoryRegistry>,
    mut memories: ResMut<Memories>,
    mut grid: ResMut<GardenGrid>,
    mut ledger: ResMut<Ledger>,
    mut stats: ResMut<GardenStats>,
    mut next_state: ResMut<NextState<GameState>>,
    mut ledger_writer: EventWriter<LedgerChangeEvent>,
    mut unlocked_writer: EventWriter<MemoryUnlockedEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    let Some(session) = session else {
        return;
    };
    if !session.complete() {
        return;
    }

    let Some(def) = memory_registry.memories.get(&session.memory_id) else {
        warn!(
            "[Quiz] Memory '{}' vanished from the registry mid-session",
            session.memory_id
        );
        commands.remove_resource::<QuizSession>();
        next_state.set(GameState::Playing);
        return;
    };

    let payout = total_reward(def.base_reward, &session.records);

    if let Some(state) = memories.states.get_mut(&session.memory_id) {
        state.verified = true;
        state.unlocked = true;
        state.discoverable = false;
    }
    if let Some(cell) = grid.position_of(&Occupant::Memory(session.memory_id.clone())) {
        // In-bounds by construction, clear cannot fail.
        let _ = grid.clear(cell);
    }

    if payout > 0 {
        ledger.credit(def.currency, payout);
        ledger_writer.send(LedgerChangeEvent {
            kind: def.currency,
            amount: payout as i64,
            reason: format!("memory: {}", def.title),
        });
    }
    ledger.echoes += 1;
    stats.quizzes_completed += 1;

    info!(
        "[Quiz] '{}' unlocked — payout {} {:?}, echo {}",
        def.title, payout, def.currency, ledger.echoes
    );
    unlocked_writer.send(MemoryUnlockedEvent {
        memory_id: session.memory_id.clone(),
        reward: payout,
    });
    toast_writer.send(ToastEvent {
        message: format!("Memory restored: {}", def.title),
        duration_secs: 4.0,
    });

    commands.remove_resource::<QuizSession>();
    next_state.set(GameState::Playing);
}
