//! Quiz reward math. Pure functions over the per-question records; the
//! session systems in the parent module call these at completion.
//!
//! Each answered question earns a percentage from two banded coefficients,
//! speed and accuracy. Timed-out questions earn nothing and are excluded
//! from the average, but still count toward the final multiplier, so a
//! timeout drags the total down twice.

use serde::{Deserialize, Serialize};

use crate::shared::QUESTION_TIME_LIMIT_SECS;

/// Outcome of a single question within a quiz session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Seconds on the clock when the question resolved.
    pub time_spent: f32,
    /// Wrong attempts made before the correct answer (or the timeout).
    pub mistakes: u32,
    pub timed_out: bool,
}

impl QuestionRecord {
    pub fn timed_out() -> Self {
        Self {
            time_spent: QUESTION_TIME_LIMIT_SECS,
            mistakes: 0,
            timed_out: true,
        }
    }
}

/// Speed band for an answered question. Under 10 seconds earns a bonus,
/// the last stretch before the limit is penalized.
pub fn time_coefficient(secs: f32) -> f32 {
    if secs <= 10.0 {
        1.1
    } else if secs <= 25.0 {
        1.0
    } else {
        0.9
    }
}

/// Accuracy band: each wrong attempt before the right answer costs 20
/// points, floored at 0.2.
pub fn mistake_coefficient(mistakes: u32) -> f32 {
    match mistakes {
        0 => 1.0,
        1 => 0.8,
        2 => 0.6,
        3 => 0.4,
        _ => 0.2,
    }
}

/// Integer percentage earned by one question. Timeouts earn 0.
pub fn question_reward_percent(record: &QuestionRecord) -> u32 {
    if record.timed_out {
        return 0;
    }
    let ratio = time_coefficient(record.time_spent) * mistake_coefficient(record.mistakes);
    (ratio * 100.0).round() as u32
}

/// Final payout for a completed session.
///
/// The answered questions' percentages are averaged, then scaled by the
/// base reward and the TOTAL question count (timeouts included). A session
/// where every question timed out pays nothing.
pub fn total_reward(base_reward: u32, records: &[QuestionRecord]) -> u32 {
    let answered: Vec<&QuestionRecord> = records.iter().filter(|r| !r.timed_out).collect();
    if answered.is_empty() {
        return 0;
    }

    let average_ratio: f32 = answered
        .iter()
        .map(|r| question_reward_percent(r) as f32 / 100.0)
        .sum::<f32>()
        / answered.len() as f32;

    (base_reward as f32 * average_ratio * records.len() as f32).round() as u32
}
