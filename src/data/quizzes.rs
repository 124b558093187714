use std::collections::HashMap;

use bevy::prelude::warn;

use crate::shared::*;

/// Quiz question sets, embedded as a RON document so writers can edit the
/// content without touching code.
const QUIZ_SOURCE: &str = include_str!("quizzes.ron");

/// Populate the QuizRegistry from the embedded RON document. A parse
/// failure leaves the registry empty; starting a quiz then fails with a
/// content error and refunds the action point, so play continues.
pub fn populate_quizzes(registry: &mut QuizRegistry) {
    match ron::de::from_str::<HashMap<MemoryId, Vec<QuizQuestion>>>(QUIZ_SOURCE) {
        Ok(sets) => registry.sets = sets,
        Err(err) => warn!("[Data] Quiz content failed to parse: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_source_parses() {
        let mut registry = QuizRegistry::default();
        populate_quizzes(&mut registry);
        assert!(!registry.sets.is_empty(), "embedded quiz content must parse");
    }

    #[test]
    fn test_correct_indices_in_range() {
        let mut registry = QuizRegistry::default();
        populate_quizzes(&mut registry);
        for (memory_id, questions) in &registry.sets {
            assert!(!questions.is_empty(), "empty set for '{memory_id}'");
            for question in questions {
                assert!(
                    question.correct < question.options.len(),
                    "out-of-range answer in '{memory_id}'"
                );
                assert!(question.options.len() >= 2);
            }
        }
    }
}
