//! Answer checking, per-card stat updates, and session summary figures.
//!
//! Everything here is pure: callers pass in the card, the answer, and the
//! current time, and get back the new values.

use chrono::{DateTime, Utc};

use crate::training_engine::models::{AnswerRecord, Card, LevelChange, SessionStats};

/// Trimmed, case-insensitive comparison against the single expected answer.
pub fn check_answer(user_answer: &str, expected: &str) -> bool {
    user_answer.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// Record one answer on `card`.
///
/// Always bumps `cnt_shown` and stamps `last_shown`. A correct answer bumps
/// `cnt_corr_answers` and, when `promote` is set, raises the level; a wrong
/// answer lowers it.
pub fn apply_answer(card: &mut Card, is_correct: bool, promote: bool, now: DateTime<Utc>) -> LevelChange {
    let from = card.level;

    card.cnt_shown += 1;
    card.last_shown = now;

    if is_correct {
        card.cnt_corr_answers += 1;
        if promote {
            card.level = card.level.next_level();
        }
    } else {
        card.level = card.level.previous_level();
    }

    log::debug!(
        "card {} answered {}: level {} -> {}",
        card.id,
        if is_correct { "correctly" } else { "incorrectly" },
        from,
        card.level
    );

    LevelChange { from, to: card.level, is_correct }
}

/// Percentage rounded to the nearest integer, halves up (1/8 gives 13).
/// 0 for an empty log.
pub fn accuracy(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

pub fn session_stats(answers: &[AnswerRecord]) -> SessionStats {
    let total = answers.len();
    let correct = answers.iter().filter(|a| a.is_correct).count();
    let review = answers.iter().filter(|a| a.is_review).count();

    SessionStats {
        total_answered: total,
        correct_answers: correct,
        accuracy_percentage: accuracy(correct, total),
        review_count: review,
        first_attempt_count: total - review,
    }
}
