use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::training_engine::level::{IntervalTable, Level};

/// `last_shown` of a card that has never been shown.
pub const NEVER_SHOWN: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// One vocabulary item with its learning statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub word: String,
    pub translation: String,
    #[serde(default)]
    pub equivalent: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub example_translation: String,
    #[serde(default)]
    pub cnt_shown: u32,
    #[serde(default)]
    pub cnt_corr_answers: u32,
    #[serde(default)]
    pub level: Level,
    #[serde(default = "never_shown")]
    pub last_shown: DateTime<Utc>,
}

fn never_shown() -> DateTime<Utc> {
    NEVER_SHOWN
}

impl Card {
    /// A fresh, never-shown card at level 0.
    pub fn new(id: i64, word: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            id,
            word: word.into(),
            translation: translation.into(),
            equivalent: String::new(),
            example: String::new(),
            example_translation: String::new(),
            cnt_shown: 0,
            cnt_corr_answers: 0,
            level: Level::MIN,
            last_shown: NEVER_SHOWN,
        }
    }

    /// Saturates at the latest representable instant.
    pub fn next_review(&self, intervals: &IntervalTable) -> DateTime<Utc> {
        let interval = Duration::days(i64::from(intervals.interval_days(self.level)));
        self.last_shown
            .checked_add_signed(interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Negative when the card is overdue.
    pub fn seconds_to_next_review(&self, intervals: &IntervalTable, now: DateTime<Utc>) -> i64 {
        (self.next_review(intervals) - now).num_seconds()
    }

    pub fn is_delayed(&self, intervals: &IntervalTable, now: DateTime<Utc>) -> bool {
        now > self.next_review(intervals)
    }

    pub fn is_unshown(&self) -> bool {
        self.cnt_shown == 0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({}, {})", self.id, self.word, self.translation, self.level)
    }
}

/// A named collection of cards, read from one tab of the card store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSet {
    /// Tab name; may change over the collection's life.
    pub name: String,
    /// Permanent id of the tab.
    pub gid: i64,
    pub cards: Vec<Card>,
}

// ---------------------------------------------------------------------------
// Answers and statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChange {
    pub from: Level,
    pub to: Level,
    pub is_correct: bool,
}

/// One line of a learn session's answer log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub card_id: i64,
    /// Position of the card in the session snapshot.
    pub card_index: usize,
    pub word: String,
    pub translation: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    /// Given during the review pass rather than the first pass.
    pub is_review: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_answered: usize,
    pub correct_answers: usize,
    pub accuracy_percentage: u32,
    pub review_count: usize,
    pub first_attempt_count: usize,
}

// ---------------------------------------------------------------------------
// Route-facing results
// ---------------------------------------------------------------------------

/// What to show next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContext {
    pub card: Card,
    /// Cursor within the current pass.
    pub index: usize,
    /// Cards in the current pass.
    pub total: usize,
    pub is_review: bool,
    pub active_tab: String,
    pub sheet_gid: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStart {
    pub success: bool,
    pub card_count: usize,
    pub error: Option<String>,
}

impl SessionStart {
    pub fn started(card_count: usize) -> Self {
        Self {
            success: true,
            card_count,
            error: None,
        }
    }

    pub fn failed(reason: impl fmt::Display) -> Self {
        Self {
            success: false,
            card_count: 0,
            error: Some(reason.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub success: bool,
    pub is_correct: bool,
    pub level_change: Option<LevelChange>,
    pub error: Option<String>,
}

impl AnswerOutcome {
    pub fn answered(change: LevelChange) -> Self {
        Self {
            success: true,
            is_correct: change.is_correct,
            level_change: Some(change),
            error: None,
        }
    }

    pub fn failed(reason: impl fmt::Display) -> Self {
        Self {
            success: false,
            is_correct: false,
            level_change: None,
            error: Some(reason.to_string()),
        }
    }
}

/// Result of ending a learn session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub stats: SessionStats,
    pub answers: Vec<AnswerRecord>,
    pub original_count: usize,
    /// False when the bulk write-back failed or had nothing to write.
    pub update_successful: bool,
    pub ended_early: bool,
    /// Only non-zero for early endings.
    pub cards_remaining: usize,
}
