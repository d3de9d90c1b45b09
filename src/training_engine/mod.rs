//! Core training engine: card selection, session state and scoring.
//!
//! ## Module overview
//!
//! | Module       | Purpose |
//! |--------------|---------|
//! | `level`      | Ordinal 0..=7 proficiency scale and the level → interval table |
//! | `models`     | Shared types: cards, card sets, answer log, route-facing results |
//! | `card_set`   | Due-card selection: filter, most-overdue-first, limit, shuffle |
//! | `statistics` | Answer checking, per-card stat updates, session figures |
//! | `session`    | `SessionStore` seam and typed per-mode session state |
//! | `store`      | `CardStore` seam, row codec, in-memory sheet store |
//! | `learn`      | Two-pass learn session state machine with bulk write-back |
//! | `review`     | Unscored circular browsing |
//! | `config`     | `TrainerConfig`, loaded once and shared |
//! | `clock`      | Injectable time source |
//! | `error`      | `TrainerError` / `StoreError` |

pub mod card_set;
pub mod clock;
pub mod config;
pub mod error;
pub mod learn;
pub mod level;
pub mod models;
pub mod review;
pub mod session;
pub mod statistics;
pub mod store;

// Re-export the public API surface so callers can use
// `training_engine::LearnSession` without reaching into sub-modules.
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ReviewPassPolicy, TrainerConfig, DEFAULT_REVIEW_PASS_POLICY};
pub use error::{StoreError, TrainerError};
pub use learn::LearnSession;
pub use level::{IntervalTable, Level};
pub use models::{
    AnswerOutcome, AnswerRecord, Card, CardContext, CardSet, LevelChange, SessionStart,
    SessionStats, SessionSummary, NEVER_SHOWN,
};
pub use review::{Direction, ReviewBrowser};
pub use session::{InMemorySessionStore, SessionStore};
pub use statistics::session_stats;
pub use store::{CardStore, SheetCardStore};
