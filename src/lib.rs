//! # vocab_drill
//!
//! The scheduling and session engine of a vocabulary flashcard trainer.
//!
//! Every card carries a proficiency [`Level`] from 0 to 7. Each level maps to
//! a review interval in days; a card is due once that interval has passed
//! since it was last shown. A correct answer raises the level by one, a wrong
//! answer lowers it by one, both saturating at the ends of the scale.
//!
//! ## How it works
//!
//! 1. Build a [`TrainerConfig`] once (defaults or TOML) and share it by `Arc`.
//! 2. Create a [`LearnSession`] with a [`SessionStore`] (where per-user state
//!    lives) and a [`CardStore`] (where card rows live).
//! 3. `start_session` stages the most overdue cards, up to
//!    `max_cards_per_session`, in shuffled order.
//! 4. Loop on `get_current_card_context` / `process_answer`. After the first
//!    pass, every card answered wrong is shown once more in a review pass.
//! 5. `end_session` writes the updated statistics back in one bulk call and
//!    returns a [`SessionSummary`].
//!
//! [`ReviewBrowser`] is the separate, unscored mode: flip through every card
//! of a set with wrap-around navigation.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use vocab_drill::{
//!     Card, InMemorySessionStore, LearnSession, SheetCardStore, TrainerConfig,
//! };
//!
//! let store = SheetCardStore::new();
//! store
//!     .insert_cards("my-book", "Spanish", 0, &[Card::new(1, "casa", "house")])
//!     .unwrap();
//!
//! let config = Arc::new(TrainerConfig::default());
//! let mut learn = LearnSession::new(InMemorySessionStore::new(), "user-1", store, config);
//!
//! assert!(learn.start_session("Spanish", "my-book").success);
//! while let Some(ctx) = learn.get_current_card_context() {
//!     println!("Translate: {}", ctx.card.translation);
//!     let outcome = learn.process_answer("casa");
//!     assert!(outcome.is_correct);
//! }
//! let summary = learn.end_session(false);
//! assert_eq!(summary.stats.accuracy_percentage, 100);
//! assert!(summary.update_successful);
//! ```

pub mod training_engine;

// Convenience re-exports so callers can use `vocab_drill::LearnSession`
// directly without reaching into `training_engine::`.
pub use training_engine::{
    AnswerOutcome, AnswerRecord, Card, CardContext, CardSet, CardStore, Clock, Direction,
    FixedClock, InMemorySessionStore, IntervalTable, LearnSession, Level, LevelChange,
    ReviewBrowser, ReviewPassPolicy, SessionStart, SessionStats, SessionStore, SessionSummary,
    SheetCardStore, StoreError, SystemClock, TrainerConfig, TrainerError,
};
