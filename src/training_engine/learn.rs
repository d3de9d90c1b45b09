//! Learn mode: the scored, two-pass session.
//!
//! ```text
//! start_session ──▶ first pass ──▶ review pass ──▶ complete
//!                        │                             ▲
//!                        └──── (no misses) ────────────┘
//! ```
//!
//! The first pass walks every staged card. Each miss queues its index once;
//! the review pass walks that queue a single time and never re-queues.
//! Card statistics only reach the card store in `end_session`, as one bulk
//! write of the whole snapshot.

use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};

use crate::training_engine::{
    clock::{Clock, SystemClock},
    config::TrainerConfig,
    error::{Result, TrainerError},
    models::{AnswerOutcome, AnswerRecord, CardContext, LevelChange, SessionStart, SessionSummary},
    session::{CardSession, SessionKey, SessionMode, SessionStore},
    statistics::{apply_answer, check_answer, session_stats},
    store::CardStore,
};

/// The card under the cursor plus where it lives in the snapshot.
struct Current {
    context: CardContext,
    card_index: usize,
}

pub struct LearnSession<S, C> {
    session: CardSession<S>,
    store: C,
    config: Arc<TrainerConfig>,
    clock: Arc<dyn Clock>,
    rng: StdRng,
}

impl<S: SessionStore, C: CardStore> LearnSession<S, C> {
    pub fn new(sessions: S, session_id: impl Into<String>, store: C, config: Arc<TrainerConfig>) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        Self {
            session: CardSession::new(sessions, session_id, SessionMode::Learn),
            store,
            config,
            clock: Arc::new(SystemClock),
            rng,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // -----------------------------------------------------------------------
    // Start
    // -----------------------------------------------------------------------

    /// Stage the most overdue cards of `tab_name`, replacing any learn
    /// session this id already had.
    pub fn start_session(&mut self, tab_name: &str, store_id: &str) -> SessionStart {
        match self.try_start(tab_name, store_id) {
            Ok(count) => SessionStart::started(count),
            Err(e) => {
                log::warn!("Could not start learn session on '{tab_name}': {e}");
                SessionStart::failed(e)
            }
        }
    }

    fn try_start(&mut self, tab_name: &str, store_id: &str) -> Result<usize> {
        let card_set = self
            .store
            .read_card_set(tab_name, store_id)?
            .ok_or_else(|| TrainerError::CardSetNotFound(tab_name.to_string()))?;

        let cards = card_set.get_cards_to_review(
            Some(self.config.max_cards_per_session),
            false,
            &self.config.intervals,
            self.clock.now(),
            &mut self.rng,
        );
        if cards.is_empty() {
            return Err(TrainerError::NoCardsDue);
        }

        self.session.initialize(&cards, tab_name, card_set.gid, store_id)?;
        self.session.set(SessionKey::Answers, &Vec::<AnswerRecord>::new())?;
        self.session.set(SessionKey::IncorrectCards, &Vec::<usize>::new())?;
        self.session.set(SessionKey::ReviewingIncorrect, &false)?;
        self.session.set(SessionKey::OriginalCount, &cards.len())?;

        log::info!(
            "Learn session started: {} of {} cards from '{tab_name}' (avg level {:.1})",
            cards.len(),
            card_set.card_count(),
            card_set.average_level()
        );
        Ok(cards.len())
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    /// The card to show next, or `None` once the session is complete (or
    /// there is none). Reaching the end of the first pass with misses queued
    /// switches the session into the review pass.
    pub fn get_current_card_context(&self) -> Option<CardContext> {
        match self.current() {
            Ok(current) => current.map(|c| c.context),
            Err(e) => {
                log::warn!("Could not resolve current card: {e}");
                None
            }
        }
    }

    fn current(&self) -> Result<Option<Current>> {
        let Some(state) = self.session.state() else {
            return Ok(None);
        };
        let mut reviewing = self.is_reviewing_incorrect();
        let mut index = state.current_index;

        if !reviewing && index >= state.cards.len() {
            let queued = self.incorrect_indices();
            if queued.is_empty() {
                return Ok(None);
            }
            self.session.set(SessionKey::ReviewingIncorrect, &true)?;
            self.session.set_index(0)?;
            log::info!("Starting review pass: {} missed cards", queued.len());
            reviewing = true;
            index = 0;
        }

        let (card_index, total) = if reviewing {
            let queued = self.incorrect_indices();
            match queued.get(index) {
                Some(&card_index) => (card_index, queued.len()),
                None => return Ok(None),
            }
        } else {
            (index, state.cards.len())
        };

        let Some(card) = state.cards.get(card_index).cloned() else {
            return Ok(None);
        };

        Ok(Some(Current {
            context: CardContext {
                card,
                index,
                total,
                is_review: reviewing,
                active_tab: state.active_tab,
                sheet_gid: state.sheet_gid,
            },
            card_index,
        }))
    }

    /// Move past the current card without answering it.
    pub fn advance_to_next(&self) -> bool {
        if !self.session.has_active_session() {
            return false;
        }
        let next = self.session.current_index() + 1;
        match self.session.set_index(next) {
            Ok(()) => {
                log::debug!("Advanced learn cursor to {next}");
                true
            }
            Err(e) => {
                log::warn!("Could not advance learn cursor: {e}");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Answers
    // -----------------------------------------------------------------------

    pub fn process_answer(&self, user_answer: &str) -> AnswerOutcome {
        match self.try_process_answer(user_answer) {
            Ok(change) => AnswerOutcome::answered(change),
            Err(e) => {
                log::warn!("Answer not processed: {e}");
                AnswerOutcome::failed(e)
            }
        }
    }

    fn try_process_answer(&self, user_answer: &str) -> Result<LevelChange> {
        let Some(Current { context, card_index }) = self.current()? else {
            return Err(if self.session.has_active_session() {
                TrainerError::SessionComplete
            } else {
                TrainerError::NoActiveSession
            });
        };
        let mut card = context.card;
        let is_review = context.is_review;
        let now = self.clock.now();

        let is_correct = check_answer(user_answer, &card.word);
        let change = apply_answer(&mut card, is_correct, self.config.promotes(is_review), now);

        if !is_correct && !is_review {
            let mut queued = self.incorrect_indices();
            queued.push(card_index);
            self.session.set(SessionKey::IncorrectCards, &queued)?;
            log::info!("Card {} queued for review ({} queued)", card.id, queued.len());
        }

        let mut answers = self.answers();
        answers.push(AnswerRecord {
            card_id: card.id,
            card_index,
            word: card.word.clone(),
            translation: card.translation.clone(),
            user_answer: user_answer.to_string(),
            correct_answer: card.word.clone(),
            is_correct,
            is_review,
            timestamp: now,
        });
        self.session.set(SessionKey::Answers, &answers)?;

        self.session.update_card(card_index, &card)?;
        self.session.set(SessionKey::LastLevelChange, &change)?;
        self.session.set_index(context.index + 1)?;

        Ok(change)
    }

    /// Level change of the last answer; cleared once read.
    pub fn take_level_change(&self) -> Option<LevelChange> {
        let change = self.session.get(SessionKey::LastLevelChange);
        if change.is_some() {
            self.session.remove(SessionKey::LastLevelChange);
        }
        change
    }

    // -----------------------------------------------------------------------
    // End
    // -----------------------------------------------------------------------

    /// Summarise, write the snapshot back in one call, and clear the session.
    ///
    /// The session is cleared even when the write-back fails; the failure only
    /// shows up as `update_successful == false`.
    pub fn end_session(&self, early: bool) -> SessionSummary {
        let answers = self.answers();
        let original_count = self.session.get(SessionKey::OriginalCount).unwrap_or(answers.len());
        let stats = session_stats(&answers);

        let update_successful = match self.write_back() {
            Ok(()) => true,
            Err(e) => {
                log::error!("Bulk write-back failed: {e}");
                false
            }
        };

        let cards_remaining = if early {
            original_count.saturating_sub(stats.total_answered)
        } else {
            0
        };

        self.session.clear();
        log::info!(
            "Learn session ended{}: {}/{} correct ({}%), written back: {update_successful}",
            if early { " early" } else { "" },
            stats.correct_answers,
            stats.total_answered,
            stats.accuracy_percentage
        );

        SessionSummary {
            stats,
            answers,
            original_count,
            update_successful,
            ended_early: early,
            cards_remaining,
        }
    }

    fn write_back(&self) -> Result<()> {
        let state = self.session.state().ok_or(TrainerError::NoActiveSession)?;
        if state.cards.is_empty() {
            return Err(TrainerError::NoActiveSession);
        }
        log::info!("Writing back {} cards to '{}'", state.cards.len(), state.active_tab);
        self.store.write_cards(&state.active_tab, &state.store_id, &state.cards)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn has_active_session(&self) -> bool {
        self.session.has_active_session()
    }

    pub fn is_reviewing_incorrect(&self) -> bool {
        self.session.get(SessionKey::ReviewingIncorrect).unwrap_or(false)
    }

    /// Snapshot indices missed on the first pass. Entries pointing outside
    /// the snapshot are dropped with a warning.
    pub fn incorrect_indices(&self) -> Vec<usize> {
        let total = self.session.total_cards();
        let mut queued: Vec<usize> = self.session.get(SessionKey::IncorrectCards).unwrap_or_default();
        let before = queued.len();
        queued.retain(|&i| i < total);
        if queued.len() != before {
            log::warn!("Dropped {} out-of-range review entries", before - queued.len());
        }
        queued
    }

    pub fn answers(&self) -> Vec<AnswerRecord> {
        self.session.get(SessionKey::Answers).unwrap_or_default()
    }
}
