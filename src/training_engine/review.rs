//! Review mode: unscored, circular browsing over a whole card set.

use std::fmt;
use std::str::FromStr;

use crate::training_engine::{
    error::{Result, TrainerError},
    models::{CardContext, SessionStart},
    session::{CardSession, SessionMode, SessionStore},
    store::CardStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "next" => Ok(Direction::Next),
            "prev" => Ok(Direction::Prev),
            other  => Err(format!("Invalid navigation direction: {other}")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => f.pad("next"),
            Direction::Prev => f.pad("prev"),
        }
    }
}

/// Step a cursor around a ring of `total` slots.
pub fn wrap_index(current: usize, total: usize, direction: Direction) -> usize {
    let current = current % total;
    match direction {
        Direction::Next => (current + 1) % total,
        Direction::Prev => (current + total - 1) % total,
    }
}

pub struct ReviewBrowser<S, C> {
    session: CardSession<S>,
    store: C,
}

impl<S: SessionStore, C: CardStore> ReviewBrowser<S, C> {
    pub fn new(sessions: S, session_id: impl Into<String>, store: C) -> Self {
        Self {
            session: CardSession::new(sessions, session_id, SessionMode::Review),
            store,
        }
    }

    /// Stage every card of the tab in stored order.
    pub fn start_session(&self, tab_name: &str, store_id: &str) -> SessionStart {
        match self.try_start(tab_name, store_id) {
            Ok(count) => SessionStart::started(count),
            Err(e) => {
                log::warn!("Could not start review session on '{tab_name}': {e}");
                SessionStart::failed(e)
            }
        }
    }

    fn try_start(&self, tab_name: &str, store_id: &str) -> Result<usize> {
        let card_set = self
            .store
            .read_card_set(tab_name, store_id)?
            .ok_or_else(|| TrainerError::CardSetNotFound(tab_name.to_string()))?;
        if card_set.cards.is_empty() {
            return Err(TrainerError::EmptyCardSet(tab_name.to_string()));
        }
        self.session.initialize(&card_set.cards, tab_name, card_set.gid, store_id)?;
        log::info!("Review session started: {} cards from '{tab_name}'", card_set.card_count());
        Ok(card_set.card_count())
    }

    /// The card under the cursor. A cursor past the end is reset to 0.
    pub fn get_current_card_context(&self) -> Option<CardContext> {
        let state = self.session.state()?;
        let mut index = state.current_index;
        if index >= state.cards.len() {
            log::warn!("Review index {index} out of bounds, resetting to 0");
            if let Err(e) = self.session.set_index(0) {
                log::warn!("Could not reset review cursor: {e}");
            }
            index = 0;
        }
        let total = state.cards.len();
        let card = state.cards.into_iter().nth(index)?;
        Some(CardContext {
            card,
            index,
            total,
            is_review: false,
            active_tab: state.active_tab,
            sheet_gid: state.sheet_gid,
        })
    }

    /// Move the cursor, wrapping at both ends. `false` without a session.
    pub fn navigate(&self, direction: Direction) -> bool {
        let Some(state) = self.session.state() else {
            return false;
        };
        let total = state.cards.len();
        if total == 0 {
            return false;
        }
        let next = wrap_index(state.current_index, total, direction);
        if let Err(e) = self.session.set_index(next) {
            log::warn!("Could not move review cursor: {e}");
            return false;
        }
        log::debug!("Review navigation: {} -> {next} ({direction})", state.current_index);
        true
    }

    /// [`navigate`](Self::navigate) from a raw `"next"` / `"prev"` string.
    pub fn navigate_str(&self, direction: &str) -> bool {
        match direction.parse() {
            Ok(direction) => self.navigate(direction),
            Err(e) => {
                log::error!("{e}");
                false
            }
        }
    }

    pub fn has_active_session(&self) -> bool {
        self.session.has_active_session()
    }

    pub fn end_session(&self) {
        self.session.clear();
        log::info!("Review session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training_engine::{
        models::Card,
        session::InMemorySessionStore,
        store::SheetCardStore,
    };

    fn browser(count: i64) -> (InMemorySessionStore, ReviewBrowser<InMemorySessionStore, SheetCardStore>) {
        let sessions = InMemorySessionStore::new();
        let store = SheetCardStore::new();
        let cards: Vec<Card> = (1..=count).map(|i| Card::new(i, format!("w{i}"), format!("t{i}"))).collect();
        store.insert_cards("book", "Tab", 3, &cards).unwrap();
        (sessions.clone(), ReviewBrowser::new(sessions, "user-1", store))
    }

    #[test]
    fn wrap_index_is_circular() {
        assert_eq!(wrap_index(4, 5, Direction::Next), 0);
        assert_eq!(wrap_index(0, 5, Direction::Prev), 4);
        assert_eq!(wrap_index(2, 5, Direction::Next), 3);
        assert_eq!(wrap_index(0, 1, Direction::Prev), 0);
    }

    #[test]
    fn stages_all_cards_in_order() {
        let (_, b) = browser(4);
        assert_eq!(b.start_session("Tab", "book"), SessionStart::started(4));
        let ctx = b.get_current_card_context().unwrap();
        assert_eq!((ctx.card.id, ctx.index, ctx.total, ctx.sheet_gid), (1, 0, 4, 3));
        assert!(!ctx.is_review);
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let (_, b) = browser(3);
        b.start_session("Tab", "book");
        assert!(b.navigate(Direction::Prev));
        assert_eq!(b.get_current_card_context().unwrap().index, 2);
        assert!(b.navigate(Direction::Next));
        assert_eq!(b.get_current_card_context().unwrap().index, 0);
        assert!(b.navigate_str("next"));
        assert_eq!(b.get_current_card_context().unwrap().card.id, 2);
    }

    #[test]
    fn bad_direction_and_missing_session_are_rejected() {
        let (_, b) = browser(2);
        assert!(!b.navigate(Direction::Next));
        b.start_session("Tab", "book");
        assert!(!b.navigate_str("sideways"));
        assert_eq!(b.get_current_card_context().unwrap().index, 0);
    }

    #[test]
    fn out_of_range_cursor_resets_to_zero() {
        let (sessions, b) = browser(2);
        b.start_session("Tab", "book");
        sessions.set("user-1", "review.current_index", serde_json::json!(17));
        assert_eq!(b.get_current_card_context().unwrap().index, 0);
        assert!(b.navigate(Direction::Next));
        assert_eq!(b.get_current_card_context().unwrap().index, 1);
    }

    #[test]
    fn empty_or_missing_tab_fails_to_start() {
        let (_, b) = browser(0);
        let start = b.start_session("Tab", "book");
        assert_eq!(start.error.as_deref(), Some("No cards in card set 'Tab'"));
        assert!(!b.start_session("Other", "book").success);
        assert!(!b.has_active_session());
    }

    #[test]
    fn end_session_clears_state() {
        let (_, b) = browser(2);
        b.start_session("Tab", "book");
        assert!(b.has_active_session());
        b.end_session();
        assert!(!b.has_active_session());
        assert!(b.get_current_card_context().is_none());
    }
}
