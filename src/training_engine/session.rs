//! Per-session state, kept in an injected [`SessionStore`].
//!
//! Keys are namespaced by mode (`learning.*`, `review.*`) so ending one mode
//! never disturbs the other. Values are stored as JSON so any store that can
//! hold `serde_json::Value` (cookie session, Redis, a map) works.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::training_engine::{error::Result, models::Card};

/// Key/value holder for session state, keyed by an opaque session id.
pub trait SessionStore {
    fn get(&self, session_id: &str, key: &str) -> Option<Value>;
    fn set(&self, session_id: &str, key: &str, value: Value);
    fn remove(&self, session_id: &str, key: &str);
    /// Drop every key starting with `"{namespace}."`.
    fn clear_namespace(&self, session_id: &str, namespace: &str);
}

/// Process-local session store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, HashMap<String, Value>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently held for a session, sorted.
    pub fn keys(&self, session_id: &str) -> Vec<String> {
        let Ok(map) = self.sessions.lock() else {
            return Vec::new();
        };
        let mut keys: Vec<String> = map
            .get(session_id)
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str, key: &str) -> Option<Value> {
        let map = self.sessions.lock().ok()?;
        map.get(session_id)?.get(key).cloned()
    }

    fn set(&self, session_id: &str, key: &str, value: Value) {
        match self.sessions.lock() {
            Ok(mut map) => {
                map.entry(session_id.to_string())
                    .or_default()
                    .insert(key.to_string(), value);
            }
            Err(_) => log::error!("Session store lock poisoned; dropping write to {key}"),
        }
    }

    fn remove(&self, session_id: &str, key: &str) {
        if let Ok(mut map) = self.sessions.lock() {
            if let Some(session) = map.get_mut(session_id) {
                session.remove(key);
            }
        }
    }

    fn clear_namespace(&self, session_id: &str, namespace: &str) {
        let prefix = format!("{namespace}.");
        if let Ok(mut map) = self.sessions.lock() {
            if let Some(session) = map.get_mut(session_id) {
                session.retain(|k, _| !k.starts_with(&prefix));
                if session.is_empty() {
                    map.remove(session_id);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Learn,
    Review,
}

impl SessionMode {
    pub fn namespace(self) -> &'static str {
        match self {
            SessionMode::Learn  => "learning",
            SessionMode::Review => "review",
        }
    }
}

/// Fields of a session. Learn-only fields are ignored by review sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKey {
    Cards,
    CurrentIndex,
    ActiveTab,
    SheetGid,
    StoreId,
    Answers,
    IncorrectCards,
    ReviewingIncorrect,
    OriginalCount,
    LastLevelChange,
}

impl SessionKey {
    fn field(self) -> &'static str {
        match self {
            SessionKey::Cards              => "cards",
            SessionKey::CurrentIndex       => "current_index",
            SessionKey::ActiveTab          => "active_tab",
            SessionKey::SheetGid           => "sheet_gid",
            SessionKey::StoreId            => "store_id",
            SessionKey::Answers            => "answers",
            SessionKey::IncorrectCards     => "incorrect_cards",
            SessionKey::ReviewingIncorrect => "reviewing_incorrect",
            SessionKey::OriginalCount      => "original_count",
            SessionKey::LastLevelChange    => "last_level_change",
        }
    }

    pub fn qualified(self, mode: SessionMode) -> String {
        format!("{}.{}", mode.namespace(), self.field())
    }
}

// ---------------------------------------------------------------------------
// Typed access
// ---------------------------------------------------------------------------

/// Snapshot of the fields shared by both modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub cards: Vec<Card>,
    pub current_index: usize,
    pub active_tab: String,
    pub sheet_gid: i64,
    pub store_id: String,
}

/// Typed view of one mode's keys for one session id.
#[derive(Debug, Clone)]
pub struct CardSession<S> {
    store: S,
    session_id: String,
    mode: SessionMode,
}

impl<S: SessionStore> CardSession<S> {
    pub fn new(store: S, session_id: impl Into<String>, mode: SessionMode) -> Self {
        Self {
            store,
            session_id: session_id.into(),
            mode,
        }
    }

    /// Read and decode a field. Undecodable values are treated as missing.
    pub fn get<T: DeserializeOwned>(&self, key: SessionKey) -> Option<T> {
        let qualified = key.qualified(self.mode);
        let raw = self.store.get(&self.session_id, &qualified)?;
        match serde_json::from_value(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding unreadable session value {qualified}: {e}");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: SessionKey, value: &T) -> Result<()> {
        let raw = serde_json::to_value(value)?;
        self.store.set(&self.session_id, &key.qualified(self.mode), raw);
        Ok(())
    }

    pub fn remove(&self, key: SessionKey) {
        self.store.remove(&self.session_id, &key.qualified(self.mode));
    }

    /// Stage a fresh snapshot with the cursor at 0.
    pub fn initialize(&self, cards: &[Card], tab_name: &str, gid: i64, store_id: &str) -> Result<()> {
        self.clear();
        self.set(SessionKey::Cards, &cards)?;
        self.set(SessionKey::CurrentIndex, &0usize)?;
        self.set(SessionKey::ActiveTab, &tab_name)?;
        self.set(SessionKey::SheetGid, &gid)?;
        self.set(SessionKey::StoreId, &store_id)?;
        log::info!(
            "Session initialized: {} cards, tab={tab_name}, mode={}",
            cards.len(),
            self.mode.namespace()
        );
        Ok(())
    }

    pub fn has_active_session(&self) -> bool {
        self.state().is_some()
    }

    /// `None` unless both the cards and the cursor are present.
    pub fn state(&self) -> Option<SessionState> {
        let cards = self.get(SessionKey::Cards)?;
        let current_index = self.get(SessionKey::CurrentIndex)?;
        Some(SessionState {
            cards,
            current_index,
            active_tab: self.get(SessionKey::ActiveTab).unwrap_or_else(|| "Sheet1".to_string()),
            sheet_gid: self.get(SessionKey::SheetGid).unwrap_or(0),
            store_id: self.get(SessionKey::StoreId).unwrap_or_default(),
        })
    }

    pub fn current_index(&self) -> usize {
        self.get(SessionKey::CurrentIndex).unwrap_or(0)
    }

    pub fn set_index(&self, index: usize) -> Result<()> {
        self.set(SessionKey::CurrentIndex, &index)
    }

    pub fn total_cards(&self) -> usize {
        self.all_cards().len()
    }

    pub fn all_cards(&self) -> Vec<Card> {
        self.get(SessionKey::Cards).unwrap_or_default()
    }

    /// Replace the snapshot entry at `index`; out-of-range indexes are ignored.
    pub fn update_card(&self, index: usize, card: &Card) -> Result<()> {
        let mut cards = self.all_cards();
        match cards.get_mut(index) {
            Some(slot) => {
                *slot = card.clone();
                self.set(SessionKey::Cards, &cards)
            }
            None => {
                log::warn!("Ignoring update for card index {index} of {}", cards.len());
                Ok(())
            }
        }
    }

    pub fn clear(&self) {
        self.store.clear_namespace(&self.session_id, self.mode.namespace());
        log::debug!("Cleared {} session", self.mode.namespace());
    }
}
