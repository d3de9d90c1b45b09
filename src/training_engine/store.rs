//! The external card store and its row format.
//!
//! A tab is a header row followed by one row per card:
//!
//! | col | field |
//! |-----|-------|
//! | 0 | `id` |
//! | 1–5 | `word`, `translation`, `equivalent`, `example`, `example_translation` |
//! | 6–9 | `cnt_shown`, `cnt_corr_answers`, `level`, `last_shown` |
//!
//! Columns 6–9 are the only ones ever written back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::training_engine::{
    error::StoreError,
    level::Level,
    models::{Card, CardSet, NEVER_SHOWN},
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const HEADER: [&str; 10] = [
    "id",
    "word",
    "translation",
    "equivalent",
    "example",
    "example_translation",
    "cnt_shown",
    "cnt_corr_answers",
    "level",
    "last_shown",
];

const DYNAMIC_COLUMNS: std::ops::RangeInclusive<usize> = 6..=9;

/// Backend that owns the card rows.
pub trait CardStore {
    /// `Ok(None)` when the tab does not exist.
    fn read_card_set(&self, tab_name: &str, store_id: &str) -> Result<Option<CardSet>, StoreError>;

    /// Overwrite `cnt_shown`, `cnt_corr_answers`, `level` and `last_shown` of
    /// the rows whose id matches. Content columns are left alone; repeating the
    /// call is harmless.
    fn write_cards(&self, tab_name: &str, store_id: &str, cards: &[Card]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Row codec
// ---------------------------------------------------------------------------

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Empty or unreadable timestamps mean "never shown".
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    let raw = raw.trim();
    if raw.is_empty() {
        return NEVER_SHOWN;
    }
    match NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        Ok(naive) => naive.and_utc(),
        Err(_) => NEVER_SHOWN,
    }
}

/// Blank rows (fewer than 5 cells or no id) carry no card.
pub fn is_blank_row(row: &[String]) -> bool {
    row.len() < 5 || row[0].trim().is_empty()
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn parse_count(row: &[String], idx: usize, row_no: usize) -> Result<u32, StoreError> {
    let raw = cell(row, idx).trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse().map_err(|_| StoreError::MalformedRow {
        row: row_no,
        reason: format!("{} is not a count: '{raw}'", HEADER[idx]),
    })
}

/// Decode one data row. `row_no` is only used in error messages.
pub fn parse_row(row: &[String], row_no: usize) -> Result<Card, StoreError> {
    let id_raw = cell(row, 0).trim();
    let id = id_raw.parse().map_err(|_| StoreError::MalformedRow {
        row: row_no,
        reason: format!("id is not an integer: '{id_raw}'"),
    })?;

    let level_raw = cell(row, 8).trim();
    let level = if level_raw.is_empty() {
        Level::MIN
    } else {
        level_raw
            .parse::<u8>()
            .ok()
            .and_then(Level::from_value)
            .ok_or_else(|| StoreError::MalformedRow {
                row: row_no,
                reason: format!("level is not in 0..=7: '{level_raw}'"),
            })?
    };

    Ok(Card {
        id,
        word: cell(row, 1).to_string(),
        translation: cell(row, 2).to_string(),
        equivalent: cell(row, 3).to_string(),
        example: cell(row, 4).to_string(),
        example_translation: cell(row, 5).to_string(),
        cnt_shown: parse_count(row, 6, row_no)?,
        cnt_corr_answers: parse_count(row, 7, row_no)?,
        level,
        last_shown: parse_timestamp(cell(row, 9)),
    })
}

/// Decode every data row after the header. Blank rows are skipped quietly,
/// malformed ones with a warning; neither fails the read.
pub fn parse_rows(rows: &[Vec<String>]) -> Vec<Card> {
    let mut cards = Vec::new();
    for (i, row) in rows.iter().enumerate().skip(1) {
        if is_blank_row(row) {
            continue;
        }
        match parse_row(row, i + 1) {
            Ok(card) => cards.push(card),
            Err(e) => log::warn!("Skipping row: {e}"),
        }
    }
    cards
}

pub fn card_to_row(card: &Card) -> Vec<String> {
    vec![
        card.id.to_string(),
        card.word.clone(),
        card.translation.clone(),
        card.equivalent.clone(),
        card.example.clone(),
        card.example_translation.clone(),
        card.cnt_shown.to_string(),
        card.cnt_corr_answers.to_string(),
        card.level.value().to_string(),
        format_timestamp(card.last_shown),
    ]
}

fn dynamic_cells(card: &Card) -> [String; 4] {
    [
        card.cnt_shown.to_string(),
        card.cnt_corr_answers.to_string(),
        card.level.value().to_string(),
        format_timestamp(card.last_shown),
    ]
}

// ---------------------------------------------------------------------------
// In-memory sheet store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct Sheet {
    gid: i64,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct SheetBook {
    /// (store_id, tab) -> sheet
    sheets: HashMap<(String, String), Sheet>,
    fail_writes: bool,
}

/// Card store that keeps tabs as rows of strings, spreadsheet style.
/// Clones share the same underlying sheets.
#[derive(Debug, Clone, Default)]
pub struct SheetCardStore {
    inner: Arc<Mutex<SheetBook>>,
}

impl SheetCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn book(&self) -> Result<MutexGuard<'_, SheetBook>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("sheet lock poisoned".into()))
    }

    /// Replace a tab with raw rows; the first row is the header.
    pub fn insert_rows(&self, store_id: &str, tab: &str, gid: i64, rows: Vec<Vec<String>>) -> Result<(), StoreError> {
        self.book()?
            .sheets
            .insert((store_id.to_string(), tab.to_string()), Sheet { gid, rows });
        Ok(())
    }

    /// Replace a tab with the given cards under the standard header.
    pub fn insert_cards(&self, store_id: &str, tab: &str, gid: i64, cards: &[Card]) -> Result<(), StoreError> {
        let mut rows = vec![HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
        rows.extend(cards.iter().map(card_to_row));
        self.insert_rows(store_id, tab, gid, rows)
    }

    /// Raw rows of a tab, header included.
    pub fn rows(&self, store_id: &str, tab: &str) -> Result<Vec<Vec<String>>, StoreError> {
        self.book()?
            .sheets
            .get(&(store_id.to_string(), tab.to_string()))
            .map(|s| s.rows.clone())
            .ok_or_else(|| StoreError::TabNotFound { store_id: store_id.into(), tab: tab.into() })
    }

    /// Make every following `write_cards` fail, to simulate an outage.
    pub fn set_fail_writes(&self, fail: bool) -> Result<(), StoreError> {
        self.book()?.fail_writes = fail;
        Ok(())
    }
}

impl CardStore for SheetCardStore {
    fn read_card_set(&self, tab_name: &str, store_id: &str) -> Result<Option<CardSet>, StoreError> {
        let book = self.book()?;
        let Some(sheet) = book.sheets.get(&(store_id.to_string(), tab_name.to_string())) else {
            return Ok(None);
        };
        let cards = parse_rows(&sheet.rows);
        log::debug!("Read {} cards from '{tab_name}'", cards.len());
        Ok(Some(CardSet::new(tab_name, sheet.gid, cards)))
    }

    fn write_cards(&self, tab_name: &str, store_id: &str, cards: &[Card]) -> Result<(), StoreError> {
        let mut book = self.book()?;
        if book.fail_writes {
            return Err(StoreError::Unavailable("writes are disabled".into()));
        }
        let sheet = book
            .sheets
            .get_mut(&(store_id.to_string(), tab_name.to_string()))
            .ok_or_else(|| StoreError::TabNotFound { store_id: store_id.into(), tab: tab_name.into() })?;

        let updates: HashMap<i64, &Card> = cards.iter().map(|c| (c.id, c)).collect();
        let mut updated = 0usize;
        for row in sheet.rows.iter_mut().skip(1) {
            if is_blank_row(row) {
                continue;
            }
            let Ok(id) = row[0].trim().parse::<i64>() else {
                continue;
            };
            let Some(card) = updates.get(&id) else {
                continue;
            };
            if row.len() < HEADER.len() {
                row.resize(HEADER.len(), String::new());
            }
            for (col, value) in DYNAMIC_COLUMNS.zip(dynamic_cells(card)) {
                row[col] = value;
            }
            updated += 1;
        }
        log::info!("Wrote statistics for {updated}/{} cards to '{tab_name}'", cards.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn header() -> Vec<String> {
        HEADER.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn parses_full_and_short_rows() {
        let full = row(&["4", "gato", "cat", "", "el gato", "the cat", "3", "2", "2", "2024-03-01 10:00:00"]);
        let card = parse_row(&full, 2).unwrap();
        assert_eq!(card.id, 4);
        assert_eq!(card.level.value(), 2);
        assert_eq!((card.cnt_shown, card.cnt_corr_answers), (3, 2));
        assert_eq!(format_timestamp(card.last_shown), "2024-03-01 10:00:00");

        let short = row(&["5", "perro", "dog", "", ""]);
        let card = parse_row(&short, 3).unwrap();
        assert_eq!(card.level, Level::MIN);
        assert_eq!(card.cnt_shown, 0);
        assert_eq!(card.last_shown, NEVER_SHOWN);
    }

    #[test]
    fn bad_timestamp_means_never_shown() {
        assert_eq!(parse_timestamp("yesterday"), NEVER_SHOWN);
        assert_eq!(parse_timestamp("  "), NEVER_SHOWN);
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let rows = vec![
            header(),
            row(&["1", "uno", "one", "", ""]),
            row(&["x", "dos", "two", "", ""]),
            row(&["3", "tres", "three", "", "", "", "many", "0", "0", ""]),
            row(&["4", "cuatro", "four", "", "", "", "1", "0", "12", ""]),
            row(&["", "", "", "", ""]),
            row(&["6", "seis"]),
            row(&["7", "siete", "seven", "", ""]),
        ];
        let ids: Vec<i64> = parse_rows(&rows).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 7]);
    }

    #[test]
    fn write_back_touches_only_dynamic_columns() {
        let store = SheetCardStore::new();
        let rows = vec![
            header(),
            row(&["1", "uno", "one", "eins", "ex1", "tr1", "0", "0", "0", ""]),
            row(&["2", "dos", "two"]),
            row(&["3", "tres", "three", "", "", "", "4", "4", "3", "2024-01-01 00:00:00"]),
        ];
        store.insert_rows("book", "Spanish", 11, rows).unwrap();

        let set = store.read_card_set("Spanish", "book").unwrap().unwrap();
        assert_eq!(set.gid, 11);
        let mut card = set.cards.into_iter().find(|c| c.id == 1).unwrap();
        card.word = "CHANGED".into();
        card.cnt_shown = 1;
        card.cnt_corr_answers = 1;
        card.level = card.level.next_level();
        card.last_shown = NEVER_SHOWN + Duration::days(19_000);

        store.write_cards("Spanish", "book", &[card.clone()]).unwrap();
        store.write_cards("Spanish", "book", &[card]).unwrap();

        let after = store.rows("book", "Spanish").unwrap();
        assert_eq!(after[1][1], "uno");
        assert_eq!(after[1][3], "eins");
        assert_eq!(&after[1][6..], &["1", "1", "1", "2022-01-08 00:00:00"]);
        assert_eq!(after[2], row(&["2", "dos", "two"]));
        assert_eq!(after[3][6..], ["4", "4", "3", "2024-01-01 00:00:00"]);
    }

    #[test]
    fn missing_tab_reads_as_none_and_write_fails() {
        let store = SheetCardStore::new();
        assert!(store.read_card_set("Nope", "book").unwrap().is_none());
        let err = store.write_cards("Nope", "book", &[]).unwrap_err();
        assert!(matches!(err, StoreError::TabNotFound { .. }));
    }

    #[test]
    fn failing_writes_can_be_simulated() {
        let store = SheetCardStore::new();
        store.insert_cards("book", "Tab", 1, &[Card::new(1, "a", "b")]).unwrap();
        store.set_fail_writes(true).unwrap();
        assert!(matches!(
            store.write_cards("Tab", "book", &[Card::new(1, "a", "b")]),
            Err(StoreError::Unavailable(_))
        ));
    }
}
