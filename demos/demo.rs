//! End-to-end demo of a learn session and a browse session.
//!
//! Run with: `RUST_LOG=info cargo run --example demo`
//!
//! 1. **Learn**: five cards with different due dates; the three most overdue
//!    are staged (limit 3), one is answered wrong, reviewed once, and the
//!    results are written back to the in-memory sheet.
//! 2. **Browse**: flip through every card with wrap-around navigation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use vocab_drill::{
    Card, CardStore, Direction, InMemorySessionStore, LearnSession, Level, ReviewBrowser,
    SheetCardStore, TrainerConfig,
};

const BOOK: &str = "demo-book";
const TAB: &str = "Portuguese";

fn seed_cards() -> Vec<Card> {
    let words = [
        ("obrigado", "thank you", 3, 20),
        ("saudade", "longing", 1, 4),
        ("janela", "window", 2, 9),
        ("cachorro", "dog", 0, 0),
        ("amanhã", "tomorrow", 5, 2),
    ];
    words
        .iter()
        .enumerate()
        .map(|(i, &(word, translation, level, days_ago))| {
            let mut card = Card::new(i as i64 + 1, word, translation);
            if days_ago > 0 {
                card.level = Level::from_value(level).unwrap_or(Level::MIN);
                card.cnt_shown = u32::from(level) + 1;
                card.cnt_corr_answers = u32::from(level);
                card.last_shown = Utc::now() - Duration::days(days_ago);
            }
            card
        })
        .collect()
}

fn main() {
    env_logger::init();

    let store = SheetCardStore::new();
    if let Err(e) = store.insert_cards(BOOK, TAB, 1, &seed_cards()) {
        eprintln!("could not seed store: {e}");
        return;
    }
    let sessions = InMemorySessionStore::new();
    let config = Arc::new(TrainerConfig {
        max_cards_per_session: 3,
        shuffle_seed: Some(7),
        ..TrainerConfig::default()
    });

    // ── learn ────────────────────────────────────────────────────────────────
    let mut learn = LearnSession::new(sessions.clone(), "demo-user", store.clone(), config);
    let start = learn.start_session(TAB, BOOK);
    println!("Learn session: {start:?}");

    let mut first = true;
    while let Some(ctx) = learn.get_current_card_context() {
        // Miss the very first card so the review pass kicks in.
        let reply = if first { "no idea".to_string() } else { ctx.card.word.clone() };
        first = false;
        let outcome = learn.process_answer(&reply);
        let pass = if ctx.is_review { "review" } else { "first" };
        match outcome.level_change {
            Some(change) => println!(
                "  [{pass} {}/{}] {} -> '{}' {} ({} -> {})",
                ctx.index + 1,
                ctx.total,
                ctx.card.translation,
                reply,
                if change.is_correct { "correct" } else { "wrong" },
                change.from,
                change.to
            ),
            None => println!("  error: {:?}", outcome.error),
        }
    }

    let summary = learn.end_session(false);
    println!(
        "Done: {}/{} correct ({}%), {} reviews, written back: {}",
        summary.stats.correct_answers,
        summary.stats.total_answered,
        summary.stats.accuracy_percentage,
        summary.stats.review_count,
        summary.update_successful
    );

    if let Ok(Some(set)) = store.read_card_set(TAB, BOOK) {
        println!("Card set '{}' now averages level {:.2}", set.name, set.average_level());
        for card in &set.cards {
            println!("  {card}  shown={} correct={}", card.cnt_shown, card.cnt_corr_answers);
        }
    }

    // ── browse ───────────────────────────────────────────────────────────────
    let browse = ReviewBrowser::new(sessions, "demo-user", store);
    println!("Browse session: {:?}", browse.start_session(TAB, BOOK));
    for direction in [Direction::Prev, Direction::Prev, Direction::Next] {
        browse.navigate(direction);
        if let Some(ctx) = browse.get_current_card_context() {
            println!("  {direction:>4}: [{}/{}] {}", ctx.index + 1, ctx.total, ctx.card.word);
        }
    }
    browse.end_session();
}
