use chrono::{DateTime, Utc};
use rand::Rng;

use crate::training_engine::{
    level::IntervalTable,
    models::{Card, CardSet},
};

impl CardSet {
    pub fn new(name: impl Into<String>, gid: i64, cards: Vec<Card>) -> Self {
        Self {
            name: name.into(),
            gid,
            cards,
        }
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Mean level across the set; 0.0 when empty.
    pub fn average_level(&self) -> f64 {
        if self.cards.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.cards.iter().map(|c| u32::from(c.level.value())).sum();
        f64::from(sum) / self.cards.len() as f64
    }

    /// Cards whose review date has passed.
    ///
    /// With `ignore_unshown`, cards that were never shown are left out even
    /// though they are always due.
    pub fn cards_to_review(
        &self,
        ignore_unshown: bool,
        intervals: &IntervalTable,
        now: DateTime<Utc>,
    ) -> Vec<Card> {
        self.cards
            .iter()
            .filter(|c| c.is_delayed(intervals, now))
            .filter(|c| !(ignore_unshown && c.is_unshown()))
            .cloned()
            .collect()
    }

    /// Pick the most overdue due cards, then shuffle them.
    ///
    /// Selection happens before the shuffle: the chosen set is always the
    /// `limit` most overdue cards, only their order is random.
    pub fn get_cards_to_review<R: Rng>(
        &self,
        limit: Option<usize>,
        ignore_unshown: bool,
        intervals: &IntervalTable,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<Card> {
        let mut due = self.cards_to_review(ignore_unshown, intervals, now);
        due.sort_by_key(|c| c.seconds_to_next_review(intervals, now));
        if let Some(limit) = limit {
            due.truncate(limit);
        }
        shuffle(&mut due, rng);
        due
    }
}

/// Fisher-Yates.
fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training_engine::level::Level;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000)
    }

    /// Level-1 card (2 day interval) overdue by `overdue_secs`.
    fn overdue(id: i64, overdue_secs: i64) -> Card {
        let mut card = Card::new(id, format!("w{id}"), format!("t{id}"));
        card.level = Level::from_value(1).unwrap();
        card.cnt_shown = 1;
        card.last_shown = now() - Duration::days(2) - Duration::seconds(overdue_secs);
        card
    }

    fn ids(cards: &[Card]) -> HashSet<i64> {
        cards.iter().map(|c| c.id).collect()
    }

    #[test]
    fn huge_interval_saturates_instead_of_overflowing() {
        let table = IntervalTable::new([0, 2, 5, 9, 15, 25, 40, 100_000_000]);
        let mut card = overdue(1, 10);
        card.level = Level::MAX;
        assert_eq!(card.next_review(&table), DateTime::<Utc>::MAX_UTC);
        assert!(!card.is_delayed(&table, now()));
        assert!(card.seconds_to_next_review(&table, now()) > 0);

        let set = CardSet::new("Sheet1", 0, vec![card, overdue(2, 10)]);
        let mut rng = StdRng::seed_from_u64(1);
        let due = set.get_cards_to_review(None, false, &table, now(), &mut rng);
        assert_eq!(ids(&due), HashSet::from([2]));
    }

    #[test]
    fn never_shown_cards_are_due_unless_ignored() {
        let set = CardSet::new("Sheet1", 0, vec![Card::new(1, "a", "b"), overdue(2, 10)]);
        let table = IntervalTable::default();
        assert_eq!(ids(&set.cards_to_review(false, &table, now())), HashSet::from([1, 2]));
        assert_eq!(ids(&set.cards_to_review(true, &table, now())), HashSet::from([2]));
    }

    #[test]
    fn cards_not_yet_due_are_excluded() {
        let mut fresh = overdue(3, 0);
        fresh.last_shown = now() - Duration::hours(1);
        let set = CardSet::new("Sheet1", 0, vec![fresh, overdue(4, 60)]);
        let due = set.cards_to_review(false, &IntervalTable::default(), now());
        assert_eq!(ids(&due), HashSet::from([4]));
    }

    #[test]
    fn limit_keeps_most_overdue_for_every_seed() {
        let set = CardSet::new(
            "Sheet1",
            0,
            vec![overdue(1, 10), overdue(2, 500), overdue(3, 100), overdue(4, 5), overdue(5, 300)],
        );
        let table = IntervalTable::default();
        for seed in 0..50u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = set.get_cards_to_review(Some(3), false, &table, now(), &mut rng);
            assert_eq!(ids(&picked), HashSet::from([2, 5, 3]), "seed={seed}");
        }
    }

    #[test]
    fn shuffle_varies_presentation_order() {
        let set = CardSet::new("Sheet1", 0, (1..=8).map(|i| overdue(i, i * 10)).collect());
        let table = IntervalTable::default();
        let orders: HashSet<Vec<i64>> = (0..20u64)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                set.get_cards_to_review(None, false, &table, now(), &mut rng)
                    .iter()
                    .map(|c| c.id)
                    .collect()
            })
            .collect();
        assert!(orders.len() > 1, "shuffle never changed the order");
        assert!(orders.iter().all(|o| o.len() == 8));
    }

    #[test]
    fn average_level_of_empty_set_is_zero() {
        let empty = CardSet::new("Empty", 1, Vec::new());
        assert_eq!(empty.card_count(), 0);
        assert_eq!(empty.average_level(), 0.0);

        let mut a = Card::new(1, "a", "b");
        a.level = Level::from_value(2).unwrap();
        let mut b = Card::new(2, "c", "d");
        b.level = Level::from_value(5).unwrap();
        let set = CardSet::new("Two", 1, vec![a, b]);
        assert_eq!(set.average_level(), 3.5);
    }
}
