use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::training_engine::{
    error::{Result, TrainerError},
    level::IntervalTable,
};

/// What a correct answer during the review pass does to the card's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPassPolicy {
    /// Raise the level, same as a correct first attempt.
    Promote,
    /// Count the answer but keep the level; only first attempts promote.
    Hold,
}

pub const DEFAULT_REVIEW_PASS_POLICY: ReviewPassPolicy = ReviewPassPolicy::Promote;

impl Default for ReviewPassPolicy {
    fn default() -> Self {
        DEFAULT_REVIEW_PASS_POLICY
    }
}

/// Process-wide trainer settings. Load once at startup and share via `Arc`.
///
/// ```toml
/// max_cards_per_session = 15
/// intervals = [0, 1, 3, 7, 14, 30, 60, 120]
/// review_pass_policy = "hold"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub max_cards_per_session: usize,
    pub intervals: IntervalTable,
    pub review_pass_policy: ReviewPassPolicy,
    /// Fixes the presentation shuffle; `None` seeds from entropy.
    pub shuffle_seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_cards_per_session: 10,
            intervals: IntervalTable::default(),
            review_pass_policy: DEFAULT_REVIEW_PASS_POLICY,
            shuffle_seed: None,
        }
    }
}

impl TrainerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: TrainerConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        log::info!("Loaded trainer config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_cards_per_session == 0 {
            return Err(TrainerError::InvalidConfig(
                "max_cards_per_session must be at least 1".into(),
            ));
        }
        if !self.intervals.is_monotonic() {
            return Err(TrainerError::InvalidConfig(format!(
                "review intervals must not decrease with level: {:?}",
                self.intervals.days()
            )));
        }
        Ok(())
    }

    /// Whether a correct answer in the given pass raises the level.
    pub fn promotes(&self, is_review: bool) -> bool {
        !is_review || self.review_pass_policy == ReviewPassPolicy::Promote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training_engine::level::Level;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = TrainerConfig::from_toml_str("").unwrap();
        assert_eq!(config, TrainerConfig::default());
        assert_eq!(config.max_cards_per_session, 10);
        assert_eq!(config.review_pass_policy, ReviewPassPolicy::Promote);
    }

    #[test]
    fn toml_overrides_fields() {
        let config = TrainerConfig::from_toml_str(
            "max_cards_per_session = 3\n\
             intervals = [0, 1, 3, 7, 14, 30, 60, 120]\n\
             review_pass_policy = \"hold\"\n\
             shuffle_seed = 9\n",
        )
        .unwrap();
        assert_eq!(config.max_cards_per_session, 3);
        assert_eq!(config.intervals.interval_days(Level::MAX), 120);
        assert_eq!(config.review_pass_policy, ReviewPassPolicy::Hold);
        assert_eq!(config.shuffle_seed, Some(9));
        assert!(config.promotes(false));
        assert!(!config.promotes(true));
    }

    #[test]
    fn rejects_decreasing_intervals_and_zero_limit() {
        let err = TrainerConfig::from_toml_str("intervals = [0, 9, 5, 9, 15, 25, 40, 60]").unwrap_err();
        assert!(matches!(err, TrainerError::InvalidConfig(_)));
        let err = TrainerConfig::from_toml_str("max_cards_per_session = 0").unwrap_err();
        assert!(matches!(err, TrainerError::InvalidConfig(_)));
    }

    #[test]
    fn wrong_interval_count_is_a_parse_error() {
        let err = TrainerConfig::from_toml_str("intervals = [0, 1, 2]").unwrap_err();
        assert!(matches!(err, TrainerError::ConfigParse(_)));
    }
}
