use std::fmt;
use serde::{Deserialize, Serialize};

/// Proficiency level of a card, 0 (new) ..= 7 (mastered).
///
/// The value is immutable; `next_level` / `previous_level` return a new
/// level and saturate at the ends of the scale. They are the only way a
/// card's level is ever changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MIN: Level = Level(0);
    pub const MAX: Level = Level(7);

    /// Number of distinct levels.
    pub const COUNT: usize = 8;

    /// Decode a stored level; anything outside 0..=7 is rejected.
    pub fn from_value(value: u8) -> Option<Level> {
        (value <= Self::MAX.0).then_some(Level(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn next_level(self) -> Level {
        if self < Self::MAX {
            Level(self.0 + 1)
        } else {
            Self::MAX
        }
    }

    pub fn previous_level(self) -> Level {
        if self > Self::MIN {
            Level(self.0 - 1)
        } else {
            Self::MIN
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::from_value(value).ok_or_else(|| format!("level {value} is outside 0..=7"))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Days until the next review, indexed by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalTable([u32; Level::COUNT]);

impl IntervalTable {
    pub const DEFAULT_DAYS: [u32; Level::COUNT] = [0, 2, 5, 9, 15, 25, 40, 60];

    pub fn new(days: [u32; Level::COUNT]) -> Self {
        IntervalTable(days)
    }

    pub fn interval_days(&self, level: Level) -> u32 {
        self.0[level.value() as usize]
    }

    /// Longer-or-equal intervals at every higher level.
    pub fn is_monotonic(&self) -> bool {
        self.0.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn days(&self) -> &[u32; Level::COUNT] {
        &self.0
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        IntervalTable(Self::DEFAULT_DAYS)
    }
}
