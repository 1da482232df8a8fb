//! Difficulty resolution for the daily barter puzzle.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Daily difficulty band, keyed off the weekday: the market week warms up
/// with easy puzzles and closes hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Difficulty for a calendar date: Mon/Tue easy, Wed/Thu medium,
    /// Fri through Sun hard.
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon | Weekday::Tue => Self::Easy,
            Weekday::Wed | Weekday::Thu => Self::Medium,
            Weekday::Fri | Weekday::Sat | Weekday::Sun => Self::Hard,
        }
    }

    /// Tuning table for this difficulty.
    #[must_use]
    pub const fn config(self) -> &'static DifficultyConfig {
        match self {
            Self::Easy => &EASY_CONFIG,
            Self::Medium => &MEDIUM_CONFIG,
            Self::Hard => &HARD_CONFIG,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-difficulty generation tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Goods drawn into the puzzle subset.
    pub goods_count: usize,
    /// Inclusive range the par move count is drawn from.
    pub par_min: u8,
    pub par_max: u8,
    /// Extra starting stock on top of the first trade's cost.
    pub surplus_fraction: f64,
    /// Trades allowed beyond par before the puzzle is lost.
    pub slack: u8,
    /// Decoy trades mixed into the pool.
    pub distractor_count: usize,
    /// Required quantity of the goal good.
    pub goal_qty: u32,
}

const EASY_CONFIG: DifficultyConfig = DifficultyConfig {
    goods_count: 6,
    par_min: 3,
    par_max: 4,
    surplus_fraction: 0.5,
    slack: 4,
    distractor_count: 4,
    goal_qty: 1,
};

const MEDIUM_CONFIG: DifficultyConfig = DifficultyConfig {
    goods_count: 7,
    par_min: 5,
    par_max: 7,
    surplus_fraction: 0.25,
    slack: 3,
    distractor_count: 5,
    goal_qty: 1,
};

const HARD_CONFIG: DifficultyConfig = DifficultyConfig {
    goods_count: 8,
    par_min: 8,
    par_max: 10,
    surplus_fraction: 0.0,
    slack: 3,
    distractor_count: 6,
    goal_qty: 2,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_mapping() {
        let friday = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(friday.weekday(), Weekday::Fri);
        assert_eq!(Difficulty::for_date(friday), Difficulty::Hard);

        let monday = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(Difficulty::for_date(monday), Difficulty::Easy);

        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        assert_eq!(Difficulty::for_date(wednesday), Difficulty::Medium);
    }

    #[test]
    fn hard_config_matches_scenario_range() {
        let cfg = Difficulty::Hard.config();
        assert_eq!((cfg.par_min, cfg.par_max), (8, 10));
        assert_eq!(cfg.goal_qty, 2);
    }

    #[test]
    fn par_ranges_are_ordered() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let cfg = difficulty.config();
            assert!(cfg.par_min <= cfg.par_max);
            assert!(cfg.goods_count >= 6);
        }
    }
}
