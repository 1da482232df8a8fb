//! Calendar-date seed derivation shared by every daily generator.
//!
//! The base seed is the human-readable `yyyymmdd` integer, so the same
//! calendar day yields the same puzzles for every player. Each game domain
//! derives its own stream from that base so sibling puzzles differ while
//! staying deterministic.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::rng::{PuzzleStream, derive_stream_seed, stream};

/// Game domains sharing the daily seed primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleDomain {
    Barter,
    Sudoku,
    WordList,
    Trivia,
    Mystery,
    Bridges,
}

impl PuzzleDomain {
    /// Stream tag used to decorrelate this domain from its siblings.
    #[must_use]
    pub const fn tag(self) -> &'static [u8] {
        match self {
            Self::Barter => b"barter",
            Self::Sudoku => b"sudoku",
            Self::WordList => b"wordlist",
            Self::Trivia => b"trivia",
            Self::Mystery => b"mystery",
            Self::Bridges => b"bridges",
        }
    }
}

/// Base seed for a calendar date: `year * 10000 + month * 100 + day`.
#[must_use]
pub fn base_seed(date: NaiveDate) -> u64 {
    let year = u64::try_from(date.year()).unwrap_or(0);
    year * 10_000 + u64::from(date.month()) * 100 + u64::from(date.day())
}

/// Zero-padded `YYYY-MM-DD` display key for a date.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month(),
        date.day()
    )
}

/// Derived seed for one game domain on one calendar date.
#[must_use]
pub fn domain_seed(date: NaiveDate, domain: PuzzleDomain) -> u64 {
    derive_stream_seed(base_seed(date), domain.tag())
}

/// Seeded stream for one game domain on one calendar date.
#[must_use]
pub fn domain_stream(date: NaiveDate, domain: PuzzleDomain) -> PuzzleStream {
    stream(base_seed(date), domain.tag())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn base_seed_is_yyyymmdd() {
        assert_eq!(base_seed(fixture_date()), 20_240_315);
        let padded = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        assert_eq!(base_seed(padded), 20_260_107);
    }

    #[test]
    fn date_key_zero_pads() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        assert_eq!(date_key(date), "2026-01-07");
    }

    #[test]
    fn domains_produce_distinct_seeds() {
        let date = fixture_date();
        let barter = domain_seed(date, PuzzleDomain::Barter);
        let sudoku = domain_seed(date, PuzzleDomain::Sudoku);
        let trivia = domain_seed(date, PuzzleDomain::Trivia);
        assert_ne!(barter, sudoku);
        assert_ne!(barter, trivia);
        assert_ne!(sudoku, trivia);
    }

    #[test]
    fn domain_seed_is_deterministic() {
        let date = fixture_date();
        assert_eq!(
            domain_seed(date, PuzzleDomain::Barter),
            domain_seed(date, PuzzleDomain::Barter)
        );
    }
}
