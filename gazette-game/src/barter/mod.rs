//! Daily barter puzzle: data model, trade semantics, and the
//! generate-and-retry driver.
//!
//! A puzzle is constructed fresh per calendar date and immutable once
//! returned; the presentation layer only simulates trades against its own
//! copy of the starting inventory via [`Trade::apply_to`].

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{
    MAX_PATH_LENGTH, MIN_EARLY_PATHS, MIN_PATH_LENGTH, MIN_SOLUTION_PATHS, QTY_CAP, RETRY_BUDGET,
    SEED_STRIDE,
};
use crate::seed::{self, PuzzleDomain};

pub mod config;
mod generate;
pub mod verify;

pub use config::{Difficulty, DifficultyConfig};

/// Player-facing inventory: every catalog good id mapped to a count.
pub type Inventory = BTreeMap<String, u32>;

/// One side of a trade: a good and a positive quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSide {
    pub good: String,
    pub qty: u32,
}

impl TradeSide {
    #[must_use]
    pub fn new(good: &str, qty: u32) -> Self {
        Self {
            good: good.to_string(),
            qty,
        }
    }
}

/// Coarse two-phase time gate restricting when a trade is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    #[default]
    Early,
    Late,
}

/// A conversion rule: consume the give-sides, produce the get-side.
///
/// A staged trade may only be applied when the player's stage pointer is one
/// short of its `stage`; applying it advances the pointer. Unstaged trades
/// never move the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub gives: SmallVec<[TradeSide; 2]>,
    pub get: TradeSide,
    #[serde(default)]
    pub window: Window,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<u8>,
}

impl Trade {
    /// Canonical identity for de-duplication: sorted give-sides plus the
    /// get-side, quantities included.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        let mut gives: Vec<String> = self
            .gives
            .iter()
            .map(|side| format!("{}:{}", side.good, side.qty))
            .collect();
        gives.sort_unstable();
        format!("{}>{}:{}", gives.join("+"), self.get.good, self.get.qty)
    }

    /// Whether the inventory covers every give-side.
    #[must_use]
    pub fn is_applicable(&self, inventory: &Inventory) -> bool {
        self.gives
            .iter()
            .all(|side| inventory.get(&side.good).copied().unwrap_or(0) >= side.qty)
    }

    /// Apply this trade to an inventory: subtract gives, add the get,
    /// clamping each resulting count to `[0, 200]`.
    ///
    /// # Errors
    ///
    /// Returns [`TradeError::ZeroQuantity`] for a malformed side and
    /// [`TradeError::Unaffordable`] when any give-side exceeds the
    /// inventory. The inventory is untouched on error.
    pub fn apply_to(&self, inventory: &mut Inventory) -> Result<(), TradeError> {
        for side in &self.gives {
            if side.qty == 0 {
                return Err(TradeError::ZeroQuantity {
                    good: side.good.clone(),
                });
            }
            let held = inventory.get(&side.good).copied().unwrap_or(0);
            if held < side.qty {
                return Err(TradeError::Unaffordable {
                    good: side.good.clone(),
                    qty: side.qty,
                });
            }
        }
        if self.get.qty == 0 {
            return Err(TradeError::ZeroQuantity {
                good: self.get.good.clone(),
            });
        }
        for side in &self.gives {
            if let Some(held) = inventory.get_mut(&side.good) {
                *held -= side.qty;
            }
        }
        let entry = inventory.entry(self.get.good.clone()).or_insert(0);
        *entry = entry.saturating_add(self.get.qty).min(QTY_CAP);
        Ok(())
    }
}

/// Target of the puzzle: hold `qty` of the rare goal good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub good: String,
    pub qty: u32,
}

/// A fully generated, verified daily barter puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarterPuzzle {
    pub id: String,
    pub date_key: String,
    pub difficulty: Difficulty,
    pub market_name: String,
    pub market_emoji: String,
    /// Participating goods, in canonical catalog order.
    pub goods: Vec<String>,
    /// Starting inventory over the whole catalog; non-participants at 0.
    pub inventory: Inventory,
    pub goal: Goal,
    /// Shuffled pool: solution, distractors, and branch detours.
    pub trades: Vec<Trade>,
    /// Canonical solution in stage order.
    pub solution: Vec<Trade>,
    pub par: u8,
    pub max_trades: u8,
    /// Number of initial stages restricted to early-window trades.
    pub early_window_trades: u8,
}

impl BarterPuzzle {
    /// Serialize for handoff to the presentation layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the puzzle cannot be serialized.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Load a puzzle from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a valid puzzle.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Position of a good within this puzzle's goods ordering.
    #[must_use]
    pub fn good_index(&self, id: &str) -> Option<usize> {
        self.goods.iter().position(|good| good == id)
    }

    /// Starting counts restricted to this puzzle's goods ordering.
    #[must_use]
    pub fn starting_counts(&self) -> SmallVec<[u32; 8]> {
        self.goods
            .iter()
            .map(|good| self.inventory.get(good).copied().unwrap_or(0))
            .collect()
    }
}

/// Rejection reasons for a single trade application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    #[error("inventory cannot cover {qty} x {good}")]
    Unaffordable { good: String, qty: u32 },
    #[error("trade side for {good} has zero quantity")]
    ZeroQuantity { good: String },
}

/// Fatal generation failures surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarterError {
    #[error("barter generation exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Acceptance constraints applied by the retry driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceLimits {
    pub min_path_len: u32,
    pub max_path_len: u32,
    pub min_early_paths: u32,
    pub min_solution_paths: u32,
    pub retry_budget: u32,
}

impl Default for AcceptanceLimits {
    fn default() -> Self {
        Self {
            min_path_len: MIN_PATH_LENGTH,
            max_path_len: MAX_PATH_LENGTH,
            min_early_paths: MIN_EARLY_PATHS,
            min_solution_paths: MIN_SOLUTION_PATHS,
            retry_budget: RETRY_BUDGET,
        }
    }
}

/// Generate the daily barter puzzle for a calendar date.
///
/// Pure function of the date: two invocations on the same day produce
/// structurally identical puzzles.
///
/// # Errors
///
/// Returns [`BarterError::Exhausted`] when no candidate satisfies the
/// acceptance constraints within the retry budget.
pub fn daily_barter(date: NaiveDate) -> Result<BarterPuzzle, BarterError> {
    generate_with(date, &AcceptanceLimits::default())
}

/// Generate the barter puzzle for the local calendar date.
///
/// # Errors
///
/// Returns [`BarterError::Exhausted`] when the retry budget runs out.
pub fn daily_barter_today() -> Result<BarterPuzzle, BarterError> {
    daily_barter(Local::now().date_naive())
}

/// Generate-and-retry driver with explicit acceptance limits.
///
/// Re-seeds the candidate generator with a prime stride per attempt and
/// accepts the first candidate, in ascending attempt order, that the
/// verifier scores within every limit. Exhausting the budget is a fatal,
/// distinct failure; a rejected candidate is never returned.
///
/// # Errors
///
/// Returns [`BarterError::Exhausted`] carrying the attempt budget.
pub fn generate_with(
    date: NaiveDate,
    limits: &AcceptanceLimits,
) -> Result<BarterPuzzle, BarterError> {
    let base = seed::domain_seed(date, PuzzleDomain::Barter);
    for attempt in 0..limits.retry_budget {
        let candidate_seed = base.wrapping_add(u64::from(attempt).wrapping_mul(SEED_STRIDE));
        let Some(puzzle) = generate::build_candidate(candidate_seed, date) else {
            continue;
        };
        let verdict = verify::assess(&puzzle);
        if verdict.satisfies(u32::from(puzzle.par), limits) {
            return Ok(puzzle);
        }
    }
    Err(BarterError::Exhausted {
        attempts: limits.retry_budget,
    })
}
