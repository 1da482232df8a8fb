//! Gazette Puzzle Engine
//!
//! Platform-agnostic core generation for the Gazette daily mini-games.
//! This crate turns a calendar date into finished puzzle data structures
//! without UI or platform-specific dependencies; rendering and play state
//! live in consumer crates.
//!
//! The centerpiece is the barter market generator: a deterministic
//! construct-then-verify pipeline that guarantees every published puzzle is
//! solvable, bounded, and offers more than one viable line of play.

pub mod barter;
pub mod catalog;
pub mod constants;
pub mod numbers;
pub mod rng;
pub mod seed;

// Re-export commonly used types
pub use barter::{
    AcceptanceLimits, BarterError, BarterPuzzle, Difficulty, DifficultyConfig, Goal, Inventory,
    Trade, TradeError, TradeSide, Window, daily_barter, daily_barter_today, generate_with,
};
pub use barter::verify::{Verdict, assess};
pub use catalog::{GOODS, Good, MARKET_FLAVORS, MarketFlavor, Tier, good_by_id, goods_with_tier};
pub use seed::{PuzzleDomain, base_seed, date_key, domain_seed};
