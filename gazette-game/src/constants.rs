//! Centralized balance and tuning constants for Gazette puzzle generation.
//!
//! These values define the deterministic math for the barter generator and
//! its verifier. Keeping them together ensures that puzzle balance can only
//! be adjusted via code changes reviewed in version control.

// Trade quantities ---------------------------------------------------------
pub(crate) const QTY_CAP: u32 = 200;
pub(crate) const LATE_FEE_MIN: u32 = 1;
pub(crate) const LATE_FEE_MAX: u32 = 2;

// Exchange rates -----------------------------------------------------------
pub(crate) const RATE_SAME_TIER: u32 = 1;
pub(crate) const RATE_UP_ONE_TIER_MIN: u32 = 2;
pub(crate) const RATE_UP_ONE_TIER_MAX: u32 = 3;
pub(crate) const RATE_UP_TWO_TIERS_MIN: u32 = 4;
pub(crate) const RATE_UP_TWO_TIERS_MAX: u32 = 5;
pub(crate) const RATE_VARIANCE_MAX: u32 = 1;
pub(crate) const REVERSAL_RATE_MIN: f64 = 0.40;
pub(crate) const REVERSAL_RATE_MAX: f64 = 0.70;

// Distractor partitioning --------------------------------------------------
pub(crate) const DISTRACTOR_EARLY_SHARE: f64 = 0.60;

// Branch detours -----------------------------------------------------------
pub(crate) const BRANCH_MID_QTY_MIN: u32 = 1;
pub(crate) const BRANCH_MID_QTY_MAX: u32 = 4;

// Early window -------------------------------------------------------------
pub(crate) const EARLY_WINDOW_MIN: u8 = 2;
pub(crate) const EARLY_WINDOW_MAX: u8 = 3;

// Acceptance ---------------------------------------------------------------
pub(crate) const MIN_PATH_LENGTH: u32 = 3;
pub(crate) const MAX_PATH_LENGTH: u32 = 10;
pub(crate) const MIN_EARLY_PATHS: u32 = 2;
pub(crate) const MIN_SOLUTION_PATHS: u32 = 2;

// Verifier bounds ----------------------------------------------------------
pub(crate) const PATH_COUNT_CAP: u32 = 32;
pub(crate) const VERIFY_LAYER_CAP: usize = 4_096;
pub(crate) const VERIFY_STATE_BUDGET: usize = 50_000;

// Retry driver -------------------------------------------------------------
pub(crate) const RETRY_BUDGET: u32 = 512;
pub(crate) const SEED_STRIDE: u64 = 104_729;
