//! Candidate construction for the daily barter puzzle.
//!
//! One deterministic pass per candidate seed: pick a goods subset and a
//! rare goal, lay an optimal trade path, price it backward from the goal,
//! surround it with decoys and branch detours, then assemble a starting
//! inventory that funds the canonical line. Structural failures return
//! `None`; the retry driver treats that as a rejection and re-seeds.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use smallvec::smallvec;
use std::collections::{BTreeMap, HashSet};

use crate::barter::config::Difficulty;
use crate::barter::{BarterPuzzle, Goal, Inventory, Trade, TradeSide, Window};
use crate::catalog::{GOODS, Good, MARKET_FLAVORS, Tier, goods_with_tier};
use crate::constants::{
    BRANCH_MID_QTY_MAX, BRANCH_MID_QTY_MIN, DISTRACTOR_EARLY_SHARE, EARLY_WINDOW_MAX,
    EARLY_WINDOW_MIN, LATE_FEE_MAX, LATE_FEE_MIN, QTY_CAP, RATE_SAME_TIER, RATE_UP_ONE_TIER_MAX,
    RATE_UP_ONE_TIER_MIN, RATE_UP_TWO_TIERS_MAX, RATE_UP_TWO_TIERS_MIN, RATE_VARIANCE_MAX,
    REVERSAL_RATE_MAX, REVERSAL_RATE_MIN,
};
use crate::numbers::{floor_f64_to_u32, round_f64_to_u32, u32_to_f64};
use crate::rng::{self, PuzzleStream, fraction, range_u32};
use crate::seed;

/// Build one unverified candidate for the given seed.
pub(crate) fn build_candidate(candidate_seed: u64, date: NaiveDate) -> Option<BarterPuzzle> {
    let mut rng = rng::stream(candidate_seed, b"candidate");
    let difficulty = Difficulty::for_date(date);
    let cfg = difficulty.config();

    let par = u8::try_from(range_u32(&mut rng, u32::from(cfg.par_min), u32::from(cfg.par_max)))
        .unwrap_or(cfg.par_min);
    let early_window = par.saturating_sub(1).clamp(EARLY_WINDOW_MIN, EARLY_WINDOW_MAX);

    let subset = pick_goods_subset(&mut rng, cfg.goods_count);
    let goal_good = pick_tier_good(&mut rng, &subset, Tier::Rare)?;
    let start_good = pick_tier_good(&mut rng, &subset, Tier::Common)?;
    let mut goal = Goal {
        good: goal_good.id.to_string(),
        qty: cfg.goal_qty,
    };

    let path = build_path(&mut rng, &subset, start_good, goal_good, par)?;
    let mut solution = quantity_chain(&mut rng, &path, goal.qty);
    let mut distractors =
        build_distractors(&mut rng, &solution, &subset, goal_good.id, cfg.distractor_count);

    rescale_quantities(&mut solution, &mut distractors, &mut goal);
    partition_windows(&mut rng, &mut solution, &mut distractors, early_window);

    // Late fees, tracked so the starting inventory can pre-fund the
    // canonical line.
    let mut fee_fund: BTreeMap<String, u32> = BTreeMap::new();
    for trade in &mut solution {
        if trade.window == Window::Late
            && let Some(fee) = attach_late_fee(&mut rng, trade, &subset)
        {
            *fee_fund.entry(fee.good).or_insert(0) += fee.qty;
        }
    }
    for trade in &mut distractors {
        if trade.window == Window::Late {
            let _ = attach_late_fee(&mut rng, trade, &subset);
        }
    }

    // No two trades may share a canonical key within the same window; a
    // colliding chain is a structural reject.
    let mut reserved: HashSet<(Window, String)> = HashSet::new();
    for trade in solution.iter().chain(distractors.iter()) {
        if !reserved.insert((trade.window, trade.canonical_key())) {
            return None;
        }
    }

    let first_branch = build_branch(
        &mut rng,
        &solution,
        &path,
        &subset,
        goal_good.id,
        1,
        early_window,
        &mut reserved,
        &mut fee_fund,
    )?;
    let branch_entry = first_branch.first().map_or(0, |trade| trade.gives[0].qty);

    let mut branches = first_branch;
    if par >= early_window + 3 {
        if let Some(late_branch) = build_branch(
            &mut rng,
            &solution,
            &path,
            &subset,
            goal_good.id,
            early_window + 1,
            early_window,
            &mut reserved,
            &mut fee_fund,
        ) {
            branches.extend(late_branch);
        }
    }

    let inventory = starting_inventory(
        &solution,
        start_good,
        &goal,
        cfg.surplus_fraction,
        branch_entry,
        &fee_fund,
    );

    // Structural validation: the canonical line must stay affordable under
    // window and stage gating, and the goal must be out of reach at move 0.
    if inventory.get(&goal.good).copied().unwrap_or(0) >= goal.qty {
        return None;
    }
    simulate_solution(&inventory, &solution, &goal, early_window)?;

    let mut trades: Vec<Trade> = solution.clone();
    trades.extend(branches);
    trades.extend(distractors);
    trades.shuffle(&mut rng);

    let date_key = seed::date_key(date);
    let mut flavor_rng = rng::stream(seed::base_seed(date), b"flavor");
    let flavor = MARKET_FLAVORS
        .choose(&mut flavor_rng)
        .copied()
        .unwrap_or(MARKET_FLAVORS[0]);

    Some(BarterPuzzle {
        id: format!("barter-{date_key}"),
        date_key,
        difficulty,
        market_name: flavor.name.to_string(),
        market_emoji: flavor.emoji.to_string(),
        goods: subset.iter().map(|good| good.id.to_string()).collect(),
        inventory,
        goal,
        trades,
        solution,
        par,
        max_trades: par.saturating_add(cfg.slack),
        early_window_trades: early_window,
    })
}

/// Pick the puzzle's goods subset: one good per tier guaranteed, then a
/// shuffled fill from the rest of the catalog, returned in catalog order.
fn pick_goods_subset(rng: &mut PuzzleStream, count: usize) -> Vec<&'static Good> {
    let mut subset: Vec<&'static Good> = Vec::with_capacity(count);
    for tier in [Tier::Common, Tier::Uncommon, Tier::Rare] {
        let tier_goods: Vec<&'static Good> = goods_with_tier(tier).collect();
        if let Some(good) = tier_goods.choose(rng).copied() {
            subset.push(good);
        }
    }
    let mut rest: Vec<&'static Good> = GOODS
        .iter()
        .filter(|good| !subset.iter().any(|picked| picked.id == good.id))
        .collect();
    rest.shuffle(rng);
    subset.extend(rest.into_iter().take(count.saturating_sub(subset.len())));
    subset.sort_by_key(|good| {
        GOODS
            .iter()
            .position(|entry| entry.id == good.id)
            .unwrap_or(usize::MAX)
    });
    subset
}

fn pick_tier_good(
    rng: &mut PuzzleStream,
    subset: &[&'static Good],
    tier: Tier,
) -> Option<&'static Good> {
    let candidates: Vec<&'static Good> = subset
        .iter()
        .copied()
        .filter(|good| good.tier == tier)
        .collect();
    candidates.choose(rng).copied()
}

/// Lay a path of goods from the starting common to the rare goal with
/// exactly `par` edges, inserting intermediates that never repeat an
/// adjacent good and never touch the goal early.
fn build_path(
    rng: &mut PuzzleStream,
    subset: &[&'static Good],
    start: &'static Good,
    goal: &'static Good,
    par: u8,
) -> Option<Vec<&'static Good>> {
    if start.id == goal.id {
        return None;
    }
    let mut nodes: Vec<&'static Good> = vec![start, goal];
    while nodes.len() < usize::from(par) + 1 {
        let pos = rng.gen_range(1..nodes.len());
        let before = nodes[pos - 1];
        let after = nodes[pos];
        let candidates: Vec<&'static Good> = subset
            .iter()
            .copied()
            .filter(|good| {
                good.id != goal.id && good.id != before.id && good.id != after.id
            })
            .collect();
        let picked = candidates.choose(rng).copied()?;
        nodes.insert(pos, picked);
    }
    Some(nodes)
}

/// Exchange-rate base multiplier keyed by the tier gap between the give
/// good and the get good.
fn rate_multiplier(rng: &mut PuzzleStream, from: Tier, to: Tier) -> u32 {
    match to.rank() - from.rank() {
        delta if delta <= 0 => RATE_SAME_TIER,
        1 => range_u32(rng, RATE_UP_ONE_TIER_MIN, RATE_UP_ONE_TIER_MAX),
        _ => range_u32(rng, RATE_UP_TWO_TIERS_MIN, RATE_UP_TWO_TIERS_MAX),
    }
}

/// Convert the path into the staged solution chain, pricing backward from
/// the goal so downstream demand sets upstream supply.
fn quantity_chain(rng: &mut PuzzleStream, path: &[&'static Good], goal_qty: u32) -> Vec<Trade> {
    let edges = path.len() - 1;
    let mut demand = goal_qty.max(1);
    let mut reversed: Vec<Trade> = Vec::with_capacity(edges);
    for index in (0..edges).rev() {
        let src = path[index];
        let dst = path[index + 1];
        let get_qty = demand;
        let mult = rate_multiplier(rng, src.tier, dst.tier);
        let variance = range_u32(rng, 0, RATE_VARIANCE_MAX);
        let give_qty = get_qty
            .saturating_mul(mult)
            .saturating_add(variance)
            .max(1);
        reversed.push(Trade {
            gives: smallvec![TradeSide::new(src.id, give_qty)],
            get: TradeSide::new(dst.id, get_qty),
            window: Window::Early,
            stage: u8::try_from(index + 1).ok(),
        });
        demand = give_qty;
    }
    reversed.reverse();
    reversed
}

/// Decoy trades: reversed solution edges at a worse rate, then unrelated
/// give/get pairs between non-goal goods, deduplicated by canonical key.
fn build_distractors(
    rng: &mut PuzzleStream,
    solution: &[Trade],
    subset: &[&'static Good],
    goal_id: &str,
    count: usize,
) -> Vec<Trade> {
    let mut keys: HashSet<String> = solution.iter().map(Trade::canonical_key).collect();
    let mut out: Vec<Trade> = Vec::with_capacity(count);

    let mut reversible: Vec<&Trade> = solution
        .iter()
        .filter(|trade| trade.get.good != goal_id)
        .collect();
    reversible.shuffle(rng);
    for original in reversible.into_iter().take(count / 2) {
        let rate = REVERSAL_RATE_MIN + fraction(rng) * (REVERSAL_RATE_MAX - REVERSAL_RATE_MIN);
        let back_qty = floor_f64_to_u32(u32_to_f64(original.gives[0].qty) * rate).max(1);
        let reversed = Trade {
            gives: smallvec![original.get.clone()],
            get: TradeSide::new(&original.gives[0].good, back_qty),
            window: Window::Early,
            stage: None,
        };
        if keys.insert(reversed.canonical_key()) {
            out.push(reversed);
        }
    }

    let non_goal: Vec<&'static Good> = subset
        .iter()
        .copied()
        .filter(|good| good.id != goal_id)
        .collect();
    let mut attempts = 0;
    while out.len() < count && attempts < count * 6 {
        attempts += 1;
        let Some(give_good) = non_goal.choose(rng).copied() else {
            break;
        };
        let Some(get_good) = non_goal.choose(rng).copied() else {
            break;
        };
        if give_good.id == get_good.id {
            continue;
        }
        let get_qty = range_u32(rng, 1, 2);
        let mult = rate_multiplier(rng, give_good.tier, get_good.tier);
        let give_qty = get_qty
            .saturating_mul(mult)
            .saturating_add(range_u32(rng, 0, RATE_VARIANCE_MAX))
            .max(1);
        let synth = Trade {
            gives: smallvec![TradeSide::new(give_good.id, give_qty)],
            get: TradeSide::new(get_good.id, get_qty),
            window: Window::Early,
            stage: None,
        };
        if keys.insert(synth.canonical_key()) {
            out.push(synth);
        }
    }
    out
}

/// Divide every quantity by a common integer factor when anything breaks
/// the 200 cap. Ceiling division keeps equal quantities equal, so the
/// chain's exact affordability survives.
fn rescale_quantities(solution: &mut [Trade], distractors: &mut [Trade], goal: &mut Goal) {
    let max_qty = solution
        .iter()
        .chain(distractors.iter())
        .flat_map(|trade| {
            trade
                .gives
                .iter()
                .map(|side| side.qty)
                .chain(std::iter::once(trade.get.qty))
        })
        .max()
        .unwrap_or(0);
    if max_qty <= QTY_CAP {
        return;
    }
    let factor = max_qty.div_ceil(QTY_CAP);
    let scale = |qty: u32| qty.div_ceil(factor).max(1);
    for trade in solution.iter_mut().chain(distractors.iter_mut()) {
        for side in &mut trade.gives {
            side.qty = scale(side.qty);
        }
        trade.get.qty = scale(trade.get.qty);
    }
    goal.qty = scale(goal.qty);
}

/// Early/late partition: the first `early_window` solution stages are
/// early, the rest late; distractors split roughly 60/40 with at least one
/// late decoy reserved when two or more exist.
fn partition_windows(
    rng: &mut PuzzleStream,
    solution: &mut [Trade],
    distractors: &mut [Trade],
    early_window: u8,
) {
    for trade in solution.iter_mut() {
        let stage = trade.stage.unwrap_or(0);
        trade.window = if stage <= early_window {
            Window::Early
        } else {
            Window::Late
        };
    }
    distractors.shuffle(rng);
    let total = distractors.len();
    let mut early_count = floor_f64_to_u32(
        u32_to_f64(u32::try_from(total).unwrap_or(u32::MAX)) * DISTRACTOR_EARLY_SHARE,
    ) as usize;
    if total >= 2 {
        early_count = early_count.min(total - 1);
    }
    for (index, trade) in distractors.iter_mut().enumerate() {
        trade.window = if index < early_count {
            Window::Early
        } else {
            Window::Late
        };
    }
}

/// Attach a small side-cost in a common good not already involved in the
/// trade. Returns the fee side for aggregate tracking.
fn attach_late_fee(
    rng: &mut PuzzleStream,
    trade: &mut Trade,
    subset: &[&'static Good],
) -> Option<TradeSide> {
    let involved = |id: &str| {
        trade.get.good == id || trade.gives.iter().any(|side| side.good == id)
    };
    let candidates: Vec<&'static Good> = subset
        .iter()
        .copied()
        .filter(|good| good.tier == Tier::Common && !involved(good.id))
        .collect();
    let fee_good = candidates.choose(rng).copied()?;
    let fee = TradeSide::new(fee_good.id, range_u32(rng, LATE_FEE_MIN, LATE_FEE_MAX));
    trade.gives.push(fee.clone());
    Some(fee)
}

/// Synthesize a 3-trade detour covering three consecutive solution stages
/// through an alternate intermediate good, rejoining the canonical line
/// with the exact downstream quantity.
#[allow(clippy::too_many_arguments)]
fn build_branch(
    rng: &mut PuzzleStream,
    solution: &[Trade],
    path: &[&'static Good],
    subset: &[&'static Good],
    goal_id: &str,
    start_stage: u8,
    early_window: u8,
    reserved: &mut HashSet<(Window, String)>,
    fee_fund: &mut BTreeMap<String, u32>,
) -> Option<Vec<Trade>> {
    let s = usize::from(start_stage);
    if s + 2 > path.len() - 1 {
        return None;
    }
    let entry_good = path[s - 1];
    let skipped = path[s];
    let mid_target = path[s + 1];
    let rejoin_target = path[s + 2];
    if entry_good.id == mid_target.id
        || entry_good.id == rejoin_target.id
        || mid_target.id == rejoin_target.id
    {
        return None;
    }

    let mut alternates: Vec<&'static Good> = subset
        .iter()
        .copied()
        .filter(|good| {
            good.id != entry_good.id
                && good.id != skipped.id
                && good.id != mid_target.id
                && good.id != rejoin_target.id
                && good.id != goal_id
        })
        .collect();
    alternates.shuffle(rng);

    let chain_entry = solution[s - 1].gives[0].qty;
    let rejoin_qty = solution[s + 1].get.qty;

    for alternate in alternates {
        let entry_qty = if s == 1 {
            chain_entry.saturating_add(range_u32(rng, 0, 2)).min(QTY_CAP)
        } else {
            chain_entry.saturating_sub(range_u32(rng, 0, 1)).max(1)
        };
        let mid_qty = range_u32(rng, BRANCH_MID_QTY_MIN, BRANCH_MID_QTY_MAX);
        let out_qty = range_u32(rng, BRANCH_MID_QTY_MIN, BRANCH_MID_QTY_MAX);
        let hops = [
            (entry_good.id, entry_qty, alternate.id, mid_qty),
            (alternate.id, mid_qty, mid_target.id, out_qty),
            (mid_target.id, out_qty, rejoin_target.id, rejoin_qty),
        ];
        let mut trades: Vec<Trade> = Vec::with_capacity(hops.len());
        for (offset, (give_id, give_qty, get_id, get_qty)) in hops.into_iter().enumerate() {
            let stage = start_stage + u8::try_from(offset).unwrap_or(0);
            let window = if stage <= early_window {
                Window::Early
            } else {
                Window::Late
            };
            let mut trade = Trade {
                gives: smallvec![TradeSide::new(give_id, give_qty)],
                get: TradeSide::new(get_id, get_qty),
                window,
                stage: Some(stage),
            };
            if window == Window::Late {
                let _ = attach_late_fee(rng, &mut trade, subset);
            }
            trades.push(trade);
        }

        let keys: Vec<(Window, String)> = trades
            .iter()
            .map(|trade| (trade.window, trade.canonical_key()))
            .collect();
        let distinct: HashSet<&(Window, String)> = keys.iter().collect();
        if distinct.len() != keys.len() || keys.iter().any(|key| reserved.contains(key)) {
            continue;
        }

        for key in keys {
            reserved.insert(key);
        }
        for trade in &trades {
            if trade.window == Window::Late {
                for side in trade.gives.iter().skip(1) {
                    *fee_fund.entry(side.good.clone()).or_insert(0) += side.qty;
                }
            }
        }
        return Some(trades);
    }
    None
}

/// Assemble the starting inventory: the first trade's cost plus surplus,
/// the late-fee pre-fund, and the branch entry cost; goal forced to 0.
fn starting_inventory(
    solution: &[Trade],
    start_good: &'static Good,
    goal: &Goal,
    surplus_fraction: f64,
    branch_entry: u32,
    fee_fund: &BTreeMap<String, u32>,
) -> Inventory {
    let mut inventory: Inventory = GOODS
        .iter()
        .map(|good| (good.id.to_string(), 0))
        .collect();
    let first_give = solution.first().map_or(0, |trade| trade.gives[0].qty);
    let funded = round_f64_to_u32(u32_to_f64(first_give) * (1.0 + surplus_fraction))
        .max(first_give)
        .saturating_add(branch_entry);
    if let Some(count) = inventory.get_mut(start_good.id) {
        *count = funded;
    }
    for (good, qty) in fee_fund {
        if let Some(count) = inventory.get_mut(good) {
            *count = count.saturating_add(*qty);
        }
    }
    if let Some(count) = inventory.get_mut(&goal.good) {
        *count = 0;
    }
    for count in inventory.values_mut() {
        *count = (*count).min(QTY_CAP);
    }
    inventory
}

/// Replay the canonical solution under window and stage gating; `None`
/// when any step is unaffordable or the goal is missed.
fn simulate_solution(
    inventory: &Inventory,
    solution: &[Trade],
    goal: &Goal,
    early_window: u8,
) -> Option<()> {
    let mut sim = inventory.clone();
    for (index, trade) in solution.iter().enumerate() {
        let stage = u8::try_from(index + 1).ok()?;
        if trade.stage != Some(stage) {
            return None;
        }
        let expected = if stage <= early_window {
            Window::Early
        } else {
            Window::Late
        };
        if trade.window != expected {
            return None;
        }
        trade.apply_to(&mut sim).ok()?;
    }
    (sim.get(&goal.good).copied().unwrap_or(0) >= goal.qty).then_some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_date() -> NaiveDate {
        // A Friday: hard difficulty.
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn candidate() -> BarterPuzzle {
        let base = seed::domain_seed(fixture_date(), crate::seed::PuzzleDomain::Barter);
        let mut attempt: u32 = 0;
        loop {
            let seed = base.wrapping_add(u64::from(attempt) * crate::constants::SEED_STRIDE);
            if let Some(puzzle) = build_candidate(seed, fixture_date()) {
                return puzzle;
            }
            attempt += 1;
            assert!(attempt < 64, "no structural candidate in 64 attempts");
        }
    }

    #[test]
    fn candidate_is_deterministic() {
        let base = seed::domain_seed(fixture_date(), crate::seed::PuzzleDomain::Barter);
        assert_eq!(
            build_candidate(base, fixture_date()),
            build_candidate(base, fixture_date())
        );
    }

    #[test]
    fn solution_stages_are_contiguous() {
        let puzzle = candidate();
        for (index, trade) in puzzle.solution.iter().enumerate() {
            assert_eq!(trade.stage, Some(u8::try_from(index + 1).unwrap()));
        }
        assert_eq!(puzzle.solution.len(), usize::from(puzzle.par));
    }

    #[test]
    fn goal_is_rare_and_unfunded() {
        let puzzle = candidate();
        let good = crate::catalog::good_by_id(&puzzle.goal.good).unwrap();
        assert_eq!(good.tier, Tier::Rare);
        assert_eq!(puzzle.inventory[&puzzle.goal.good], 0);
    }

    #[test]
    fn first_trade_is_affordable() {
        let puzzle = candidate();
        assert!(puzzle.solution[0].is_applicable(&puzzle.inventory));
    }

    #[test]
    fn subset_covers_every_tier() {
        let puzzle = candidate();
        let tiers: HashSet<Tier> = puzzle
            .goods
            .iter()
            .map(|id| crate::catalog::good_by_id(id).unwrap().tier)
            .collect();
        assert!(tiers.contains(&Tier::Common));
        assert!(tiers.contains(&Tier::Uncommon));
        assert!(tiers.contains(&Tier::Rare));
    }

    #[test]
    fn pool_quantities_respect_cap() {
        let puzzle = candidate();
        for trade in &puzzle.trades {
            for side in &trade.gives {
                assert!((1..=QTY_CAP).contains(&side.qty));
            }
            assert!((1..=QTY_CAP).contains(&trade.get.qty));
        }
    }

    #[test]
    fn late_window_opens_after_early_stages() {
        let puzzle = candidate();
        for trade in &puzzle.solution {
            let stage = trade.stage.unwrap();
            if stage <= puzzle.early_window_trades {
                assert_eq!(trade.window, Window::Early);
            } else {
                assert_eq!(trade.window, Window::Late);
            }
        }
    }
}
