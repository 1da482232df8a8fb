//! Solvability and path-counting verification for barter candidates.
//!
//! Three bounded searches over the same state space: the encoded inventory
//! (a fixed-size count vector over the puzzle's goods ordering) plus the
//! stage pointer. Trades are filtered by window phase (move count) and by
//! stage sequencing, and applied with the same subtract/add/clamp
//! semantics as [`Trade::apply_to`] — an agreement test pins the two
//! implementations together.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::BuildHasherDefault;
use twox_hash::XxHash64;

use crate::barter::{AcceptanceLimits, BarterPuzzle, Trade, Window};
use crate::constants::{PATH_COUNT_CAP, QTY_CAP, VERIFY_LAYER_CAP, VERIFY_STATE_BUDGET};

/// Fixed-seed hasher so search iteration order is deterministic.
type FixedHasher = BuildHasherDefault<XxHash64>;

/// Inventory counts over the puzzle's goods ordering.
type Counts = SmallVec<[u32; 8]>;

/// Verifier scores for one candidate puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Fewest trades to the goal, `None` when unreachable in bounds.
    pub shortest: Option<u32>,
    /// Distinct trade sequences reaching the end of the early window.
    pub early_paths: u32,
    /// Distinct trade sequences reaching the goal within `max_trades`.
    pub solution_paths: u32,
}

impl Verdict {
    /// Whether this verdict clears every acceptance constraint.
    #[must_use]
    pub fn satisfies(&self, par: u32, limits: &AcceptanceLimits) -> bool {
        let Some(shortest) = self.shortest else {
            return false;
        };
        shortest >= limits.min_path_len
            && shortest <= limits.max_path_len
            && par >= limits.min_path_len
            && par <= limits.max_path_len
            && shortest <= par
            && self.early_paths >= limits.min_early_paths
            && self.solution_paths >= limits.min_solution_paths
    }
}

/// Score a puzzle: shortest path, early-window path count, solution count.
#[must_use]
pub fn assess(puzzle: &BarterPuzzle) -> Verdict {
    SearchSpace::new(puzzle).map_or(
        Verdict {
            shortest: None,
            early_paths: 0,
            solution_paths: 0,
        },
        |space| Verdict {
            shortest: space.shortest_path(),
            early_paths: space.early_path_count(),
            solution_paths: space.solution_count(),
        },
    )
}

struct IndexedTrade {
    gives: SmallVec<[(usize, u32); 2]>,
    get: (usize, u32),
    late: bool,
    stage: Option<u8>,
}

struct SearchSpace {
    trades: Vec<IndexedTrade>,
    start: Counts,
    goal_index: usize,
    goal_qty: u32,
    early_window: u8,
    max_trades: u8,
}

impl SearchSpace {
    fn new(puzzle: &BarterPuzzle) -> Option<Self> {
        let goal_index = puzzle.good_index(&puzzle.goal.good)?;
        let trades = puzzle
            .trades
            .iter()
            .map(|trade| index_trade(puzzle, trade))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            trades,
            start: puzzle.starting_counts(),
            goal_index,
            goal_qty: puzzle.goal.qty,
            early_window: puzzle.early_window_trades,
            max_trades: puzzle.max_trades,
        })
    }

    /// Window phase plus stage-sequencing filter for one candidate move.
    fn usable(&self, trade: &IndexedTrade, moves: u8, stage: u8) -> bool {
        let late_phase = moves >= self.early_window;
        if trade.late != late_phase {
            return false;
        }
        match trade.stage {
            Some(required) => stage + 1 == required,
            None => true,
        }
    }

    fn satisfied(&self, counts: &[u32]) -> bool {
        counts[self.goal_index] >= self.goal_qty
    }

    /// Breadth-first shortest path, bounded by `max_trades` and the state
    /// budget. Visited states key on (window phase, stage, counts); BFS
    /// order makes the first visit the minimum move count.
    fn shortest_path(&self) -> Option<u32> {
        if self.satisfied(&self.start) {
            return Some(0);
        }
        let mut visited: HashSet<(bool, u8, Counts), FixedHasher> = HashSet::default();
        let mut queue: VecDeque<(Counts, u8, u8)> = VecDeque::new();
        visited.insert((false, 0, self.start.clone()));
        queue.push_back((self.start.clone(), 0, 0));
        let mut expanded = 0_usize;
        while let Some((counts, stage, moves)) = queue.pop_front() {
            if moves >= self.max_trades {
                continue;
            }
            expanded += 1;
            if expanded > VERIFY_STATE_BUDGET {
                return None;
            }
            for trade in &self.trades {
                if !self.usable(trade, moves, stage) {
                    continue;
                }
                let mut next = counts.clone();
                if !apply_indexed(&mut next, trade) {
                    continue;
                }
                if self.satisfied(&next) {
                    return Some(u32::from(moves) + 1);
                }
                let next_stage = trade.stage.unwrap_or(stage);
                let key = (moves + 1 >= self.early_window, next_stage, next.clone());
                if visited.insert(key) {
                    queue.push_back((next, next_stage, moves + 1));
                }
            }
        }
        None
    }

    /// Layered path-count propagation; multiplicities saturate at
    /// `PATH_COUNT_CAP` and each layer holds at most `VERIFY_LAYER_CAP`
    /// distinct states.
    fn propagate(
        &self,
        layer: &HashMap<(u8, Counts), u32, FixedHasher>,
        moves: u8,
        mut on_goal: impl FnMut(u32),
    ) -> HashMap<(u8, Counts), u32, FixedHasher> {
        let mut next: HashMap<(u8, Counts), u32, FixedHasher> = HashMap::default();
        for ((stage, counts), count) in layer {
            for trade in &self.trades {
                if !self.usable(trade, moves, *stage) {
                    continue;
                }
                let mut updated = counts.clone();
                if !apply_indexed(&mut updated, trade) {
                    continue;
                }
                if self.satisfied(&updated) {
                    on_goal(*count);
                    continue;
                }
                let key = (trade.stage.unwrap_or(*stage), updated);
                if next.len() >= VERIFY_LAYER_CAP && !next.contains_key(&key) {
                    continue;
                }
                let entry = next.entry(key).or_insert(0);
                *entry = entry.saturating_add(*count).min(PATH_COUNT_CAP);
            }
        }
        next
    }

    /// Count distinct sequences of exactly `early_window` moves whose
    /// stage pointer reaches the end of the early window.
    fn early_path_count(&self) -> u32 {
        let mut layer: HashMap<(u8, Counts), u32, FixedHasher> = HashMap::default();
        layer.insert((0, self.start.clone()), 1);
        for moves in 0..self.early_window {
            layer = self.propagate(&layer, moves, |_| {});
            if layer.is_empty() {
                break;
            }
        }
        layer
            .iter()
            .filter(|(key, _)| key.0 == self.early_window)
            .map(|(_, count)| *count)
            .fold(0_u32, u32::saturating_add)
            .min(PATH_COUNT_CAP)
    }

    /// Count distinct sequences that first satisfy the goal within
    /// `max_trades` moves.
    fn solution_count(&self) -> u32 {
        if self.satisfied(&self.start) {
            return PATH_COUNT_CAP;
        }
        let mut solutions = 0_u32;
        let mut layer: HashMap<(u8, Counts), u32, FixedHasher> = HashMap::default();
        layer.insert((0, self.start.clone()), 1);
        for moves in 0..self.max_trades {
            layer = self.propagate(&layer, moves, |count| {
                solutions = solutions.saturating_add(count).min(PATH_COUNT_CAP);
            });
            if layer.is_empty() {
                break;
            }
        }
        solutions
    }
}

fn index_trade(puzzle: &BarterPuzzle, trade: &Trade) -> Option<IndexedTrade> {
    let gives = trade
        .gives
        .iter()
        .map(|side| puzzle.good_index(&side.good).map(|index| (index, side.qty)))
        .collect::<Option<SmallVec<[(usize, u32); 2]>>>()?;
    let get = puzzle.good_index(&trade.get.good).map(|index| (index, trade.get.qty))?;
    Some(IndexedTrade {
        gives,
        get,
        late: trade.window == Window::Late,
        stage: trade.stage,
    })
}

/// Array-encoded mirror of [`Trade::apply_to`]: reject before mutation,
/// subtract gives, add the get clamped to the quantity cap.
fn apply_indexed(counts: &mut [u32], trade: &IndexedTrade) -> bool {
    for &(index, qty) in &trade.gives {
        if counts[index] < qty {
            return false;
        }
    }
    for &(index, qty) in &trade.gives {
        counts[index] -= qty;
    }
    let (get_index, get_qty) = trade.get;
    counts[get_index] = counts[get_index].saturating_add(get_qty).min(QTY_CAP);
    true
}
