//! End-to-end acceptance checks for the daily barter generator.

use chrono::NaiveDate;
use gazette_game::{
    AcceptanceLimits, BarterError, BarterPuzzle, PuzzleDomain, Tier, Window, assess, base_seed,
    daily_barter, domain_seed, generate_with, good_by_id,
};
use std::collections::HashSet;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// One date per difficulty band.
fn sample_dates() -> [NaiveDate; 3] {
    [
        date(2024, 3, 11), // Monday, easy
        date(2024, 3, 13), // Wednesday, medium
        date(2024, 3, 15), // Friday, hard
    ]
}

fn replay_solution(puzzle: &BarterPuzzle) -> gazette_game::Inventory {
    let mut inventory = puzzle.inventory.clone();
    for (index, trade) in puzzle.solution.iter().enumerate() {
        let stage = u8::try_from(index + 1).unwrap();
        let expected = if stage <= puzzle.early_window_trades {
            Window::Early
        } else {
            Window::Late
        };
        assert_eq!(trade.window, expected, "window gating broken at stage {stage}");
        assert_eq!(trade.stage, Some(stage));
        trade
            .apply_to(&mut inventory)
            .unwrap_or_else(|err| panic!("stage {stage} unaffordable: {err}"));
    }
    inventory
}

#[test]
fn same_date_generates_identical_puzzles() {
    let day = date(2024, 3, 15);
    let first = daily_barter(day).unwrap();
    let second = daily_barter(day).unwrap();
    assert_eq!(first, second);
}

#[test]
fn different_dates_generate_different_puzzles() {
    let friday = daily_barter(date(2024, 3, 15)).unwrap();
    let saturday = daily_barter(date(2024, 3, 16)).unwrap();
    assert_ne!(friday.trades, saturday.trades);
}

#[test]
fn canonical_solution_reaches_goal_in_par_moves() {
    for day in sample_dates() {
        let puzzle = daily_barter(day).unwrap();
        assert_eq!(puzzle.solution.len(), usize::from(puzzle.par));
        assert!(puzzle.par <= puzzle.max_trades);
        let inventory = replay_solution(&puzzle);
        assert!(
            inventory[&puzzle.goal.good] >= puzzle.goal.qty,
            "{day}: goal unmet after the canonical line"
        );
    }
}

#[test]
fn first_solution_trade_is_affordable_from_start() {
    for day in sample_dates() {
        let puzzle = daily_barter(day).unwrap();
        for side in &puzzle.solution[0].gives {
            assert!(
                puzzle.inventory[&side.good] >= side.qty,
                "{day}: starting stock misses {} x {}",
                side.qty,
                side.good
            );
        }
    }
}

#[test]
fn accepted_puzzles_score_within_bounds() {
    let limits = AcceptanceLimits::default();
    for day in sample_dates() {
        let puzzle = daily_barter(day).unwrap();
        let verdict = assess(&puzzle);
        let shortest = verdict.shortest.expect("accepted puzzle is solvable");
        assert!(shortest >= limits.min_path_len);
        assert!(shortest <= limits.max_path_len);
        assert!(shortest <= u32::from(puzzle.par));
        assert!(verdict.early_paths >= limits.min_early_paths);
        assert!(verdict.solution_paths >= limits.min_solution_paths);
    }
}

#[test]
fn greedy_play_never_breaks_the_quantity_cap() {
    let puzzle = daily_barter(date(2024, 3, 15)).unwrap();
    let mut inventory = puzzle.inventory.clone();
    let mut stage = 0_u8;
    for moves in 0..puzzle.max_trades {
        let late_phase = moves >= puzzle.early_window_trades;
        let playable = puzzle.trades.iter().find(|trade| {
            (trade.window == Window::Late) == late_phase
                && trade.stage.is_none_or(|required| stage + 1 == required)
                && trade.is_applicable(&inventory)
        });
        let Some(trade) = playable else {
            break;
        };
        trade.apply_to(&mut inventory).unwrap();
        if let Some(required) = trade.stage {
            stage = required;
        }
        for (good, count) in &inventory {
            assert!(*count <= 200, "{good} exceeded the cap");
        }
    }
}

#[test]
fn fixed_date_scenario_matches_hard_band() {
    let day = date(2024, 3, 15);
    assert_eq!(base_seed(day), 20_240_315);

    let puzzle = daily_barter(day).unwrap();
    let goal_good = good_by_id(&puzzle.goal.good).unwrap();
    assert_eq!(goal_good.tier, Tier::Rare);
    assert!((8..=10).contains(&puzzle.par));
    assert!((2..=3).contains(&puzzle.early_window_trades));

    let mut seen: HashSet<(Window, String)> = HashSet::new();
    for trade in &puzzle.trades {
        assert!(
            seen.insert((trade.window, trade.canonical_key())),
            "duplicate trade key within one window: {}",
            trade.canonical_key()
        );
    }
}

#[test]
fn domain_seeds_split_sibling_games() {
    let day = date(2024, 3, 15);
    let barter = domain_seed(day, PuzzleDomain::Barter);
    let sudoku = domain_seed(day, PuzzleDomain::Sudoku);
    assert_ne!(barter, sudoku);
    assert_eq!(barter, domain_seed(day, PuzzleDomain::Barter));
}

#[test]
fn exhaustion_spends_the_whole_budget_and_fails() {
    let limits = AcceptanceLimits {
        // No candidate can offer this many distinct solutions.
        min_solution_paths: u32::MAX,
        retry_budget: 16,
        ..AcceptanceLimits::default()
    };
    let err = generate_with(date(2024, 3, 15), &limits).unwrap_err();
    assert_eq!(err, BarterError::Exhausted { attempts: 16 });
}

#[test]
fn puzzle_round_trips_through_json() {
    let puzzle = daily_barter(date(2024, 3, 15)).unwrap();
    let json = puzzle.to_json().unwrap();
    let restored = BarterPuzzle::from_json(&json).unwrap();
    assert_eq!(puzzle, restored);
}

#[test]
fn goal_is_never_satisfied_at_move_zero() {
    for day in sample_dates() {
        let puzzle = daily_barter(day).unwrap();
        assert_eq!(puzzle.inventory[&puzzle.goal.good], 0);
    }
}
