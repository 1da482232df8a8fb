//! Automated QA sweeps for Gazette daily puzzle generation.
//!
//! Generates the barter puzzle for a range of calendar dates, re-scores
//! each accepted puzzle with the verifier, and reports per-date results
//! plus aggregate acceptance statistics.

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use colored::Colorize;
use log::{debug, info};
use serde::Serialize;

use gazette_game::{AcceptanceLimits, assess, generate_with};

#[derive(Debug, Parser)]
#[command(name = "gazette-tester", version)]
#[command(about = "QA sweeps for Gazette daily puzzle generation")]
struct Args {
    /// First date to sweep (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Number of consecutive dates to sweep
    #[arg(long, default_value_t = 1)]
    days: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,

    /// Retry budget override for the generation driver
    #[arg(long)]
    retries: Option<u32>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct DateRecord {
    date: String,
    difficulty: String,
    market: String,
    goods: usize,
    trades: usize,
    par: u8,
    max_trades: u8,
    early_window_trades: u8,
    shortest: Option<u32>,
    early_paths: u32,
    solution_paths: u32,
}

#[derive(Debug, Serialize, Default)]
struct SweepSummary {
    generated: usize,
    failed: usize,
    records: Vec<DateRecord>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let start = args.date.unwrap_or_else(|| Local::now().date_naive());
    let mut limits = AcceptanceLimits::default();
    if let Some(retries) = args.retries {
        limits.retry_budget = retries;
    }

    let mut summary = SweepSummary::default();
    for offset in 0..args.days {
        let day = start + Duration::days(i64::from(offset));
        debug!("generating barter puzzle for {day}");
        match generate_with(day, &limits) {
            Ok(puzzle) => {
                let verdict = assess(&puzzle);
                summary.generated += 1;
                summary.records.push(DateRecord {
                    date: puzzle.date_key.clone(),
                    difficulty: puzzle.difficulty.to_string(),
                    market: format!("{} {}", puzzle.market_emoji, puzzle.market_name),
                    goods: puzzle.goods.len(),
                    trades: puzzle.trades.len(),
                    par: puzzle.par,
                    max_trades: puzzle.max_trades,
                    early_window_trades: puzzle.early_window_trades,
                    shortest: verdict.shortest,
                    early_paths: verdict.early_paths,
                    solution_paths: verdict.solution_paths,
                });
            }
            Err(err) => {
                summary.failed += 1;
                info!("{day}: generation failed: {err}");
                summary.records.push(DateRecord {
                    date: day.to_string(),
                    difficulty: "-".to_string(),
                    market: "-".to_string(),
                    goods: 0,
                    trades: 0,
                    par: 0,
                    max_trades: 0,
                    early_window_trades: 0,
                    shortest: None,
                    early_paths: 0,
                    solution_paths: 0,
                });
            }
        }
    }

    match args.report.as_str() {
        "json" => print_json(&summary)?,
        _ => print_console(&summary),
    }

    if summary.failed > 0 {
        anyhow::bail!("{} of {} dates failed generation", summary.failed, args.days);
    }
    Ok(())
}

fn print_json(summary: &SweepSummary) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(summary).context("failed to serialize sweep report")?;
    println!("{rendered}");
    Ok(())
}

fn print_console(summary: &SweepSummary) {
    println!("{}", "Gazette barter sweep".bold());
    for record in &summary.records {
        let status = if record.shortest.is_some() {
            "OK".green()
        } else {
            "FAIL".red()
        };
        let shortest = record
            .shortest
            .map_or_else(|| "-".to_string(), |count| count.to_string());
        println!(
            "{status} {} {} {} par={} max={} shortest={} early_paths={} solutions={}",
            record.date.cyan(),
            record.difficulty,
            record.market,
            record.par,
            record.max_trades,
            shortest,
            record.early_paths,
            record.solution_paths,
        );
    }
    let tally = format!(
        "{} generated, {} failed",
        summary.generated, summary.failed
    );
    if summary.failed == 0 {
        println!("{}", tally.green().bold());
    } else {
        println!("{}", tally.red().bold());
    }
}
