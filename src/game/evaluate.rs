//! Spin Evaluation
//!
//! Pure, error-free evaluation of a grid against a validated config.
//!
//! ## Paylines
//!
//! For each payline in configuration order:
//! 1. Project the payline's row on each reel into a left-to-right sequence.
//! 2. The winning symbol is the first non-wild symbol, or wild if the
//!    whole line is wild.
//! 3. The run is the count of consecutive reels from reel 0 showing the
//!    winning symbol or wild. Wilds extend a run, they never bridge a gap.
//! 4. `multiplier(symbol, run) × bet` is paid when positive.
//!
//! ## Scatter
//!
//! Scatters count anywhere on the grid. Three or more pay
//! `multiplier(count) × bet` and trigger free spins.

#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::rng::RandomSource;
use crate::game::config::{GameConfig, SCATTER_TRIGGER_COUNT};
use crate::game::grid::{draw_stops, grid_from_stops, Cell, Grid};
use crate::game::result::{ScatterOutcome, SpinResult, WinKind, WinningLine};

/// Evaluate `grid` for a bet of `bet` units.
pub fn evaluate(grid: &Grid, bet: u64, config: &GameConfig) -> SpinResult {
    let mut winning_lines = Vec::new();
    let mut total_win = 0u64;

    for (index, rows) in config.paylines.iter().enumerate() {
        if let Some(line) = evaluate_payline(grid, index, rows, bet, config) {
            total_win = total_win.saturating_add(line.payout);
            winning_lines.push(line);
        }
    }

    let (scatter, scatter_line) = evaluate_scatter(grid, bet, config);
    if let Some(line) = scatter_line {
        total_win = total_win.saturating_add(line.payout);
        winning_lines.push(line);
    }

    SpinResult {
        grid: grid.clone(),
        stops: Vec::new(),
        total_win,
        winning_lines,
        scatter,
    }
}

/// Draw a grid and evaluate it.
pub fn spin<R: RandomSource + ?Sized>(config: &GameConfig, bet: u64, rng: &mut R) -> SpinResult {
    let stops = draw_stops(config, rng);
    let grid = grid_from_stops(config, &stops);
    let mut result = evaluate(&grid, bet, config);
    result.stops = stops;
    result
}

fn evaluate_payline(
    grid: &Grid,
    index: usize,
    rows: &[usize],
    bet: u64,
    config: &GameConfig,
) -> Option<WinningLine> {
    let wild = config.wild;
    let line = rows
        .iter()
        .enumerate()
        .map(|(reel, &row)| grid.get(reel, row));

    let symbol = line.clone().find(|&s| s != wild).unwrap_or(wild);
    let count = line.take_while(|&s| s == symbol || s == wild).count();

    let payout = config.line_multiplier(symbol, count).saturating_mul(bet);

    #[cfg(feature = "debug-tracing")]
    trace!(
        "payline {}: {} x{} -> {}",
        index,
        config.symbol_name(symbol),
        count,
        payout
    );

    if payout == 0 {
        return None;
    }

    let cells = rows
        .iter()
        .take(count)
        .enumerate()
        .map(|(reel, &row)| Cell::new(reel, row))
        .collect();

    Some(WinningLine {
        kind: WinKind::Payline(index),
        symbol,
        count,
        payout,
        cells,
    })
}

fn evaluate_scatter(
    grid: &Grid,
    bet: u64,
    config: &GameConfig,
) -> (ScatterOutcome, Option<WinningLine>) {
    let cells = grid.positions_of(config.scatter);
    let count = cells.len() as u32;
    let triggered = count >= SCATTER_TRIGGER_COUNT;

    let outcome = ScatterOutcome {
        count,
        triggered_free_spins: triggered,
    };
    if !triggered {
        return (outcome, None);
    }

    let payout = config.scatter_multiplier(count).saturating_mul(bet);
    if payout == 0 {
        return (outcome, None);
    }

    let line = WinningLine {
        kind: WinKind::Scatter,
        symbol: config.scatter,
        count: cells.len(),
        payout,
        cells,
    };
    (outcome, Some(line))
}

// =============================================================================
// TESTS
// =============================================================================
