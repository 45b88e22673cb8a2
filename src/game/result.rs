//! Spin Results

use serde::{Serialize, Deserialize};

use crate::game::grid::{Cell, Grid};
use crate::game::symbol::SymbolId;

/// Payline index used for scatter wins at the boundary.
pub const SCATTER_LINE_INDEX: i32 = -1;

/// What a winning line was paid for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum WinKind {
    /// A configured payline, by index.
    Payline(usize),
    /// Scatter symbols anywhere on the grid.
    Scatter,
}

/// A single paid combination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningLine {
    /// Payline or scatter.
    pub kind: WinKind,
    /// Symbol credited.
    pub symbol: SymbolId,
    /// Run length (paylines) or symbol count (scatter).
    pub count: usize,
    /// Payout in bet-currency units.
    pub payout: u64,
    /// Cells forming the win.
    pub cells: Vec<Cell>,
}

impl WinningLine {
    /// Payline index, or [`SCATTER_LINE_INDEX`] for scatter wins.
    pub fn payline_index(&self) -> i32 {
        match self.kind {
            WinKind::Payline(index) => index as i32,
            WinKind::Scatter => SCATTER_LINE_INDEX,
        }
    }

    /// Is this a scatter win?
    pub fn is_scatter(&self) -> bool {
        matches!(self.kind, WinKind::Scatter)
    }
}

/// Scatter symbols found on the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatterOutcome {
    /// Scatter symbols anywhere on the grid.
    pub count: u32,
    /// Did the count reach the free-spin trigger?
    pub triggered_free_spins: bool,
}

/// Outcome of evaluating one grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinResult {
    /// The evaluated grid.
    pub grid: Grid,
    /// Reel stops the grid was drawn from (empty if evaluated directly).
    pub stops: Vec<u32>,
    /// Sum of all payouts.
    pub total_win: u64,
    /// Payline wins in configuration order, then the scatter win.
    pub winning_lines: Vec<WinningLine>,
    /// Scatter count and trigger.
    pub scatter: ScatterOutcome,
}

impl SpinResult {
    /// Paid anything?
    pub fn is_win(&self) -> bool {
        self.total_win > 0
    }

    /// Payline wins only.
    pub fn line_wins(&self) -> impl Iterator<Item = &WinningLine> {
        self.winning_lines.iter().filter(|l| !l.is_scatter())
    }

    /// The scatter win, if one was paid.
    pub fn scatter_win(&self) -> Option<&WinningLine> {
        self.winning_lines.iter().find(|l| l.is_scatter())
    }
}
