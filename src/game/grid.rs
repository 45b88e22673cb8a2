//! Reel Grid
//!
//! Each reel stops at one uniformly drawn position on its strip and shows
//! the next `rows` symbols, wrapping around the end of the strip.

use serde::{Serialize, Deserialize};

use crate::core::rng::RandomSource;
use crate::game::config::GameConfig;
use crate::game::symbol::SymbolId;

/// A grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Reel (column) index.
    pub reel: usize,
    /// Row index, 0 at the top.
    pub row: usize,
}

impl Cell {
    /// Create a cell.
    pub const fn new(reel: usize, row: usize) -> Self {
        Self { reel, row }
    }
}

/// R x N matrix of symbols, stored column by column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    reels: usize,
    rows: usize,
    cells: Vec<SymbolId>,
}

impl Grid {
    /// Build from one column per reel. All columns must share a height.
    pub fn from_columns(columns: Vec<Vec<SymbolId>>) -> Option<Self> {
        let reels = columns.len();
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        if reels == 0 || rows == 0 || columns.iter().any(|c| c.len() != rows) {
            return None;
        }
        let cells = columns.into_iter().flatten().collect();
        Some(Self { reels, rows, cells })
    }

    /// Reel count.
    #[inline]
    pub fn reels(&self) -> usize {
        self.reels
    }

    /// Row count.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Symbol at `(reel, row)`.
    ///
    /// # Panics
    ///
    /// If the position is outside the grid. Validated paylines never are.
    #[inline]
    pub fn get(&self, reel: usize, row: usize) -> SymbolId {
        assert!(reel < self.reels && row < self.rows, "cell ({reel}, {row}) outside grid");
        self.cells[reel * self.rows + row]
    }

    /// Visible column of one reel.
    ///
    /// # Panics
    ///
    /// If `reel` is outside the grid.
    #[inline]
    pub fn column(&self, reel: usize) -> &[SymbolId] {
        let start = reel * self.rows;
        &self.cells[start..start + self.rows]
    }

    /// Iterate columns left to right.
    pub fn columns(&self) -> impl Iterator<Item = &[SymbolId]> {
        self.cells.chunks(self.rows)
    }

    /// Iterate every cell with its symbol, reel by reel.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, SymbolId)> + '_ {
        let rows = self.rows;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &symbol)| (Cell::new(i / rows, i % rows), symbol))
    }

    /// Cells holding `symbol`.
    pub fn positions_of(&self, symbol: SymbolId) -> Vec<Cell> {
        self.iter()
            .filter(|(_, s)| *s == symbol)
            .map(|(cell, _)| cell)
            .collect()
    }
}

/// Draw one stop per reel, each in `[0, strip length)`.
pub fn draw_stops<R: RandomSource + ?Sized>(config: &GameConfig, rng: &mut R) -> Vec<u32> {
    config
        .reel_strips
        .iter()
        .map(|strip| rng.next_int(strip.len() as u32))
        .collect()
}

/// Build the visible grid for a set of reel stops.
///
/// Stops are reduced modulo the strip length; a missing stop reads as 0.
pub fn grid_from_stops(config: &GameConfig, stops: &[u32]) -> Grid {
    let rows = config.rows;
    let mut cells = Vec::with_capacity(config.reels * rows);

    for (reel, strip) in config.reel_strips.iter().enumerate() {
        let stop = stops.get(reel).copied().unwrap_or(0) as usize;
        for row in 0..rows {
            cells.push(strip[(stop + row) % strip.len()]);
        }
    }

    Grid { reels: config.reels, rows, cells }
}

/// Draw a fresh grid from the reel strips.
pub fn generate_grid<R: RandomSource + ?Sized>(config: &GameConfig, rng: &mut R) -> Grid {
    let stops = draw_stops(config, rng);
    grid_from_stops(config, &stops)
}

// =============================================================================
// TESTS
// =============================================================================
