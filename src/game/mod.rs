//! Spin Outcome Engine
//!
//! Pure, synchronous and deterministic given a random source.
//!
//! ## Module Structure
//!
//! - `symbol`: Dense symbol ids and the name table
//! - `config`: Configuration document and validated `GameConfig`
//! - `loader`: Configuration sources and the validated-config cache
//! - `grid`: Reel stops and the visible grid
//! - `evaluate`: Payline and scatter evaluation
//! - `result`: Spin results

pub mod symbol;
pub mod config;
pub mod loader;
pub mod grid;
pub mod evaluate;
pub mod result;

// Re-export key types
pub use symbol::{SymbolId, SymbolTable};
pub use config::{ConfigError, ConfigIssue, GameConfig, GameConfigDocument, SCATTER_TRIGGER_COUNT};
pub use loader::{ConfigSource, DirectorySource, GameConfigStore, MemorySource, SNOW_KINGDOM_ID};
pub use grid::{Cell, Grid, draw_stops, generate_grid, grid_from_stops};
pub use evaluate::{evaluate, spin};
pub use result::{ScatterOutcome, SpinResult, WinKind, WinningLine, SCATTER_LINE_INDEX};
