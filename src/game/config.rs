//! Game Configuration
//!
//! A game variant arrives as a [`GameConfigDocument`] keyed by symbol
//! names. [`GameConfig::from_document`] validates every cross-reference
//! once and produces the immutable, id-based [`GameConfig`] the engine
//! runs on. A `GameConfig` that exists is a valid one.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Deserialize};

use crate::game::symbol::{SymbolId, SymbolTable, MAX_SYMBOLS};

/// Scatter count that triggers free spins.
pub const SCATTER_TRIGGER_COUNT: u32 = 3;

// =============================================================================
// DOCUMENT (boundary format)
// =============================================================================

/// Payout entry for one symbol in a configuration document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDocument {
    /// Consecutive-match count -> multiplier.
    #[serde(default)]
    pub payout: BTreeMap<u32, u64>,
}

/// Game configuration as stored on disk (JSON, camelCase, symbol names).
///
/// Every field defaults so that a missing field surfaces as a validation
/// issue naming the field instead of an opaque parse failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfigDocument {
    /// Display name.
    pub game_name: String,
    /// Reel count R.
    pub num_reels: usize,
    /// Visible rows N.
    pub num_rows: usize,
    /// Symbol name -> payout table.
    pub symbols: BTreeMap<String, SymbolDocument>,
    /// Wild symbol name.
    pub wild_symbol: String,
    /// Scatter symbol name.
    pub scatter_symbol: String,
    /// One cyclic strip per reel.
    pub reel_strips: Vec<Vec<String>>,
    /// Row index per reel, one entry per payline.
    pub paylines: Vec<Vec<usize>>,
    /// Scatter count -> multiplier.
    pub scatter_payout: BTreeMap<u32, u64>,
    /// Free spins awarded per trigger.
    pub free_spins_awarded: u32,
    /// Allowed bet denominations.
    pub bet_amounts: Vec<u64>,
}

impl GameConfigDocument {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// The specific invariant a configuration violates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    /// A required field is absent or empty.
    MissingField(&'static str),
    /// No symbols defined.
    NoSymbols,
    /// More symbols than a [`SymbolId`] can address.
    TooManySymbols(usize),
    /// No reel strips defined.
    NoReelStrips,
    /// `numReels` disagrees with the number of strips.
    ReelCountMismatch {
        /// Declared reel count.
        expected: usize,
        /// Strips present.
        actual: usize,
    },
    /// A strip cannot fill the visible rows.
    ReelTooShort {
        /// Reel index.
        reel: usize,
        /// Strip length.
        len: usize,
        /// Visible rows.
        rows: usize,
    },
    /// A strip references an undefined symbol.
    UnknownReelSymbol {
        /// Reel index.
        reel: usize,
        /// Offending name.
        symbol: String,
    },
    /// The wild designation is not in the symbol table.
    UnknownWild(String),
    /// The scatter designation is not in the symbol table.
    UnknownScatter(String),
    /// Wild and scatter name the same symbol.
    WildIsScatter(String),
    /// No paylines defined.
    NoPaylines,
    /// A payline does not have one row per reel.
    PaylineLength {
        /// Payline index.
        line: usize,
        /// Entries present.
        len: usize,
        /// Reel count.
        reels: usize,
    },
    /// A payline row is outside `0..numRows`.
    PaylineRow {
        /// Payline index.
        line: usize,
        /// Reel index.
        reel: usize,
        /// Offending row.
        row: usize,
        /// Visible rows.
        rows: usize,
    },
    /// No bet denominations.
    NoBetAmounts,
    /// A bet denomination of zero.
    ZeroBetAmount,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is not defined"),
            Self::NoSymbols => write!(f, "no symbols defined"),
            Self::TooManySymbols(n) => {
                write!(f, "{n} symbols defined, at most {MAX_SYMBOLS} supported")
            }
            Self::NoReelStrips => write!(f, "no reel strips defined"),
            Self::ReelCountMismatch { expected, actual } => {
                write!(f, "numReels is {expected} but {actual} reel strips are defined")
            }
            Self::ReelTooShort { reel, len, rows } => {
                write!(f, "reel {} has {len} symbols, fewer than {rows} rows", reel + 1)
            }
            Self::UnknownReelSymbol { reel, symbol } => {
                write!(f, "symbol '{symbol}' in reel {} is not defined in the symbols dictionary", reel + 1)
            }
            Self::UnknownWild(name) => {
                write!(f, "wild symbol '{name}' is not defined in the symbols dictionary")
            }
            Self::UnknownScatter(name) => {
                write!(f, "scatter symbol '{name}' is not defined in the symbols dictionary")
            }
            Self::WildIsScatter(name) => {
                write!(f, "'{name}' cannot be both wild and scatter")
            }
            Self::NoPaylines => write!(f, "no paylines defined"),
            Self::PaylineLength { line, len, reels } => {
                write!(f, "payline {line} has {len} entries, expected {reels}")
            }
            Self::PaylineRow { line, reel, row, rows } => {
                write!(f, "payline {line} uses row {row} on reel {reel}, only {rows} rows")
            }
            Self::NoBetAmounts => write!(f, "no bet amounts defined"),
            Self::ZeroBetAmount => write!(f, "bet amounts must be positive"),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration exists for the game id.
    #[error("game configuration not found: {0}")]
    NotFound(String),

    /// The configuration violates an invariant.
    #[error("invalid game configuration for {game_id}: {issue}")]
    Invalid {
        /// Game id.
        game_id: String,
        /// What is wrong.
        issue: ConfigIssue,
    },

    /// The document is not valid JSON for the schema.
    #[error("invalid JSON in game configuration for {game_id}: {source}")]
    Parse {
        /// Game id.
        game_id: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The document could not be read.
    #[error("failed to read game configuration for {game_id}: {source}")]
    Io {
        /// Game id.
        game_id: String,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Is this the "no configuration for this id" case?
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Is this a malformed or inconsistent configuration?
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. } | Self::Parse { .. })
    }
}

// =============================================================================
// VALIDATED CONFIG
// =============================================================================

/// Immutable, validated description of one game variant.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Game id this config was loaded under.
    pub game_id: String,
    /// Display name.
    pub name: String,
    /// Reel count R.
    pub reels: usize,
    /// Visible rows N.
    pub rows: usize,
    /// Name lookup for the boundary.
    pub symbols: SymbolTable,
    /// One cyclic strip per reel.
    pub reel_strips: Vec<Vec<SymbolId>>,
    /// Row index per reel, one entry per payline.
    pub paylines: Vec<Vec<usize>>,
    /// Wild symbol.
    pub wild: SymbolId,
    /// Scatter symbol.
    pub scatter: SymbolId,
    /// Free spins awarded per trigger.
    pub free_spins_awarded: u32,
    /// Allowed bet denominations (sorted, unique).
    pub bet_amounts: Vec<u64>,
    /// `line_pays[symbol][count]`, dense for `count` in `0..=reels`.
    line_pays: Vec<Vec<u64>>,
    /// Scatter count -> multiplier.
    scatter_pays: BTreeMap<u32, u64>,
}

impl GameConfig {
    /// Validate a document and build the engine representation.
    pub fn from_document(game_id: &str, doc: &GameConfigDocument) -> Result<Self, ConfigError> {
        build(game_id, doc).map_err(|issue| ConfigError::Invalid {
            game_id: game_id.to_string(),
            issue,
        })
    }

    /// Parse and validate a JSON document.
    pub fn from_json(game_id: &str, json: &str) -> Result<Self, ConfigError> {
        let doc = GameConfigDocument::from_json(json).map_err(|source| ConfigError::Parse {
            game_id: game_id.to_string(),
            source,
        })?;
        Self::from_document(game_id, &doc)
    }

    /// Line multiplier for `count` consecutive `symbol`s (0 if none).
    #[inline]
    pub fn line_multiplier(&self, symbol: SymbolId, count: usize) -> u64 {
        self.line_pays
            .get(symbol.index())
            .and_then(|pays| pays.get(count))
            .copied()
            .unwrap_or(0)
    }

    /// Scatter multiplier for `count` scatters.
    ///
    /// Counts absent from the table fall back to the highest configured
    /// multiplier. Returns 0 below [`SCATTER_TRIGGER_COUNT`].
    pub fn scatter_multiplier(&self, count: u32) -> u64 {
        if count < SCATTER_TRIGGER_COUNT {
            return 0;
        }
        match self.scatter_pays.get(&count) {
            Some(multiplier) => *multiplier,
            None => self.scatter_pays.values().copied().max().unwrap_or(0),
        }
    }

    /// Is `bet` one of the allowed denominations?
    pub fn is_allowed_bet(&self, bet: u64) -> bool {
        self.bet_amounts.binary_search(&bet).is_ok()
    }

    /// Symbol name for display/audit.
    #[inline]
    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.symbols.name(id)
    }
}

fn build(game_id: &str, doc: &GameConfigDocument) -> Result<GameConfig, ConfigIssue> {
    // Required fields
    if doc.wild_symbol.is_empty() {
        return Err(ConfigIssue::MissingField("wildSymbol"));
    }
    if doc.scatter_symbol.is_empty() {
        return Err(ConfigIssue::MissingField("scatterSymbol"));
    }
    if doc.symbols.is_empty() {
        return Err(ConfigIssue::NoSymbols);
    }
    if doc.reel_strips.is_empty() {
        return Err(ConfigIssue::NoReelStrips);
    }
    if doc.num_rows == 0 {
        return Err(ConfigIssue::MissingField("numRows"));
    }
    if doc.num_reels == 0 {
        return Err(ConfigIssue::MissingField("numReels"));
    }
    if doc.scatter_payout.is_empty() {
        return Err(ConfigIssue::MissingField("scatterPayout"));
    }
    if doc.free_spins_awarded == 0 {
        return Err(ConfigIssue::MissingField("freeSpinsAwarded"));
    }

    let symbols = SymbolTable::from_names(doc.symbols.keys().cloned())
        .ok_or(ConfigIssue::TooManySymbols(doc.symbols.len()))?;

    // Designations
    let wild = symbols
        .id(&doc.wild_symbol)
        .ok_or_else(|| ConfigIssue::UnknownWild(doc.wild_symbol.clone()))?;
    let scatter = symbols
        .id(&doc.scatter_symbol)
        .ok_or_else(|| ConfigIssue::UnknownScatter(doc.scatter_symbol.clone()))?;
    if wild == scatter {
        return Err(ConfigIssue::WildIsScatter(doc.wild_symbol.clone()));
    }

    // Reel strips
    if doc.reel_strips.len() != doc.num_reels {
        return Err(ConfigIssue::ReelCountMismatch {
            expected: doc.num_reels,
            actual: doc.reel_strips.len(),
        });
    }
    let mut reel_strips = Vec::with_capacity(doc.reel_strips.len());
    for (reel, strip) in doc.reel_strips.iter().enumerate() {
        let ids = strip
            .iter()
            .map(|name| {
                symbols.id(name).ok_or_else(|| ConfigIssue::UnknownReelSymbol {
                    reel,
                    symbol: name.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if ids.len() < doc.num_rows {
            return Err(ConfigIssue::ReelTooShort { reel, len: ids.len(), rows: doc.num_rows });
        }
        reel_strips.push(ids);
    }

    // Paylines
    if doc.paylines.is_empty() {
        return Err(ConfigIssue::NoPaylines);
    }
    for (line, rows) in doc.paylines.iter().enumerate() {
        if rows.len() != doc.num_reels {
            return Err(ConfigIssue::PaylineLength { line, len: rows.len(), reels: doc.num_reels });
        }
        if let Some((reel, &row)) = rows.iter().enumerate().find(|(_, row)| **row >= doc.num_rows) {
            return Err(ConfigIssue::PaylineRow { line, reel, row, rows: doc.num_rows });
        }
    }

    // Bets
    if doc.bet_amounts.is_empty() {
        return Err(ConfigIssue::NoBetAmounts);
    }
    if doc.bet_amounts.contains(&0) {
        return Err(ConfigIssue::ZeroBetAmount);
    }
    let mut bet_amounts = doc.bet_amounts.clone();
    bet_amounts.sort_unstable();
    bet_amounts.dedup();

    // Dense line pays; counts above the reel count can never occur.
    let line_pays = symbols
        .iter()
        .map(|(_, name)| {
            let mut pays = vec![0u64; doc.num_reels + 1];
            if let Some(entry) = doc.symbols.get(name) {
                for (&count, &multiplier) in &entry.payout {
                    if let Some(slot) = pays.get_mut(count as usize) {
                        *slot = multiplier;
                    }
                }
            }
            pays
        })
        .collect();

    let name = if doc.game_name.is_empty() {
        game_id.to_string()
    } else {
        doc.game_name.clone()
    };

    Ok(GameConfig {
        game_id: game_id.to_string(),
        name,
        reels: doc.num_reels,
        rows: doc.num_rows,
        symbols,
        reel_strips,
        paylines: doc.paylines.clone(),
        wild,
        scatter,
        free_spins_awarded: doc.free_spins_awarded,
        bet_amounts,
        line_pays,
        scatter_pays: doc.scatter_payout.clone(),
    })
}

// =============================================================================
// TESTS
// =============================================================================
