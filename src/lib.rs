//! # Snow Kingdom Server
//!
//! Slot spin outcome engine and session settlement for Snow Kingdom.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SNOW KINGDOM SERVER                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                 │
//! │  ├── money.rs    - Fixed-point currency (minor units)       │
//! │  ├── rng.rs      - Random sources, Xorshift128+             │
//! │  └── hash.rs     - Outcome hashing for audit                │
//! │                                                             │
//! │  game/           - Outcome engine (pure, synchronous)       │
//! │  ├── symbol.rs   - Symbol ids and names                     │
//! │  ├── config.rs   - Game configuration and validation        │
//! │  ├── loader.rs   - Config sources and cache                 │
//! │  ├── grid.rs     - Reel stops and visible grid              │
//! │  ├── evaluate.rs - Payline and scatter evaluation           │
//! │  └── result.rs   - Spin results                             │
//! │                                                             │
//! │  session/        - Settlement (async, per-session locks)    │
//! │  ├── state.rs    - Session state                            │
//! │  ├── store.rs    - Session persistence                      │
//! │  ├── manager.rs  - Session lifecycle and locking            │
//! │  ├── settle.rs   - Settlement state machine                 │
//! │  └── protocol.rs - Request/record types                     │
//! │                                                             │
//! │  audit/          - Audit trail                              │
//! │  ├── record.rs   - Audit records                            │
//! │  ├── log.rs      - Sinks, history, stats                    │
//! │  ├── verify.rs   - Replay verification                      │
//! │  └── writer.rs   - Background audit writer                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given a validated config and the same random draws, `game/` produces
//! **identical results** on any platform:
//! - No floating-point arithmetic in payouts or balances
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - All randomness through the `RandomSource` capability

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod session;
pub mod audit;

// Re-export commonly used types
pub use core::money::Money;
pub use core::rng::{DeterministicRng, RandomSource};
pub use game::config::GameConfig;
pub use game::result::SpinResult;
pub use session::settle::{Settlement, SettlementConfig, SettlementError};
pub use session::protocol::{SettlementRecord, SpinRequest};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
