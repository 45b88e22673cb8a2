//! Session Settlement
//!
//! Applies spin outcomes to player sessions.
//!
//! ## Module Structure
//!
//! - `state`: Per-session wallet and free-spin entitlement
//! - `store`: Snapshot persistence
//! - `manager`: Per-session locking, create/get/reset
//! - `settle`: The settlement state machine
//! - `protocol`: Request and settlement record types

pub mod state;
pub mod store;
pub mod manager;
pub mod settle;
pub mod protocol;

// Re-export key types
pub use state::{SessionId, SessionState};
pub use store::{MemorySessionStore, SessionStore, StoreError};
pub use manager::{SessionGuard, SessionManager};
pub use settle::{Settlement, SettlementConfig, SettlementError};
pub use protocol::{SettlementRecord, SpinRequest};
