//! Spin Audit Trail
//!
//! One record per settled spin, queued after the session commit and
//! written by a background task.

pub mod record;
pub mod log;
pub mod verify;
pub mod writer;

pub use record::{AuditLine, AuditRecord};
pub use log::{AuditError, AuditSink, GameStats, JsonLinesAuditLog, MemoryAuditLog, TeeAuditSink};
pub use verify::{verify_record, VerificationError};
pub use writer::AuditWriter;
