//! Entity structs for the audit trail.
//!
//! The audit subsystem never holds live ledger records — only value
//! snapshots and identifiers — so the one entity defined here is the
//! audit entry itself. The live records belong to the record store.

mod audit;

pub use audit::AuditEntry;
