//! # rew-core
//!
//! Core types for Rewind, the change-tracking and undo engine of the
//! ledger. This crate provides the foundational types shared across all
//! Rewind crates:
//! - Value snapshots (point-in-time field captures of a record)
//! - The audit entry struct and its shape invariants
//! - Action and entity-kind enums
//! - CLI/API response types

pub mod entities;
pub mod enums;
pub mod responses;
pub mod snapshot;
