//! Domain model for to-do records.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `TodoId`.
//! - Records are never mutated in place; only insert and delete exist.

pub mod todo;
