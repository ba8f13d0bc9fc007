//! Repository layer: mutation transactions and the full-scan reader.
//!
//! # Responsibility
//! - Define the storage contract the view synchronizer depends on.
//! - Keep SQL and transaction handling inside the persistence boundary.
//!
//! # Invariants
//! - Writes happen only inside read-write transactions that either commit
//!   completely or leave no trace.
//! - Reads never observe a transaction in progress.

pub mod cursor;
pub mod todo_repo;
pub mod tx;
