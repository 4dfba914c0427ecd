//! Run-once migrations for the state store.
//!
//! Migrations are registered by name on a [`MigrationRunner`]. The runner asks
//! its [`MigrationLedger`] which names were already applied, runs the rest in
//! lexicographic name order, and records each one as applied right after its
//! action succeeds. The first failure stops the run and is returned as-is.
//!
//! Names are opaque strings. Pick a scheme where lexicographic order matches
//! the intended order, e.g. zero-padded prefixes like `0001_init`.

use crate::driver;

pub mod ledger;
pub mod migration_trait;
pub mod registry;
pub mod runner;
#[cfg(test)]
mod testing;

pub use ledger::{JsonLedger, MigrationLedger, MigrationRecord, MIGRATIONS_CF};
pub use migration_trait::Migration;
pub use registry::MigrationRegistry;
pub use runner::MigrationRunner;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store failed to create, read or write the ledger's column family.
    #[error(transparent)]
    Store(#[from] driver::Error),

    /// A migration record could not be encoded or decoded.
    #[error("Failed to encode or decode a migration record. error: {source}")]
    Serialization { source: anyhow::Error },

    /// The migration's own action failed. The action's error is kept
    /// untouched and can be downcast by the caller.
    #[error(transparent)]
    Action(anyhow::Error),
}
