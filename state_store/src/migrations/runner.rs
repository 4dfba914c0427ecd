use std::collections::HashSet;

use anyhow::Result as AnyResult;
use tracing::{debug, info};

use super::{
    ledger::{JsonLedger, MigrationLedger, MigrationRecord},
    migration_trait::Migration,
    registry::MigrationRegistry,
    Error,
};
use crate::driver::RocksDBDriver;

/// Applies registered migrations that the ledger has no record of.
///
/// Each runner owns its registry and ledger, so independent runners can
/// target different stores in the same process.
pub struct MigrationRunner<L = JsonLedger> {
    registry: MigrationRegistry,
    ledger: L,
}

impl MigrationRunner<JsonLedger> {
    pub fn new() -> Self {
        Self::with_ledger(JsonLedger)
    }
}

impl Default for MigrationRunner<JsonLedger> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: MigrationLedger> MigrationRunner<L> {
    pub fn with_ledger(ledger: L) -> Self {
        Self {
            registry: MigrationRegistry::new(),
            ledger,
        }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, up: F) -> &mut Self
    where
        F: Fn(&RocksDBDriver) -> AnyResult<()> + 'static,
    {
        self.registry.register(name, up);
        self
    }

    pub fn register_migration<M>(&mut self, name: impl Into<String>, migration: M) -> &mut Self
    where
        M: Migration + 'static,
    {
        self.registry.register_migration(name, migration);
        self
    }

    /// Clear the registry. Applied records are left alone.
    pub fn reset(&mut self) {
        self.registry.reset();
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Names of registered migrations without an applied record, sorted
    /// lexicographically.
    ///
    /// A ledger failure is returned unchanged.
    pub fn pending_names(&self, db: &RocksDBDriver) -> Result<Vec<String>, Error> {
        Ok(self
            .pending(db)?
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect())
    }

    fn pending(&self, db: &RocksDBDriver) -> Result<Vec<(&str, &dyn Migration)>, Error> {
        let applied: HashSet<String> = self.ledger.list_applied(db)?.into_iter().collect();

        let mut pending: Vec<(&str, &dyn Migration)> = self
            .registry
            .iter()
            .filter(|(name, _)| !applied.contains(*name))
            .collect();
        pending.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

        debug!(
            registered = self.registry.len(),
            applied = applied.len(),
            pending = pending.len(),
            "computed pending migrations"
        );

        Ok(pending)
    }

    /// Run every pending migration in order and record each one as applied
    /// right after its action succeeds.
    ///
    /// Stops at the first failure and returns it. Migrations after the failing
    /// one are left pending. If the action succeeded but recording it failed,
    /// the action's changes stay in the store and the migration runs again on
    /// the next call.
    ///
    /// Returns the names that were applied by this call.
    #[tracing::instrument(skip_all, fields(path = %db.path().display()))]
    pub fn apply(&self, db: &RocksDBDriver) -> Result<Vec<String>, Error> {
        let pending = self.pending(db)?;

        if pending.is_empty() {
            info!("no pending migrations");
            return Ok(Vec::new());
        }

        info!("applying {} pending migrations", pending.len());

        let mut applied = Vec::with_capacity(pending.len());
        for (name, migration) in pending {
            info!(migration = name, "running migration");

            migration.apply(db).map_err(Error::Action)?;
            self.ledger.mark_applied(db, name)?;

            applied.push(name.to_string());
        }

        info!("completed {} migrations", applied.len());
        Ok(applied)
    }

    /// Applied records known to the ledger, sorted by name.
    pub fn applied_records(&self, db: &RocksDBDriver) -> Result<Vec<MigrationRecord>, Error> {
        let mut records = self.ledger.applied_records(db)?;
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}
