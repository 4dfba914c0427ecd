use anyhow::Result;

use crate::driver::RocksDBDriver;

/// Trait defining a database migration
///
/// The action receives the store handle and owns its transaction boundaries.
/// It must commit its own changes before returning `Ok`. An action that
/// succeeded but whose applied record could not be written runs again on the
/// next apply, so it should be safe to re-run.
pub trait Migration {
    fn apply(&self, db: &RocksDBDriver) -> Result<()>;
}

impl<F> Migration for F
where
    F: Fn(&RocksDBDriver) -> Result<()>,
{
    fn apply(&self, db: &RocksDBDriver) -> Result<()> {
        self(db)
    }
}
