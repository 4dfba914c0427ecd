use std::{collections::BTreeSet, sync::Mutex};

use anyhow::Result;
use tempfile::TempDir;

use super::{ledger::MigrationLedger, runner::MigrationRunner, Error};
use crate::driver::{self, Options, RocksDBDriver};

/// Open a RocksDB driver in a fresh temporary directory. Keep the `TempDir`
/// alive for as long as the driver is used.
pub fn temp_driver() -> Result<(TempDir, RocksDBDriver)> {
    let temp_dir = TempDir::new()?;
    let db = driver::open_database(Options {
        path: temp_dir.path().to_path_buf(),
        column_families: Vec::new(),
    })?;
    Ok((temp_dir, db))
}

/// A more complete test utility that prepares column families and data
/// before running a migration runner against a temporary database.
pub struct MigrationTestBuilder {
    column_families: Vec<String>,
}

impl MigrationTestBuilder {
    pub fn new() -> Self {
        Self {
            column_families: Vec::new(),
        }
    }

    /// Add column families to create initially
    pub fn with_column_family(mut self, cf_name: &str) -> Self {
        self.column_families.push(cf_name.to_string());
        self
    }

    /// Run the test with the given runner and setup/verify functions
    pub fn run_test<L, S, V>(self, runner: &MigrationRunner<L>, setup: S, verify: V) -> Result<()>
    where
        L: MigrationLedger,
        S: FnOnce(&RocksDBDriver) -> Result<()>,
        V: FnOnce(&RocksDBDriver, Vec<String>) -> Result<()>,
    {
        let temp_dir = TempDir::new()?;
        let db = driver::open_database(Options {
            path: temp_dir.path().to_path_buf(),
            column_families: self.column_families,
        })?;

        setup(&db)?;

        let applied = runner.apply(&db)?;

        verify(&db, applied)
    }
}

/// In-memory ledger with failure injection.
#[derive(Default)]
pub struct InMemoryLedger {
    applied: Mutex<BTreeSet<String>>,
    fail_list: Option<String>,
    fail_mark: Option<String>,
}

impl InMemoryLedger {
    pub fn with_applied<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            applied: Mutex::new(names.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Make `list_applied` fail with a serialization error carrying `msg`.
    pub fn failing_list(mut self, msg: &str) -> Self {
        self.fail_list = Some(msg.to_string());
        self
    }

    /// Make `mark_applied` fail for the given name.
    pub fn failing_mark(mut self, name: &str) -> Self {
        self.fail_mark = Some(name.to_string());
        self
    }

    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().unwrap().iter().cloned().collect()
    }
}

impl MigrationLedger for InMemoryLedger {
    fn list_applied(&self, _db: &RocksDBDriver) -> Result<Vec<String>, Error> {
        if let Some(msg) = &self.fail_list {
            return Err(Error::Serialization {
                source: anyhow::anyhow!(msg.clone()),
            });
        }
        // Reverse order, callers must not rely on it.
        Ok(self.applied().into_iter().rev().collect())
    }

    fn mark_applied(&self, _db: &RocksDBDriver, name: &str) -> Result<(), Error> {
        if self.fail_mark.as_deref() == Some(name) {
            return Err(Error::Store(driver::Error::MissingColumnFamily {
                name: "migrations".to_string(),
            }));
        }
        self.applied.lock().unwrap().insert(name.to_string());
        Ok(())
    }
}
