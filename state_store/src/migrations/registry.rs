use std::collections::HashMap;

use anyhow::Result;

use super::migration_trait::Migration;
use crate::driver::RocksDBDriver;

/// Maps migration names to their actions.
///
/// Registering a name twice replaces the earlier action. Insertion order is
/// not kept, the runner derives execution order from the names.
#[derive(Default)]
pub struct MigrationRegistry {
    migrations: HashMap<String, Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure as the action for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, up: F)
    where
        F: Fn(&RocksDBDriver) -> Result<()> + 'static,
    {
        self.register_migration(name, up);
    }

    /// Register any [`Migration`] implementation as the action for `name`.
    pub fn register_migration<M>(&mut self, name: impl Into<String>, migration: M)
    where
        M: Migration + 'static,
    {
        self.migrations.insert(name.into(), Box::new(migration));
    }

    /// Forget every registered migration.
    pub fn reset(&mut self) {
        self.migrations.clear();
    }

    pub fn get(&self, name: &str) -> Option<&dyn Migration> {
        self.migrations.get(name).map(|m| m.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.migrations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.migrations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over the registered migrations in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Migration)> {
        self.migrations
            .iter()
            .map(|(name, migration)| (name.as_str(), migration.as_ref()))
    }
}
