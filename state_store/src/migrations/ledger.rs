use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::Error;
use crate::{
    driver::{Reader, RocksDBDriver, Writer},
    serializer::{JsonEncode, JsonEncoder},
};

/// Column family reserved for applied migration records.
///
/// Migration actions must not use this name for their own data.
pub const MIGRATIONS_CF: &str = "migrations";

/// Proof that a migration ran successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub name: String,
    pub applied_at: SystemTime,
}

impl MigrationRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            applied_at: SystemTime::now(),
        }
    }

    pub fn key(&self) -> &[u8] {
        self.name.as_bytes()
    }
}

/// Persistence of applied migration names.
///
/// Any implementation honoring these contracts can back a
/// [`MigrationRunner`](super::MigrationRunner).
pub trait MigrationLedger {
    /// Names with an applied record, in no particular order.
    fn list_applied(&self, db: &RocksDBDriver) -> Result<Vec<String>, Error>;

    /// Record `name` as applied now, replacing any earlier record.
    fn mark_applied(&self, db: &RocksDBDriver, name: &str) -> Result<(), Error>;

    /// Full applied records, for reporting. Ledgers that don't keep
    /// timestamps may return nothing.
    fn applied_records(&self, _db: &RocksDBDriver) -> Result<Vec<MigrationRecord>, Error> {
        Ok(Vec::new())
    }
}

/// Default ledger. Stores one JSON encoded [`MigrationRecord`] per applied
/// migration in the [`MIGRATIONS_CF`] column family, keyed by the raw bytes
/// of its name.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLedger;

impl JsonLedger {
    fn ensure_column_family(db: &RocksDBDriver) -> Result<(), Error> {
        db.create_cf_if_missing(MIGRATIONS_CF)?;
        Ok(())
    }
}

impl MigrationLedger for JsonLedger {
    fn list_applied(&self, db: &RocksDBDriver) -> Result<Vec<String>, Error> {
        Ok(self
            .applied_records(db)?
            .into_iter()
            .map(|record| record.name)
            .collect())
    }

    fn mark_applied(&self, db: &RocksDBDriver, name: &str) -> Result<(), Error> {
        Self::ensure_column_family(db)?;

        let record = MigrationRecord::new(name);
        let serialized =
            JsonEncoder::encode(&record).map_err(|source| Error::Serialization { source })?;

        let txn = db.transaction();
        txn.put(MIGRATIONS_CF, record.key(), &serialized)?;
        txn.commit()?;

        Ok(())
    }

    fn applied_records(&self, db: &RocksDBDriver) -> Result<Vec<MigrationRecord>, Error> {
        Self::ensure_column_family(db)?;

        let mut records = Vec::new();
        for kv in db.iter(MIGRATIONS_CF)? {
            let (_key, value) = kv?;
            let record: MigrationRecord =
                JsonEncoder::decode(&value).map_err(|source| Error::Serialization { source })?;
            records.push(record);
        }

        Ok(records)
    }
}
