use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use rocksdb::{
    BoundColumnFamily,
    ColumnFamilyDescriptor,
    MultiThreaded,
    TransactionDB,
    TransactionDBOptions,
    DB,
};
pub use rocksdb::{IteratorMode, Options as RocksDBOptions};
use tracing::{debug, warn};

use crate::driver::{Driver, Error as DriverError, KVBytes, Reader, Writer};

type TransactionDb = TransactionDB<MultiThreaded>;

/// Options to start a connection with RocksDB.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub path: PathBuf,
    /// Column families created when missing. Column families that already
    /// exist on disk are always opened, listed here or not.
    pub column_families: Vec<String>,
}

/// Driver to connect with a RocksDB database.
///
/// Column families are opened in multi-threaded mode so they can be created
/// through a shared reference while migrations run.
pub struct RocksDBDriver {
    db: TransactionDb,
    path: PathBuf,
}

impl RocksDBDriver {
    /// Open a new connection with a RocksDB database.
    pub fn open(driver_options: Options) -> Result<RocksDBDriver, DriverError> {
        let mut db_opts = RocksDBOptions::default();
        db_opts.create_missing_column_families(true);
        db_opts.create_if_missing(true);

        let mut column_families = existing_column_families(&db_opts, &driver_options.path);
        for name in driver_options.column_families {
            if !column_families.contains(&name) {
                column_families.push(name);
            }
        }

        let descriptors = column_families
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(name, RocksDBOptions::default()));

        let db = TransactionDb::open_cf_descriptors(
            &db_opts,
            &TransactionDBOptions::default(),
            &driver_options.path,
            descriptors,
        )
        .map_err(|source| DriverError::OpenDatabaseFailed {
            path: driver_options.path.clone(),
            source,
        })?;

        debug!(
            path = %driver_options.path.display(),
            column_families = ?column_families,
            "opened rocksdb state store"
        );

        Ok(RocksDBDriver {
            db,
            path: driver_options.path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List the column families persisted on disk.
    pub fn list_cfs(&self) -> Result<Vec<String>, DriverError> {
        DB::list_cf(&RocksDBOptions::default(), &self.path).map_err(Into::into)
    }

    fn column_family(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>, DriverError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| DriverError::MissingColumnFamily {
                name: name.to_string(),
            })
    }
}

/// A fresh path has no column families yet, listing them fails and we start
/// from an empty set.
fn existing_column_families(db_opts: &RocksDBOptions, path: &Path) -> Vec<String> {
    DB::list_cf(db_opts, path).unwrap_or_default()
}

impl Writer for RocksDBDriver {
    fn transaction(&self) -> Transaction<'_> {
        Transaction {
            driver: self,
            tx: self.db.transaction(),
        }
    }

    fn put<N, K, V>(&self, cf: N, key: K, value: V) -> Result<(), DriverError>
    where
        N: AsRef<str>,
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let cf = self.column_family(cf.as_ref())?;
        self.db.put_cf(&cf, key, value).map_err(Into::into)
    }

    fn create_cf_if_missing<N>(&self, cf: N) -> Result<(), DriverError>
    where
        N: AsRef<str>,
    {
        let name = cf.as_ref();
        if self.db.cf_handle(name).is_some() {
            return Ok(());
        }

        match self.db.create_cf(name, &RocksDBOptions::default()) {
            Ok(()) => {
                debug!(column_family = name, "created column family");
                Ok(())
            }
            // Lost a race against another writer creating the same column family.
            Err(_) if self.db.cf_handle(name).is_some() => {
                warn!(column_family = name, "column family was created concurrently");
                Ok(())
            }
            Err(source) => Err(source.into()),
        }
    }
}

impl Reader for RocksDBDriver {
    fn get<N, K>(&self, cf: N, key: K) -> Result<Option<Vec<u8>>, DriverError>
    where
        N: AsRef<str>,
        K: AsRef<[u8]>,
    {
        let cf = self.column_family(cf.as_ref())?;
        self.db.get_cf(&cf, key).map_err(Into::into)
    }

    fn has_cf<N>(&self, cf: N) -> bool
    where
        N: AsRef<str>,
    {
        self.db.cf_handle(cf.as_ref()).is_some()
    }

    fn iter<N>(
        &self,
        cf: N,
    ) -> Result<impl Iterator<Item = Result<KVBytes, DriverError>> + '_, DriverError>
    where
        N: AsRef<str>,
    {
        let cf = self.column_family(cf.as_ref())?;
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        Ok(iter.map(|item| item.map_err(Into::into)))
    }
}

impl Driver for RocksDBDriver {}

/// Read-write transaction bound to the driver that created it.
pub struct Transaction<'db> {
    driver: &'db RocksDBDriver,
    tx: rocksdb::Transaction<'db, TransactionDb>,
}

impl<'db> Transaction<'db> {
    pub fn commit(self) -> Result<(), DriverError> {
        self.tx.commit().map_err(Into::into)
    }

    pub fn get<N, K>(&self, cf: N, key: K) -> Result<Option<Vec<u8>>, DriverError>
    where
        N: AsRef<str>,
        K: AsRef<[u8]>,
    {
        let cf = self.driver.column_family(cf.as_ref())?;
        self.tx.get_cf(&cf, key).map_err(Into::into)
    }

    pub fn put<N, K, V>(&self, cf: N, key: K, value: V) -> Result<(), DriverError>
    where
        N: AsRef<str>,
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let cf = self.driver.column_family(cf.as_ref())?;
        self.tx.put_cf(&cf, key, value).map_err(Into::into)
    }

    pub fn delete<N, K>(&self, cf: N, key: K) -> Result<(), DriverError>
    where
        N: AsRef<str>,
        K: AsRef<[u8]>,
    {
        let cf = self.driver.column_family(cf.as_ref())?;
        self.tx.delete_cf(&cf, key).map_err(Into::into)
    }
}
