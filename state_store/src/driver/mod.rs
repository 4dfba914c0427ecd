//! The driver module centralizes the logic for
//! reading and writing data in the state store.
//!
//! It defines the read and write traits the migration
//! engine relies on, and the RocksDB driver that
//! implements them.

use std::path::PathBuf;

pub mod rocksdb;
pub use self::rocksdb::{Options, RocksDBDriver, Transaction};

pub type KVBytes = (Box<[u8]>, Box<[u8]>);

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Failed to open RocksDB database at {}. error: {source}", .path.display())]
    OpenDatabaseFailed {
        path: PathBuf,
        source: ::rocksdb::Error,
    },

    #[error("Column family {name} does not exist")]
    MissingColumnFamily { name: String },

    #[error(transparent)]
    RocksDBFailure {
        #[from]
        source: ::rocksdb::Error,
    },
}

/// Writer defines all the write operations for a given driver.
pub trait Writer {
    /// Start a new read-write transaction in the database.
    ///
    /// Dropping the transaction without committing it rolls it back.
    fn transaction(&self) -> Transaction<'_>;

    /// Write a single key outside of an explicit transaction.
    fn put<N, K, V>(&self, cf: N, key: K, value: V) -> Result<(), Error>
    where
        N: AsRef<str>,
        K: AsRef<[u8]>,
        V: AsRef<[u8]>;

    /// Create a column family unless it already exists.
    fn create_cf_if_missing<N>(&self, cf: N) -> Result<(), Error>
    where
        N: AsRef<str>;
}

/// Reader defines all the read operations for a given driver.
pub trait Reader {
    // Get an item from the database.
    fn get<N, K>(&self, cf: N, key: K) -> Result<Option<Vec<u8>>, Error>
    where
        N: AsRef<str>,
        K: AsRef<[u8]>;

    fn has_cf<N>(&self, cf: N) -> bool
    where
        N: AsRef<str>;

    /// Iterate over every Key/Value pair of a column family, in key order.
    fn iter<N>(&self, cf: N) -> Result<impl Iterator<Item = Result<KVBytes, Error>> + '_, Error>
    where
        N: AsRef<str>;
}

/// Driver defines all the operations a database driver needs to support.
/// It combines Writer + Reader to make implementing a driver more ergonomic.
pub trait Driver: Writer + Reader {}

/// Open a connection to a database.
///
/// This is the main entry point to get a store handle that migrations
/// run against. The caller owns the handle and decides when to close it.
pub fn open_database(options: Options) -> Result<RocksDBDriver, Error> {
    RocksDBDriver::open(options)
}
