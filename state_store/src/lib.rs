//! RocksDB backed state store with run-once migrations.

pub mod driver;
pub mod migrations;
pub mod serializer;

pub use driver::{open_database, Options, Reader, RocksDBDriver, Transaction, Writer};
pub use migrations::{
    Error as MigrationError,
    JsonLedger,
    Migration,
    MigrationLedger,
    MigrationRecord,
    MigrationRunner,
    MIGRATIONS_CF,
};
