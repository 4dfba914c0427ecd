//! Migrations shipped with the binary.

use anyhow::Result;
use state_store::{Migration, MigrationRunner, Reader, RocksDBDriver, Writer};
use tracing::info;

pub const EVENTS_CF: &str = "events";

const EVENT_KINDS: [&str; 3] = ["created", "updated", "deleted"];

pub fn register(runner: &mut MigrationRunner) {
    runner
        .register("0001_init", |db| {
            db.create_cf_if_missing(EVENTS_CF)?;
            Ok(())
        })
        .register_migration("0002_seed_event_kinds", SeedEventKinds);
}

/// Seeds the known event kinds. Keys that already exist are kept, so running
/// it again is harmless.
struct SeedEventKinds;

impl Migration for SeedEventKinds {
    fn apply(&self, db: &RocksDBDriver) -> Result<()> {
        let txn = db.transaction();
        let mut seeded = 0;
        for kind in EVENT_KINDS {
            let key = format!("kind/{kind}");
            if txn.get(EVENTS_CF, &key)?.is_none() {
                txn.put(EVENTS_CF, &key, kind)?;
                seeded += 1;
            }
        }
        txn.commit()?;

        info!(seeded, "seeded event kinds");
        Ok(())
    }
}

/// Number of event kinds currently stored.
pub fn count_event_kinds(db: &RocksDBDriver) -> Result<usize> {
    let mut count = 0;
    for kv in db.iter(EVENTS_CF)? {
        let (key, _) = kv?;
        if key.starts_with(b"kind/") {
            count += 1;
        }
    }
    Ok(count)
}
