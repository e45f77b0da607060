mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let events = dir.path().join("events.csv");
    common::write_events_csv(&events, &[["begin", "Main Canteen", "Idli x1 @20.00", ""]])?;

    let mut cmd = Command::new(cargo_bin!("canteen-checkout"));
    cmd.arg(&events).arg("--db-path").arg(dir.path().join("db"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."));

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let events = dir.path().join("events.csv");
    common::write_events_csv(&events, &[["begin", "Main Canteen", "Idli x1 @20.00", ""]])?;

    let mut cmd = Command::new(cargo_bin!("canteen-checkout"));
    cmd.arg(&events).arg("--db-path").arg(dir.path().join("db"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not());

    Ok(())
}
