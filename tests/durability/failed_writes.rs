//! Failed Write Tests
//!
//! A write that fails part way leaves the previous document content in
//! place, byte for byte.

use crate::common::*;
use storecat::WriteGuard;
use storecat_durability::testing::{fail_after_writing, fail_immediately};

#[test]
fn failed_patch_write_keeps_previous_document() {
    let test = TestStore::new();
    test.store.save(&item(1000, "Hats", "kept")).unwrap();
    let before = read_bytes(&test.patch_path());

    let guard = WriteGuard::new().with_fsync(false);
    let result = guard.overwrite_with(
        &test.patch_path(),
        fail_after_writing(br#"[{"SkuId": 10"#.to_vec()),
    );

    assert!(result.is_err());
    assert_eq!(read_bytes(&test.patch_path()), before);
    assert!(!WriteGuard::temp_path(&test.patch_path()).exists());

    test.store.refresh().unwrap();
    assert_eq!(test.store.get(SkuId(1000)).unwrap().unwrap().title(), "kept");
}

#[test]
fn failed_base_write_keeps_previous_document() {
    let test = TestStore::with_base(vec![item(10, "Hats", "base")]);
    let before = read_bytes(&test.catalog_path());

    let guard = WriteGuard::new().with_fsync(false);
    let result = guard.overwrite_with(&test.catalog_path(), fail_immediately());

    assert!(result.is_err());
    assert_eq!(read_bytes(&test.catalog_path()), before);
}

#[test]
fn failed_write_maps_to_write_failed() {
    let test = TestStore::new();
    let guard = WriteGuard::new().with_fsync(false);

    let err: Error = guard
        .overwrite_with(&test.patch_path(), fail_immediately())
        .unwrap_err()
        .into();

    assert!(matches!(err, Error::WriteFailed { .. }));
    assert!(err.is_io());
}

#[test]
fn successful_write_leaves_backup_of_previous_content() {
    let test = TestStore::new();
    test.store.save(&item(1000, "Hats", "one")).unwrap();
    let before = read_bytes(&test.patch_path());

    test.store.save(&item(1001, "Hats", "two")).unwrap();

    assert_eq!(read_bytes(&test.store.paths().patch_backup()), before);
}
