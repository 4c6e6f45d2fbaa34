//! Crash Recovery Tests
//!
//! Simulates a crash mid-write by leaving temp files behind, deleting the
//! document, or truncating it, then reopens the store.

use crate::common::*;
use std::fs;
use storecat::WriteGuard;

#[test]
fn stale_temp_file_removed_on_open() {
    let mut test = TestStore::new();
    test.store.save(&item(1000, "Hats", "kept")).unwrap();
    let temp = WriteGuard::temp_path(&test.patch_path());
    fs::write(&temp, b"[{\"SkuId\": 10").unwrap();

    test.reopen();

    assert!(!temp.exists());
    assert_eq!(test.store.get(SkuId(1000)).unwrap().unwrap().title(), "kept");
}

#[test]
fn missing_document_restored_from_backup() {
    let mut test = TestStore::new();
    test.store.save(&item(1000, "Hats", "one")).unwrap();
    test.store.save(&item(1001, "Hats", "two")).unwrap();
    // Crash between removing the document and renaming the temp file into place
    fs::remove_file(test.patch_path()).unwrap();
    fs::write(WriteGuard::temp_path(&test.patch_path()), b"[{\"SkuId\"").unwrap();

    test.reopen();

    assert!(test.patch_path().exists());
    assert!(test.store.get(SkuId(1000)).unwrap().is_some());
}

#[test]
fn truncated_document_reported_not_replaced() {
    let mut test = TestStore::with_base(vec![item(10, "Hats", "a"), item(20, "Hats", "b")]);
    let size = file_size(&test.catalog_path());
    truncate_file(&test.catalog_path(), size / 2);

    test.reopen();
    let err = test.store.query(&CatalogQuery::all()).unwrap_err();

    assert!(matches!(err, Error::Corrupt { .. }));
    assert_eq!(file_size(&test.catalog_path()), size / 2);
}

#[test]
fn reopen_after_many_writes_matches_last_state() {
    let mut test = TestStore::with_base(vec![item(10, "Hats", "base")]);
    for i in 0..20 {
        test.store.save(&item(1000 + i, "Hats", "x")).unwrap();
    }
    for i in 0..10 {
        assert!(test.store.delete(SkuId(1000 + i * 2)).unwrap());
    }
    let before = skus(&test.store.query(&CatalogQuery::all()).unwrap());

    test.reopen();

    assert_eq!(skus(&test.store.query(&CatalogQuery::all()).unwrap()), before);
}

#[test]
fn deliberately_removed_base_stays_removed() {
    let mut test = TestStore::with_base(vec![item(10, "Hats", "base")]);
    test.store.save(&item(10, "Hats", "edited")).unwrap();
    assert!(test.store.paths().catalog_backup().exists());
    // Switch the deployment to patch-only
    fs::remove_file(test.catalog_path()).unwrap();

    test.reopen();

    assert!(!test.catalog_path().exists());
    assert!(test.store.get(SkuId(10)).unwrap().is_none());
}
