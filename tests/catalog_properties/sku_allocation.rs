//! SKU Allocation Tests

use crate::common::*;

#[test]
fn empty_catalog_starts_at_floor() {
    let test = TestStore::new();
    assert_eq!(test.store.next_sku_id().unwrap(), SkuId(1000));
}

#[test]
fn small_legacy_ids_still_start_at_floor() {
    let test = TestStore::with_base(vec![item(1, "Hats", "a"), item(500, "Hats", "b")]);
    assert_eq!(test.store.next_sku_id().unwrap(), SkuId(1000));
}

#[test]
fn allocation_follows_maximum() {
    let test = TestStore::new();

    let first = test.store.next_sku_id().unwrap();
    test.store.save(&item(first.get(), "Hats", "one")).unwrap();
    let second = test.store.next_sku_id().unwrap();

    assert_eq!(first, SkuId(1000));
    assert_eq!(second, SkuId(1001));
}

#[test]
fn allocation_counts_base_and_patch() {
    let test = TestStore::with_base(vec![item(5000, "Hats", "base")]);
    test.store.save(&item(1200, "Hats", "patch")).unwrap();

    assert_eq!(test.store.next_sku_id().unwrap(), SkuId(5001));
}

#[test]
fn allocated_sku_is_not_in_catalog() {
    let test = TestStore::with_base(vec![item(1000, "Hats", "a"), item(1003, "Hats", "b")]);

    let next = test.store.next_sku_id().unwrap();

    assert!(test.store.get(next).unwrap().is_none());
}
