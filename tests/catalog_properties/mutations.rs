//! Mutation Tests
//!
//! Saves route to the store that owns the item, deletes of absent SKUs
//! write nothing, and a save/delete pair leaves the patch as it was.

use crate::common::*;

#[test]
fn base_edit_keeps_document_position() {
    let test = TestStore::with_base(vec![
        item(10, "Hats", "first"),
        item(20, "Hats", "second"),
        item(30, "Hats", "third"),
    ]);

    let target = test.store.save(&item(20, "Hats", "edited")).unwrap();
    assert_eq!(target, Provenance::Base);

    let doc: CatalogDocument =
        serde_json::from_slice(&read_bytes(&test.catalog_path())).unwrap();
    assert_eq!(skus(&doc.entries), vec![10, 20, 30]);
    assert_eq!(doc.entries[1].title(), "edited");
    assert_ne!(doc.timestamp_seconds, 1_700_000_000);
}

#[test]
fn base_edit_keeps_undeclared_fields_of_every_entry() {
    let test = TestStore::new();
    let raw = r#"{
        "Version": 7,
        "TimestampSeconds": 1700000000,
        "Entries": [
            {"SkuId": 10, "Type": "Bundle", "Category": {"Name": "Hats"},
             "Localizations": [{"LanguageId": "en_us", "Title": "ten", "Price": 5}]},
            {"SkuId": 20, "Extra": 123, "Category": {"Name": "Hats"},
             "Localizations": [{"LanguageId": "en_us", "Title": "twenty", "Price": 5}]}
        ]
    }"#;
    std::fs::write(test.catalog_path(), raw).unwrap();
    test.store.refresh().unwrap();

    let mut edited = test.store.get(SkuId(10)).unwrap().unwrap();
    edited.localizations[0].title = "edited".into();
    assert_eq!(test.store.save(&edited).unwrap(), Provenance::Base);

    let on_disk: serde_json::Value =
        serde_json::from_slice(&read_bytes(&test.catalog_path())).unwrap();
    assert_eq!(on_disk["Version"], 7);
    assert_eq!(on_disk["Entries"][0]["Type"], "Bundle");
    assert_eq!(on_disk["Entries"][0]["Localizations"][0]["Title"], "edited");
    assert_eq!(on_disk["Entries"][1]["Extra"], 123);
}

#[test]
fn base_edit_never_writes_patch() {
    let test = TestStore::with_base(vec![item(10, "Hats", "first")]);
    let patch_before = read_bytes(&test.patch_path());

    test.store.save(&item(10, "Hats", "edited")).unwrap();

    assert_eq!(read_bytes(&test.patch_path()), patch_before);
    assert!(!test.store.is_from_patch(SkuId(10)).unwrap());
}

#[test]
fn deleting_absent_sku_writes_nothing() {
    let test = TestStore::with_base(vec![item(10, "Hats", "first")]);
    test.store.save(&item(1000, "Hats", "patched")).unwrap();
    let catalog_bytes = read_bytes(&test.catalog_path());
    let patch_bytes = read_bytes(&test.patch_path());
    let catalog_bak = mtime(&test.store.paths().catalog_backup());
    let patch_bak = mtime(&test.store.paths().patch_backup());

    assert!(!test.store.delete(SkuId(4242)).unwrap());

    assert_eq!(read_bytes(&test.catalog_path()), catalog_bytes);
    assert_eq!(read_bytes(&test.patch_path()), patch_bytes);
    assert_eq!(mtime(&test.store.paths().catalog_backup()), catalog_bak);
    assert_eq!(mtime(&test.store.paths().patch_backup()), patch_bak);
}

#[test]
fn save_then_delete_restores_patch_bytes() {
    let test = TestStore::new();
    test.store.save(&item(1000, "Hats", "kept")).unwrap();
    let before = read_bytes(&test.patch_path());

    test.store.save(&item(1001, "Hats", "temporary")).unwrap();
    assert!(test.store.delete(SkuId(1001)).unwrap());

    assert_eq!(read_bytes(&test.patch_path()), before);
}

#[test]
fn delete_removes_base_entry_and_keeps_order() {
    let test = TestStore::with_base(vec![
        item(10, "Hats", "a"),
        item(20, "Hats", "b"),
        item(30, "Hats", "c"),
    ]);

    assert!(test.store.delete(SkuId(20)).unwrap());

    let all = test.store.query(&CatalogQuery::all()).unwrap();
    assert_eq!(skus(&all), vec![10, 30]);
}

#[test]
fn update_modifiers_leaves_other_fields_alone() {
    let test = TestStore::with_base(vec![item(10, "Hats", "on disk")]);

    let edit = item(10, "Hats", "stale title").with_modifier("Sale", 1);
    assert!(test.store.update_modifiers(&edit).unwrap());

    let stored = test.store.get(SkuId(10)).unwrap().unwrap();
    assert_eq!(stored.title(), "on disk");
    assert_eq!(stored.modifiers.len(), 1);
    assert_eq!(stored.modifiers[0].name, "Sale");
}

#[test]
fn update_modifiers_of_absent_sku_is_false() {
    let test = TestStore::new();
    let edit = item(77, "Hats", "x").with_modifier("Sale", 1);

    assert!(!test.store.update_modifiers(&edit).unwrap());
}

#[test]
fn mutations_survive_reopen() {
    let mut test = TestStore::with_base(vec![item(10, "Hats", "base")]);
    test.store.save(&item(1000, "Hats", "patched")).unwrap();
    test.store.save(&item(10, "Hats", "edited")).unwrap();

    test.reopen();

    assert_eq!(test.store.get(SkuId(1000)).unwrap().unwrap().title(), "patched");
    assert_eq!(test.store.get(SkuId(10)).unwrap().unwrap().title(), "edited");
    assert!(test.store.is_from_patch(SkuId(1000)).unwrap());
}
