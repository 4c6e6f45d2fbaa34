//! Merged View Tests
//!
//! Patch entries shadow base entries with the same SKU, and every SKU
//! appears exactly once.

use crate::common::*;

#[test]
fn patch_entry_shadows_base_entry() {
    let test = TestStore::with_base(vec![item(10, "Hats", "base ten"), item(11, "Hats", "eleven")]);
    let patch = vec![item(10, "Hats", "patched ten")];
    std::fs::write(test.patch_path(), serde_json::to_vec(&patch).unwrap()).unwrap();
    test.store.refresh().unwrap();

    let all = test.store.query(&CatalogQuery::all()).unwrap();

    assert_eq!(skus(&all), vec![10, 11]);
    assert_eq!(all[0].title(), "patched ten");
    assert!(test.store.is_from_patch(SkuId(10)).unwrap());
    assert!(!test.store.is_from_patch(SkuId(11)).unwrap());
}

#[test]
fn saving_fresh_sku_yields_exactly_one_entry() {
    let test = TestStore::with_base(vec![item(10, "Hats", "ten")]);

    test.store.save(&item(1000, "Hats", "new")).unwrap();
    test.store.save(&item(1000, "Hats", "newer")).unwrap();

    let all = test.store.query(&CatalogQuery::all()).unwrap();
    let hits: Vec<_> = all.iter().filter(|i| i.sku_id == SkuId(1000)).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title(), "newer");
    assert!(test.store.is_from_patch(SkuId(1000)).unwrap());
}

#[test]
fn categories_are_distinct_and_sorted() {
    let test = TestStore::with_base(vec![
        item(1, "Weapons", "a"),
        item(2, "Hats", "b"),
        item(3, "Weapons", "c"),
    ]);
    test.store.save(&item(1000, "Capes", "d")).unwrap();

    assert_eq!(
        test.store.categories().unwrap(),
        vec!["Capes", "Hats", "Weapons"]
    );
}

#[test]
fn provenance_reports_owning_store() {
    let test = TestStore::with_base(vec![item(10, "Hats", "ten")]);
    test.store.save(&item(1000, "Hats", "new")).unwrap();

    assert_eq!(test.store.provenance(SkuId(10)).unwrap(), Some(Provenance::Base));
    assert_eq!(test.store.provenance(SkuId(1000)).unwrap(), Some(Provenance::Patch));
    assert_eq!(test.store.provenance(SkuId(5)).unwrap(), None);
}

#[test]
fn opaque_info_links_survive_a_save() {
    let test = TestStore::new();
    let raw = r#"[{"SkuId": 1000, "Category": {"Name": "Hats", "Order": 0},
        "InfoLinks": [{"Url": "https://example.invalid/a"}],
        "Localizations": [{"LanguageId": "en_us", "Title": "x", "Price": 5}]}]"#;
    std::fs::write(test.patch_path(), raw).unwrap();
    test.store.refresh().unwrap();

    let mut loaded = test.store.get(SkuId(1000)).unwrap().unwrap();
    loaded.localizations[0].title = "renamed".into();
    test.store.save(&loaded).unwrap();

    let on_disk: serde_json::Value =
        serde_json::from_slice(&read_bytes(&test.patch_path())).unwrap();
    assert_eq!(on_disk[0]["InfoLinks"][0]["Url"], "https://example.invalid/a");
    assert_eq!(on_disk[0]["Localizations"][0]["Title"], "renamed");
}
