//! Lock Contention Tests
//!
//! A writer that cannot get the store lock in time gets `Error::Busy`.
//! Reads served from a fresh cache are never blocked.

use crate::common::*;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn waiting_writer_proceeds_when_lock_frees() {
    let test = TestStore::with_config(
        CatalogConfig::for_testing().with_lock_timeout(Duration::from_secs(10)),
    );
    let store = &test.store;

    thread::scope(|s| {
        let (started_tx, started_rx) = mpsc::channel();
        s.spawn(move || {
            started_tx.send(()).unwrap();
            store.save(&item(1000, "Hats", "first")).unwrap();
        });
        started_rx.recv().unwrap();
        store.save(&item(1001, "Hats", "second")).unwrap();
    });

    assert_eq!(store.view().unwrap().len(), 2);
}

#[test]
fn busy_is_distinct_from_not_found() {
    let err = Error::Busy {
        waited: Duration::from_millis(5),
    };
    assert!(err.is_busy());
    assert!(!err.is_io());
    assert!(!Error::NotFound(SkuId(1)).is_busy());
}

#[test]
fn fresh_reads_do_not_wait_on_writers() {
    let test = TestStore::new();
    test.store.save(&item(1000, "Hats", "x")).unwrap();
    test.store.wait_for_background();
    test.store.view().unwrap();

    let started = Instant::now();
    for _ in 0..100 {
        assert_eq!(test.store.query(&CatalogQuery::all()).unwrap().len(), 1);
    }

    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn parallel_queries_share_one_snapshot() {
    let entries: Vec<CatalogItem> = (0..500)
        .map(|i| priced(i + 1, if i % 2 == 0 { "Hats" } else { "Capes" }, "x", i as i32))
        .collect();
    let test = TestStore::with_base(entries);
    let store = &test.store;

    let counts: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(move || store.query(&CatalogQuery::new("Hats", "")).unwrap().len()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(counts.iter().all(|&c| c == 250));
}

fn fail_fast_store_with_bulk_base(entries: u64) -> TestStore {
    let dir = tempfile::tempdir().unwrap();
    write_base(
        dir.path(),
        (1..=entries).map(|sku| item(sku, "Hats", "bulk")).collect(),
    );
    init_tracing();
    let config = CatalogConfig::for_testing().with_lock_timeout(Duration::ZERO);
    let store = CatalogStore::open_with_config(dir.path(), config.clone()).unwrap();
    TestStore { store, dir, config }
}

#[test]
fn fail_fast_single_caller_never_sees_busy() {
    let test = fail_fast_store_with_bulk_base(5_000);

    let mut busy = 0;
    for i in 0..20 {
        let sku = 10_000 + i;
        match test.store.save(&item(sku, "Hats", "new")) {
            Ok(_) => {}
            Err(e) if e.is_busy() => busy += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
        if let Err(e) = test.store.query(&CatalogQuery::new("Hats", "new")) {
            assert!(!e.is_busy(), "query reported busy");
        }
    }

    assert_eq!(busy, 0);
    assert_eq!(test.store.query(&CatalogQuery::new("Hats", "new")).unwrap().len(), 20);
}

#[test]
fn fail_fast_index_reflects_latest_save() {
    let test = fail_fast_store_with_bulk_base(5_000);

    for i in 0..10 {
        test.store
            .save(&item(10_000 + i, "Hats", "x").with_modifier(format!("Tag{}", i), 0))
            .unwrap();
    }
    test.store
        .update_modifiers(&item(10_009, "Hats", "x").with_modifier("Final", 0))
        .unwrap();
    test.store.wait_for_background();

    let modifiers = test.store.category_modifiers("Hats");
    assert!(modifiers.contains(&"Tag0".to_string()));
    assert!(modifiers.contains(&"Final".to_string()));
    assert!(!modifiers.contains(&"Tag9".to_string()));
}
