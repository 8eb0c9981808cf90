//! Restart and concurrency behaviour of the file store.

use std::collections::BTreeSet;
use std::thread;

use milkrun_core::{
    Acknowledgement, FarmId, LocalId, NewRecord, OperatorId, RecordStore, RemoteId,
};
use milkrun_file::FileStore;
use tempfile::TempDir;

fn record(quantity: f64) -> NewRecord {
    NewRecord::new(FarmId::new(4), OperatorId::new(2), quantity, -15.0).unwrap()
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();

    let first = {
        let store = FileStore::open(dir.path()).unwrap();
        let a = store.append(record(10.0)).unwrap();
        store.append(record(11.0)).unwrap();
        store
            .mark_synced(&[Acknowledgement {
                temp_id: a.local_id(),
                remote_id: RemoteId::new(501),
            }])
            .await
            .unwrap();
        a
    };

    let store = FileStore::open(dir.path()).unwrap();
    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].local_id(), first.local_id());
    assert!(all[0].is_synced());
    assert_eq!(all[0].remote_id(), Some(RemoteId::new(501)));

    let pending = store.unsynced().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].quantity(), 11.0);

    // Ids continue after a restart instead of starting over.
    let c = store.append(record(12.0)).unwrap();
    assert_eq!(c.local_id(), LocalId::new(3));
}

#[test]
fn concurrent_appends_get_unique_ids() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = store.clone();
            thread::spawn(move || {
                (0..10)
                    .map(|i| {
                        store
                            .append(record(1.0 + worker as f64 + i as f64 / 10.0))
                            .unwrap()
                            .local_id()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "duplicate local id {id}");
        }
    }

    assert_eq!(ids.len(), 40);
    assert_eq!(store.records().unwrap().len(), 40);
}

#[test]
fn separate_handles_share_the_lock() {
    let dir = TempDir::new().unwrap();
    let a = FileStore::open(dir.path()).unwrap();
    let b = FileStore::open(dir.path()).unwrap();

    let handles: Vec<_> = [a, b]
        .into_iter()
        .map(|store| {
            thread::spawn(move || {
                for _ in 0..10 {
                    store.append(record(5.0)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let store = FileStore::open(dir.path()).unwrap();
    let ids: BTreeSet<_> = store.records().unwrap().iter().map(|r| r.local_id()).collect();
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn no_record_disappears_and_sync_is_monotonic() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let mut appended = Vec::new();
    let mut synced = BTreeSet::new();
    for round in 0..6u64 {
        appended.push(store.append(record(1.0 + round as f64)).unwrap());

        if round % 2 == 1 {
            let target = appended[round as usize - 1].local_id();
            store
                .mark_synced(&[Acknowledgement {
                    temp_id: target,
                    remote_id: RemoteId::new(100 + round),
                }])
                .await
                .unwrap();
            synced.insert(target);
        }

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), appended.len());
        for r in &all {
            assert_eq!(r.is_synced(), synced.contains(&r.local_id()));
        }
    }
}
