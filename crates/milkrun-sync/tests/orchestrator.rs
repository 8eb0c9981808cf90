//! Trigger handling and connectivity transitions.

mod common;

use std::sync::Arc;
use std::time::Duration;

use milkrun_file::FileStore;
use milkrun_sync::{Notice, Orchestrator, Synchronizer, Trigger};
use tempfile::TempDir;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use common::{GatedClient, Script, ScriptedClient, record};

const WAIT: Duration = Duration::from_secs(5);

struct Harness<C> {
    _dir: TempDir,
    store: Arc<FileStore>,
    orchestrator: Orchestrator<FileStore, C>,
    online: watch::Sender<bool>,
    notices: mpsc::UnboundedReceiver<Notice>,
}

fn harness<C>(client: C, online: bool) -> Harness<C>
where
    C: milkrun_core::SubmissionClient + 'static,
{
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let sync = Arc::new(Synchronizer::new(Arc::clone(&store), client));

    let (online_tx, online_rx) = watch::channel(online);
    let (notice_tx, notice_rx) = mpsc::unbounded_channel();

    Harness {
        _dir: dir,
        store,
        orchestrator: Orchestrator::new(sync, online_rx, notice_tx),
        online: online_tx,
        notices: notice_rx,
    }
}

async fn next_notice(notices: &mut mpsc::UnboundedReceiver<Notice>) -> Notice {
    timeout(WAIT, notices.recv())
        .await
        .expect("timed out waiting for a notice")
        .expect("notice channel closed")
}

#[tokio::test]
async fn test_append_while_offline_is_deferred() {
    let mut h = harness(ScriptedClient::new(Script::AcceptAll { base: 0 }), false);
    h.store.append(record(10.0, 0.0)).unwrap();

    assert!(!h.orchestrator.should_attempt(Trigger::RecordAppended));
    assert_eq!(h.orchestrator.fire(Trigger::RecordAppended).await, None);
    assert_eq!(h.orchestrator.synchronizer().client().calls(), 0);
    assert!(h.notices.try_recv().is_err());

    h.online.send(true).unwrap();
    assert!(h.orchestrator.should_attempt(Trigger::RecordAppended));

    let notice = h.orchestrator.fire(Trigger::RecordAppended).await.unwrap();
    match notice {
        Notice::Synced { trigger, report } => {
            assert_eq!(trigger, Trigger::RecordAppended);
            assert_eq!(report.synced_count, 1);
        }
        other => panic!("unexpected notice {other:?}"),
    }
}

#[tokio::test]
async fn test_manual_sync_tries_even_when_offline() {
    let mut h = harness(ScriptedClient::new(Script::Unreachable), false);
    h.store.append(record(10.0, 0.0)).unwrap();

    let notice = h.orchestrator.fire(Trigger::Manual).await.unwrap();
    match &notice {
        Notice::Synced { trigger, report } => {
            assert_eq!(*trigger, Trigger::Manual);
            assert!(!report.success);
        }
        other => panic!("unexpected notice {other:?}"),
    }

    // The same notice is published to listeners.
    assert_eq!(next_notice(&mut h.notices).await, notice);
    assert_eq!(h.store.pending().unwrap().len(), 1);
}

#[tokio::test]
async fn test_trigger_during_pass_reports_busy() {
    let mut h = harness(GatedClient::default(), true);
    h.store.append(record(10.0, 0.0)).unwrap();

    let first = h.orchestrator.spawn(Trigger::Manual);
    h.orchestrator.synchronizer().client().entered.notified().await;

    let second = h.orchestrator.fire(Trigger::RecordAppended).await;
    assert_eq!(
        second,
        Some(Notice::Busy {
            trigger: Trigger::RecordAppended
        })
    );

    h.orchestrator.synchronizer().client().release.notify_one();
    match first.await.unwrap() {
        Some(Notice::Synced { report, .. }) => assert_eq!(report.synced_count, 1),
        other => panic!("unexpected notice {other:?}"),
    }

    assert_eq!(h.orchestrator.synchronizer().client().calls(), 1);
    assert!(matches!(
        next_notice(&mut h.notices).await,
        Notice::Busy { .. }
    ));
}

#[tokio::test]
async fn test_reconnect_starts_a_pass() {
    let mut h = harness(ScriptedClient::new(Script::AcceptAll { base: 500 }), false);
    h.store.append(record(10.0, 0.0)).unwrap();
    h.store.append(record(11.0, 0.0)).unwrap();

    let (trigger_tx, trigger_rx) = mpsc::channel(8);
    let running = tokio::spawn(h.orchestrator.clone().run(trigger_rx));

    h.online.send(true).unwrap();

    match next_notice(&mut h.notices).await {
        Notice::Synced { trigger, report } => {
            assert_eq!(trigger, Trigger::Reconnect);
            assert!(report.success);
            assert_eq!(report.synced_count, 2);
        }
        other => panic!("unexpected notice {other:?}"),
    }
    assert!(h.store.pending().unwrap().is_empty());

    drop(trigger_tx);
    timeout(WAIT, running).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_already_online_runs_initial_pass() {
    let mut h = harness(ScriptedClient::new(Script::AcceptAll { base: 500 }), true);
    h.store.append(record(10.0, 0.0)).unwrap();

    let (trigger_tx, trigger_rx) = mpsc::channel(8);
    let running = tokio::spawn(h.orchestrator.clone().run(trigger_rx));

    assert!(matches!(
        next_notice(&mut h.notices).await,
        Notice::Synced {
            trigger: Trigger::Reconnect,
            ..
        }
    ));

    trigger_tx.send(Trigger::Manual).await.unwrap();
    match next_notice(&mut h.notices).await {
        Notice::Synced { trigger, report } => {
            assert_eq!(trigger, Trigger::Manual);
            assert_eq!(report.synced_count, 0);
        }
        other => panic!("unexpected notice {other:?}"),
    }

    drop(trigger_tx);
    timeout(WAIT, running).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_staying_online_is_not_a_reconnect() {
    let mut h = harness(ScriptedClient::new(Script::AcceptAll { base: 0 }), true);

    let (trigger_tx, trigger_rx) = mpsc::channel(8);
    let running = tokio::spawn(h.orchestrator.clone().run(trigger_rx));

    // Initial pass for the already-online start.
    next_notice(&mut h.notices).await;

    h.online.send(true).unwrap();
    h.online.send(false).unwrap();

    drop(trigger_tx);
    timeout(WAIT, running).await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(h.notices.try_recv().is_err());
}

#[tokio::test]
async fn test_run_survives_closed_signal() {
    let mut h = harness(ScriptedClient::new(Script::AcceptAll { base: 0 }), false);

    let (trigger_tx, trigger_rx) = mpsc::channel(8);
    let running = tokio::spawn(h.orchestrator.clone().run(trigger_rx));

    drop(h.online);

    trigger_tx.send(Trigger::Manual).await.unwrap();
    assert!(matches!(
        next_notice(&mut h.notices).await,
        Notice::Synced {
            trigger: Trigger::Manual,
            ..
        }
    ));

    drop(trigger_tx);
    timeout(WAIT, running).await.unwrap().unwrap();
}
