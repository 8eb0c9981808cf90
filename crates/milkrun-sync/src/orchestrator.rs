//! Connectivity-triggered sync orchestration.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use milkrun_core::traits::{RecordStore, SubmissionClient};

use crate::report::{SyncAttempt, SyncReport};
use crate::synchronizer::Synchronizer;

/// Why a reconciliation pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Connectivity came back.
    Reconnect,
    /// A record was just appended.
    RecordAppended,
    /// The operator asked for a sync.
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::Reconnect => "reconnect",
            Trigger::RecordAppended => "record-appended",
            Trigger::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// Transient notification emitted after each trigger that was acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A pass ran; the report may still describe a failure.
    Synced { trigger: Trigger, report: SyncReport },
    /// A pass was already running, so this trigger was dropped.
    Busy { trigger: Trigger },
    /// The local store failed during the pass.
    StoreFailed { trigger: Trigger, error: String },
}

/// Runs reconciliation passes in response to triggers.
pub struct Orchestrator<S, C> {
    sync: Arc<Synchronizer<S, C>>,
    online: watch::Receiver<bool>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl<S, C> Clone for Orchestrator<S, C> {
    fn clone(&self) -> Self {
        Self {
            sync: Arc::clone(&self.sync),
            online: self.online.clone(),
            notices: self.notices.clone(),
        }
    }
}

impl<S, C> Orchestrator<S, C>
where
    S: RecordStore + 'static,
    C: SubmissionClient + 'static,
{
    /// Create an orchestrator.
    ///
    /// `online` is the connectivity signal; `notices` receives one
    /// [`Notice`] per trigger acted on.
    pub fn new(
        sync: Arc<Synchronizer<S, C>>,
        online: watch::Receiver<bool>,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> Self {
        Self {
            sync,
            online,
            notices,
        }
    }

    /// The synchronizer passes run on.
    pub fn synchronizer(&self) -> &Arc<Synchronizer<S, C>> {
        &self.sync
    }

    /// Current connectivity as last reported.
    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Whether `trigger` should start a pass right now.
    ///
    /// An append only syncs while online; reconnects and manual requests
    /// always try.
    pub fn should_attempt(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::RecordAppended => self.is_online(),
            Trigger::Reconnect | Trigger::Manual => true,
        }
    }

    /// Handle a trigger on the current task.
    ///
    /// Returns `None` if the trigger was ignored.
    #[instrument(skip(self))]
    pub async fn fire(&self, trigger: Trigger) -> Option<Notice> {
        if !self.should_attempt(trigger) {
            debug!("Offline, deferring sync");
            return None;
        }

        let notice = match self.sync.sync().await {
            Ok(SyncAttempt::Completed(report)) => Notice::Synced { trigger, report },
            Ok(SyncAttempt::AlreadyRunning) => Notice::Busy { trigger },
            Err(e) => {
                error!(error = %e, "Local store failed during sync");
                Notice::StoreFailed {
                    trigger,
                    error: e.to_string(),
                }
            }
        };

        // The receiver going away only means nobody is listening.
        let _ = self.notices.send(notice.clone());
        Some(notice)
    }

    /// Handle a trigger on a new task, so that a trigger arriving during a
    /// pass meets the single-flight guard instead of waiting behind it.
    pub fn spawn(&self, trigger: Trigger) -> JoinHandle<Option<Notice>> {
        let this = self.clone();
        tokio::spawn(async move { this.fire(trigger).await })
    }

    /// Drive passes from connectivity changes and explicit triggers until
    /// the trigger channel closes.
    ///
    /// Only offline-to-online transitions count as reconnects. If the
    /// device is already online when this starts, one pass runs
    /// immediately.
    pub async fn run(mut self, mut triggers: mpsc::Receiver<Trigger>) {
        let mut was_online = *self.online.borrow_and_update();
        let mut signal_open = true;

        if was_online {
            let _ = self.spawn(Trigger::Reconnect);
        }

        loop {
            tokio::select! {
                changed = self.online.changed(), if signal_open => {
                    if changed.is_err() {
                        debug!("Connectivity signal closed");
                        signal_open = false;
                        continue;
                    }

                    let online = *self.online.borrow_and_update();
                    if online && !was_online {
                        debug!("Connectivity restored");
                        let _ = self.spawn(Trigger::Reconnect);
                    }
                    was_online = online;
                }
                trigger = triggers.recv() => {
                    match trigger {
                        Some(trigger) => {
                            let _ = self.spawn(trigger);
                        }
                        None => break,
                    }
                }
            }
        }

        debug!("Trigger channel closed, orchestrator stopping");
    }
}
