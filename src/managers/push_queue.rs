//! Serialized remote pushes.
//!
//! Every committed snapshot gets a sequence number and goes through one
//! worker task. The worker handles jobs strictly in commit order and
//! collapses a backlog to its newest entry, so the remote store always ends
//! up holding the last committed snapshot and a slow response can never
//! overwrite a newer one.
//!
//! Login verification goes through the same worker, so a push still in
//! flight under an older credential always lands before the login push.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};

use crate::managers::sync_session::SyncSession;
use crate::services::local_cache::LocalCache;
use crate::services::remote_store::RemoteStore;
use crate::types::errors::RemoteError;
use crate::types::snapshot::Snapshot;
use crate::types::sync::{Credential, SyncStatus};

struct PushJob {
    seq: u64,
    snapshot: Arc<Snapshot>,
    credential: Credential,
    /// Set for login verification. The credential is not installed yet,
    /// and the outcome goes back to the caller instead of the status.
    reply: Option<oneshot::Sender<Result<(), RemoteError>>>,
}

/// Handle used by the controller to schedule pushes.
pub struct PushQueue {
    tx: mpsc::UnboundedSender<PushJob>,
    session: Arc<SyncSession>,
    next_seq: u64,
}

impl PushQueue {
    /// Spawns the worker on the current Tokio runtime.
    pub fn start(remote: Arc<dyn RemoteStore>, cache: LocalCache, session: Arc<SyncSession>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx, remote, cache, Arc::clone(&session)));
        Self {
            tx,
            session,
            next_seq: 0,
        }
    }

    /// Schedules `snapshot` for upload and returns its sequence number.
    pub fn enqueue(&mut self, snapshot: Arc<Snapshot>, credential: Credential) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.session.record_enqueued(seq);
        self.session.set_status(SyncStatus::Saving);

        let job = PushJob {
            seq,
            snapshot,
            credential,
            reply: None,
        };
        if self.tx.send(job).is_err() {
            warn!("push worker is gone; snapshot #{} stays local", seq);
            self.session.set_status(SyncStatus::Error);
        }
        seq
    }

    /// Pushes `snapshot` with a credential that is not installed yet and
    /// returns its sequence number with the receiver for the outcome.
    /// The status is left alone.
    pub fn verify(
        &mut self,
        snapshot: Arc<Snapshot>,
        credential: Credential,
    ) -> (u64, oneshot::Receiver<Result<(), RemoteError>>) {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.session.record_enqueued(seq);

        let (reply, outcome) = oneshot::channel();
        let job = PushJob {
            seq,
            snapshot,
            credential,
            reply: Some(reply),
        };
        if self.tx.send(job).is_err() {
            warn!("push worker is gone; cannot verify credential");
        }
        (seq, outcome)
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<PushJob>,
    remote: Arc<dyn RemoteStore>,
    cache: LocalCache,
    session: Arc<SyncSession>,
) {
    let mut held_back: Option<PushJob> = None;
    loop {
        let mut job = match held_back.take() {
            Some(job) => job,
            None => match rx.recv().await {
                Some(job) => job,
                None => break,
            },
        };

        // A verification is never merged into a regular push, and jobs
        // queued before it go out first.
        if job.reply.is_none() {
            let mut superseded = 0;
            while let Ok(newer) = rx.try_recv() {
                if newer.reply.is_some() {
                    held_back = Some(newer);
                    break;
                }
                job = newer;
                superseded += 1;
            }
            if superseded > 0 {
                debug!("skipping {} superseded pushes, sending #{}", superseded, job.seq);
            }
        }

        if let Some(reply) = job.reply.take() {
            let outcome = remote.replace_snapshot(&job.snapshot, &job.credential).await;
            match &outcome {
                Ok(()) => {
                    session.record_confirmed(job.seq);
                    debug!("verification push #{} stored remotely", job.seq);
                }
                Err(e) => debug!("verification push #{} failed: {}", job.seq, e),
            }
            if reply.send(outcome).is_err() {
                debug!("login caller went away before push #{} finished", job.seq);
            }
            continue;
        }

        if !session.holds_credential(&job.credential) {
            debug!("dropping push #{}: credential is no longer current", job.seq);
            if session.latest_seq() == job.seq {
                session.settle_saving();
            }
            continue;
        }

        session.set_status(SyncStatus::Saving);
        match remote.replace_snapshot(&job.snapshot, &job.credential).await {
            Ok(()) => {
                session.record_confirmed(job.seq);
                debug!("push #{} stored remotely", job.seq);
                if session.latest_seq() == job.seq {
                    session.mark_saved();
                }
            }
            Err(RemoteError::Unauthorized) => {
                warn!("push #{} rejected: credential no longer valid", job.seq);
                if session.reject_credential(&job.credential) {
                    info!("cleared stored credential; re-authentication required");
                    if let Err(e) = cache.clear_credential() {
                        warn!("failed to remove stored credential: {}", e);
                    }
                }
                session.set_status(SyncStatus::Error);
            }
            Err(e) => {
                warn!("push #{} failed: {}", job.seq, e);
                session.set_status(SyncStatus::Error);
            }
        }
    }
    debug!("push worker stopped");
}
