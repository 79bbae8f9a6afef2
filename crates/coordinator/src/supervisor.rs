// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor (SV) — the public entry point. Owns one [`Reconciler`] task
//! and one [`PartitionClaimant`] per spawned member, and wires the two
//! together behind a single [`Handle`].

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::claim::{ClaimGuard, PartitionClaimant};
use crate::coordination::CoordinationClient;
use crate::error::{CoordinatorError, Result};
use crate::group::GroupZnodeHandle;
use crate::reconciler::Reconciler;
use crate::topics::MembershipSnapshot;
use crate::CoordinatorConfig;

/// Entry point: spawns the reconciler and claimant for one group member.
pub struct Supervisor;

impl Supervisor {
    /// Spawn a member into `group`, returning a [`Handle`] to it. The
    /// reconciler task starts immediately; callers drive it by calling
    /// [`Handle::topics`].
    pub fn spawn(
        group: impl Into<String>,
        member_id: impl Into<String>,
        cfg: &CoordinatorConfig,
        cca: Arc<dyn CoordinationClient>,
    ) -> Handle {
        let group = group.into();
        let member_id = member_id.into();
        let gzh = Arc::new(GroupZnodeHandle::new(group.clone(), Arc::clone(&cca)));
        let shutdown = CancellationToken::new();

        let (reconciler, channels) =
            Reconciler::new(group.clone(), member_id.clone(), Arc::clone(&gzh), cfg.rebalance_delay(), shutdown.clone());
        let join = tokio::spawn(reconciler.run());

        let claimant = PartitionClaimant::new(member_id.clone(), gzh);

        info!(group, member = member_id, "supervisor spawned group member");

        Handle {
            group,
            member: member_id,
            topics_tx: channels.intent_tx,
            snapshot_rx: channels.snapshot_rx,
            claimant,
            shutdown,
            join: tokio::sync::Mutex::new(Some(join)),
        }
    }
}

/// A live group member. Cheap to share: every method takes `&self`, and
/// `Stop` is idempotent so multiple callers may race it safely.
pub struct Handle {
    group: String,
    member: String,
    topics_tx: tokio::sync::mpsc::Sender<Option<Vec<String>>>,
    snapshot_rx: watch::Receiver<Option<MembershipSnapshot>>,
    claimant: Arc<PartitionClaimant>,
    shutdown: CancellationToken,
    join: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Handle {
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    /// Declare the topics this member subscribes to. `None` or an empty
    /// list withdraws the subscription entirely. Debounced and coalesced
    /// by the underlying reconciler; this call itself never blocks on
    /// the coordination service.
    ///
    /// Returns `Err(Stopped)` if the handle has already been stopped.
    pub async fn topics(&self, topics: Option<Vec<String>>) -> Result<()> {
        if self.is_stopped() {
            return Err(CoordinatorError::Stopped);
        }
        self.topics_tx.send(topics).await.map_err(|_| CoordinatorError::Stopped)
    }

    /// A watch over the group-wide membership snapshot. `None` until the
    /// first snapshot lands; closes once the handle is stopped.
    pub fn subscriptions(&self) -> watch::Receiver<Option<MembershipSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// The most recently published snapshot, if any, without waiting for
    /// a new one.
    pub fn current_snapshot(&self) -> Option<MembershipSnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// Claim `(topic, partition)`, blocking on contention until it frees
    /// up or `cancel` fires. See [`PartitionClaimant::claim`].
    pub async fn claim_partition(
        &self,
        topic: impl Into<String>,
        partition: u32,
        cancel: CancellationToken,
    ) -> Result<ClaimGuard> {
        self.claimant.claim(topic, partition, cancel).await
    }

    /// True once `Stop` has been called (or the reconciler exited on its
    /// own, e.g. after session loss).
    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Tear this member down: release every outstanding partition claim,
    /// delete the membership registration, and wait for the reconciler
    /// task to exit. Idempotent — a second call observes the same
    /// outcome without re-running any of it.
    pub async fn stop(&self) {
        self.shutdown.cancel();
        self.claimant.release_all().await;

        let mut join = self.join.lock().await;
        if let Some(handle) = join.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
