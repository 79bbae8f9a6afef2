// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Membership Reconciler (MR) — the rebalance debouncer and
//! membership-diff engine. One actor per group member.
//!
//! Three inputs (local intent, external watch, the rebalance timer) feed
//! a single cooperatively-scheduled loop that writes the member's own
//! registration at most once per debounce window and publishes a new
//! [`MembershipSnapshot`] only when the group-wide view actually changed.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::coordination::WatchEvent;
use crate::error::CoordinatorError;
use crate::group::GroupZnodeHandle;
use crate::topics::{MembershipSnapshot, Topics};

/// Why the reconciler actor's event loop returned.
enum Termination {
    /// `Stop()` was called, or every `Handle` clone was dropped.
    Stopped,
    /// The coordination-service session was lost; ephemeral state is
    /// already gone server-side.
    SessionLost,
}

/// The reconciler actor. Spawned and owned by [`crate::supervisor::Supervisor`].
pub struct Reconciler {
    group: String,
    member: String,
    gzh: Arc<GroupZnodeHandle>,
    rebalance_delay: Duration,

    intent_rx: mpsc::Receiver<Option<Vec<String>>>,
    snapshot_tx: watch::Sender<Option<MembershipSnapshot>>,
    shutdown: CancellationToken,

    advertised: Topics,
    pending_intent: Option<Topics>,
    last_emitted: Option<MembershipSnapshot>,
    watch_rx: Option<oneshot::Receiver<WatchEvent>>,
    rebalance_deadline: Option<Instant>,
}

/// Channel endpoints wired up by [`crate::supervisor::Supervisor::spawn`].
pub struct ReconcilerChannels {
    pub intent_tx: mpsc::Sender<Option<Vec<String>>>,
    pub snapshot_rx: watch::Receiver<Option<MembershipSnapshot>>,
}

impl Reconciler {
    /// Construct a reconciler and the channel endpoints its caller uses
    /// to drive it. Does not spawn the actor task; the caller
    /// (`Supervisor::spawn`) does that so it can hold the `JoinHandle`.
    pub fn new(
        group: impl Into<String>,
        member: impl Into<String>,
        gzh: Arc<GroupZnodeHandle>,
        rebalance_delay: Duration,
        shutdown: CancellationToken,
    ) -> (Self, ReconcilerChannels) {
        const INTENT_CHANNEL_CAPACITY: usize = 8;
        let (intent_tx, intent_rx) = mpsc::channel(INTENT_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let reconciler = Self {
            group: group.into(),
            member: member.into(),
            gzh,
            rebalance_delay,
            intent_rx,
            snapshot_tx,
            shutdown,
            advertised: Topics::default(),
            pending_intent: None,
            last_emitted: None,
            watch_rx: None,
            rebalance_deadline: None,
        };
        (reconciler, ReconcilerChannels { intent_tx, snapshot_rx })
    }

    /// Run the actor to completion. Consumes `self` so the watch sender
    /// (and therefore the subscription channel) closes when this
    /// future returns.
    pub async fn run(mut self) {
        info!(group = %self.group, member = %self.member, "membership reconciler started");

        // Install the initial watch so events from other members are
        // observed even before this member sends its first intent.
        match self.gzh.watch_membership().await {
            Ok(rx) => self.watch_rx = Some(rx),
            Err(e) => warn!(group = %self.group, member = %self.member, err = %e, "initial watch install failed"),
        }

        let termination = self.event_loop().await;

        match termination {
            Termination::Stopped => {
                if let Err(e) = self.gzh.unregister(&self.member).await {
                    warn!(group = %self.group, member = %self.member, err = %e, "failed to delete membership znode on stop");
                }
                info!(group = %self.group, member = %self.member, "membership reconciler stopped");
            }
            Termination::SessionLost => {
                // Mark the shared shutdown token so `Handle::is_stopped()`
                // reflects that this member is no longer live, even though
                // nobody called `Stop()`.
                self.shutdown.cancel();
                warn!(group = %self.group, member = %self.member, "membership reconciler exiting: session lost");
            }
        }
        // `self.snapshot_tx` drops here, closing the subscription channel.
    }

    async fn event_loop(&mut self) -> Termination {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Termination::Stopped,

                maybe_intent = self.intent_rx.recv() => {
                    match maybe_intent {
                        Some(raw) => self.on_intent(raw),
                        None => return Termination::Stopped,
                    }
                }

                event = async {
                    match self.watch_rx.as_mut() {
                        Some(rx) => rx.await.unwrap_or(WatchEvent::SessionLost),
                        None => std::future::pending().await,
                    }
                }, if self.watch_rx.is_some() => {
                    self.watch_rx = None;
                    if let ControlFlow::Break(term) = self.on_watch(event) {
                        return term;
                    }
                }

                _ = async {
                    match self.rebalance_deadline {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending().await,
                    }
                }, if self.rebalance_deadline.is_some() => {
                    self.rebalance_deadline = None;
                    if let ControlFlow::Break(term) = self.on_timer().await {
                        return term;
                    }
                }
            }
        }
    }

    fn arm_timer(&mut self) {
        self.rebalance_deadline = Some(Instant::now() + self.rebalance_delay);
    }

    fn on_intent(&mut self, raw: Option<Vec<String>>) {
        let normalized = Topics::normalize(raw.unwrap_or_default());
        if normalized == self.advertised {
            // Redundant update: this intent round-trips back to what's
            // already advertised, so it cancels any still-different
            // intent left pending from earlier in this debounce window.
            self.pending_intent = None;
            // Only arm the timer for the cold-start case where nothing
            // has ever been emitted yet — otherwise this produces zero
            // snapshots, per the coalescing property.
            if self.last_emitted.is_none() {
                trace!(group = %self.group, member = %self.member, "redundant intent at cold start, arming timer");
                self.arm_timer();
            } else {
                trace!(group = %self.group, member = %self.member, "redundant intent ignored");
            }
            return;
        }
        debug!(group = %self.group, member = %self.member, topics = ?normalized.as_slice(), "intent recorded, arming timer");
        self.pending_intent = Some(normalized);
        self.arm_timer();
    }

    fn on_watch(&mut self, event: WatchEvent) -> ControlFlow<Termination> {
        match event {
            WatchEvent::ChildrenChanged => {
                trace!(group = %self.group, member = %self.member, "membership watch fired, arming timer");
                self.arm_timer();
                ControlFlow::Continue(())
            }
            WatchEvent::SessionLost => ControlFlow::Break(Termination::SessionLost),
        }
    }

    async fn on_timer(&mut self) -> ControlFlow<Termination> {
        if let Some(pending) = self.pending_intent.take() {
            if pending != self.advertised {
                match self.gzh.register_membership(&self.member, &pending).await {
                    Ok(()) => {
                        self.advertised = pending;
                    }
                    Err(CoordinatorError::SessionLost) => return ControlFlow::Break(Termination::SessionLost),
                    Err(e) => {
                        warn!(group = %self.group, member = %self.member, err = %e, "membership write failed, retrying");
                        self.pending_intent = Some(pending);
                        self.arm_timer();
                        return ControlFlow::Continue(());
                    }
                }
            }
        }

        match self.gzh.fetch_subscriptions().await {
            Ok(snapshot) => {
                if self.last_emitted.as_ref() != Some(&snapshot) {
                    debug!(group = %self.group, member = %self.member, members = snapshot.len(), "publishing new membership snapshot");
                    let _ = self.snapshot_tx.send(Some(snapshot.clone()));
                    self.last_emitted = Some(snapshot);
                }
            }
            Err(CoordinatorError::SessionLost) => return ControlFlow::Break(Termination::SessionLost),
            Err(e) => {
                warn!(group = %self.group, member = %self.member, err = %e, "subscription fetch failed, retrying");
                self.arm_timer();
                return ControlFlow::Continue(());
            }
        }

        match self.gzh.watch_membership().await {
            Ok(rx) => self.watch_rx = Some(rx),
            Err(CoordinatorError::SessionLost) => return ControlFlow::Break(Termination::SessionLost),
            Err(e) => {
                warn!(group = %self.group, member = %self.member, err = %e, "watch re-install failed, retrying shortly");
                self.arm_timer();
            }
        }

        ControlFlow::Continue(())
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
