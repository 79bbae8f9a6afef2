// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partition Claimant (PC) — a refcounted claim registry layered over the
//! [`GroupZnodeHandle`]. Mechanises claims made by higher layers; it does
//! not decide which member should own which partition.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{CoordinatorError, Result};
use crate::group::GroupZnodeHandle;

/// An in-process handle to a claimed `(topic, partition)`. Released by
/// calling [`ClaimGuard::release`]; dropping it without releasing leaks
/// the claim (Rust has no async `Drop`, so there is no way to run the
/// znode delete automatically on scope exit).
pub struct ClaimGuard {
    topic: String,
    partition: u32,
    owned: bool,
    claimant: Arc<PartitionClaimant>,
}

impl ClaimGuard {
    /// True unless this is the no-op sentinel returned when the caller's
    /// cancel signal fired before a claim was obtained.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn partition(&self) -> u32 {
        self.partition
    }

    /// Release this claim. A no-op for the cancelled sentinel.
    pub async fn release(self) {
        if self.owned {
            self.claimant.release(&self.topic, self.partition).await;
        }
    }
}

/// Refcounted claim registry for one group member.
pub struct PartitionClaimant {
    member: String,
    gzh: Arc<GroupZnodeHandle>,
    claims: Mutex<HashMap<(String, u32), usize>>,
}

impl PartitionClaimant {
    pub fn new(member: impl Into<String>, gzh: Arc<GroupZnodeHandle>) -> Arc<Self> {
        Arc::new(Self { member: member.into(), gzh, claims: Mutex::new(HashMap::new()) })
    }

    /// Claim `(topic, partition)`, blocking on contention until it frees
    /// up or `cancel` closes.
    ///
    /// If this process already owns the partition, the refcount is
    /// incremented and the coordination service is not touched. If
    /// `cancel` closes while waiting, this returns promptly with a
    /// sentinel guard that owns nothing; no znode is created and the
    /// partition remains owned by whoever owned it.
    pub async fn claim(
        self: &Arc<Self>,
        topic: impl Into<String>,
        partition: u32,
        cancel: CancellationToken,
    ) -> Result<ClaimGuard> {
        let topic = topic.into();
        let key = (topic.clone(), partition);

        loop {
            let mut claims = self.claims.lock().await;
            if let Some(count) = claims.get_mut(&key) {
                *count += 1;
                debug!(member = %self.member, topic, partition, refcount = *count, "claim refcounted locally");
                return Ok(self.guard(topic, partition, true));
            }

            if cancel.is_cancelled() {
                return Ok(self.guard(topic, partition, false));
            }

            match self.gzh.try_claim(&self.member, &topic, partition).await {
                Ok(true) => {
                    claims.insert(key, 1);
                    debug!(member = %self.member, topic, partition, "claim created");
                    return Ok(self.guard(topic, partition, true));
                }
                Ok(false) => {
                    // Lost the race (or another member owns it already).
                    // Drop the local lock before blocking on the network
                    // watch so other local claimants are not starved.
                    drop(claims);
                    trace!(member = %self.member, topic, partition, "claim contended, waiting");
                    let watch_rx = self.gzh.watch_owners(&topic).await?;
                    tokio::select! {
                        _ = watch_rx => continue,
                        _ = cancel.cancelled() => {
                            return Ok(self.guard(topic, partition, false));
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn guard(self: &Arc<Self>, topic: String, partition: u32, owned: bool) -> ClaimGuard {
        ClaimGuard { topic, partition, owned, claimant: Arc::clone(self) }
    }

    async fn release(&self, topic: &str, partition: u32) {
        let key = (topic.to_owned(), partition);
        let mut claims = self.claims.lock().await;
        let Some(count) = claims.get_mut(&key) else {
            warn!(member = %self.member, topic, partition, "release of untracked claim ignored");
            return;
        };
        *count -= 1;
        if *count > 0 {
            debug!(member = %self.member, topic, partition, refcount = *count, "claim released locally");
            return;
        }
        claims.remove(&key);
        drop(claims);
        if let Err(e) = self.gzh.release_partition(topic, partition).await {
            warn!(member = %self.member, topic, partition, err = %e, "failed to delete owner znode on release");
        } else {
            debug!(member = %self.member, topic, partition, "claim fully released");
        }
    }

    /// Current number of local holders of `(topic, partition)`, 0 if none.
    pub async fn refcount(&self, topic: &str, partition: u32) -> usize {
        self.claims.lock().await.get(&(topic.to_owned(), partition)).copied().unwrap_or(0)
    }

    /// Release every outstanding in-process claim. Used by the
    /// supervisor on `Stop()` so claims created before shutdown don't
    /// leak ephemeral owner znodes for the rest of the session.
    pub async fn release_all(&self) {
        let drained: Vec<(String, u32)> = {
            let mut claims = self.claims.lock().await;
            claims.drain().map(|(k, _)| k).collect()
        };
        for (topic, partition) in drained {
            if let Err(e) = self.gzh.release_partition(&topic, partition).await {
                warn!(member = %self.member, topic, partition, err = %e, "failed to delete owner znode during shutdown");
            }
        }
    }

    /// Current owner of `(topic, partition)` as tracked by the
    /// coordination service (not just this process).
    pub async fn partition_owner(&self, topic: &str, partition: u32) -> Result<Option<String>> {
        self.gzh.partition_owner(topic, partition).await
    }
}

#[cfg(test)]
#[path = "claim_tests.rs"]
mod tests;
