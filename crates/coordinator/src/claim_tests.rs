// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::coordination::memory::InMemoryCoordinationClient;

fn claimant(member: &str) -> Arc<PartitionClaimant> {
    let cca: Arc<dyn crate::coordination::CoordinationClient> =
        Arc::new(InMemoryCoordinationClient::new());
    let gzh = Arc::new(GroupZnodeHandle::new("g1", cca));
    PartitionClaimant::new(member, gzh)
}

#[tokio::test]
async fn first_claim_creates_owner_znode() {
    let pc = claimant("m1");
    let guard = pc.claim("foo", 0, CancellationToken::new()).await.unwrap();
    assert!(guard.is_owned());
    assert_eq!(pc.partition_owner("foo", 0).await.unwrap().as_deref(), Some("m1"));
}

#[tokio::test]
async fn refcount_release_only_frees_at_zero() {
    let pc = claimant("m1");
    let g1 = pc.claim("foo", 0, CancellationToken::new()).await.unwrap();
    let g2 = pc.claim("foo", 0, CancellationToken::new()).await.unwrap();
    let g3 = pc.claim("foo", 0, CancellationToken::new()).await.unwrap();
    assert_eq!(pc.refcount("foo", 0).await, 3);

    g1.release().await;
    assert_eq!(pc.partition_owner("foo", 0).await.unwrap().as_deref(), Some("m1"));
    g2.release().await;
    assert_eq!(pc.partition_owner("foo", 0).await.unwrap().as_deref(), Some("m1"));
    g3.release().await;
    assert_eq!(pc.partition_owner("foo", 0).await.unwrap(), None);
}

#[tokio::test]
async fn contended_claim_blocks_then_succeeds_on_release() {
    let cca: Arc<dyn crate::coordination::CoordinationClient> =
        Arc::new(InMemoryCoordinationClient::new());
    let gzh_a = Arc::new(GroupZnodeHandle::new("g1", Arc::clone(&cca)));
    let gzh_b = Arc::new(GroupZnodeHandle::new("g1", cca));
    let m1 = PartitionClaimant::new("m1", gzh_a);
    let m2 = PartitionClaimant::new("m2", gzh_b);

    let guard1 = m1.claim("foo", 1, CancellationToken::new()).await.unwrap();
    assert!(guard1.is_owned());

    let m2_clone = Arc::clone(&m2);
    let waiter = tokio::spawn(async move {
        m2_clone.claim("foo", 1, CancellationToken::new()).await.unwrap()
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    guard1.release().await;

    let guard2 = waiter.await.unwrap();
    assert!(guard2.is_owned());
    assert_eq!(m2.partition_owner("foo", 1).await.unwrap().as_deref(), Some("m2"));
}

#[tokio::test]
async fn cancel_while_blocked_returns_without_claiming() {
    let cca: Arc<dyn crate::coordination::CoordinationClient> =
        Arc::new(InMemoryCoordinationClient::new());
    let gzh_a = Arc::new(GroupZnodeHandle::new("g1", Arc::clone(&cca)));
    let gzh_b = Arc::new(GroupZnodeHandle::new("g1", cca));
    let m1 = PartitionClaimant::new("m1", gzh_a);
    let m2 = PartitionClaimant::new("m2", gzh_b);

    let guard1 = m1.claim("foo", 1, CancellationToken::new()).await.unwrap();

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    let m2_clone = Arc::clone(&m2);
    let waiter = tokio::spawn(async move { m2_clone.claim("foo", 1, cancel_clone).await.unwrap() });

    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    let guard2 = tokio::time::timeout(Duration::from_millis(200), waiter).await.unwrap().unwrap();
    assert!(!guard2.is_owned());
    assert_eq!(m2.partition_owner("foo", 1).await.unwrap().as_deref(), Some("m1"));

    guard1.release().await;
}

#[tokio::test]
async fn release_all_clears_every_outstanding_claim() {
    let pc = claimant("m1");
    pc.claim("foo", 0, CancellationToken::new()).await.unwrap();
    pc.claim("bar", 1, CancellationToken::new()).await.unwrap();
    pc.release_all().await;
    assert_eq!(pc.partition_owner("foo", 0).await.unwrap(), None);
    assert_eq!(pc.partition_owner("bar", 1).await.unwrap(), None);
}
