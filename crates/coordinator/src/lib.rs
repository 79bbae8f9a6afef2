// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consumer-group membership and partition-ownership coordinator over a
//! ZooKeeper-style coordination service.
//!
//! The public surface is [`Supervisor::spawn`], which returns a
//! [`Handle`] wiring together a Membership Reconciler (debounced
//! subscribe/rebalance) and a Partition Claimant (refcounted,
//! contention-aware partition ownership) over a [`CoordinationClient`].

pub mod claim;
pub mod config;
pub mod coordination;
pub mod error;
pub mod group;
pub mod reconciler;
pub mod supervisor;
pub mod topics;

pub use claim::ClaimGuard;
pub use config::CoordinatorConfig;
pub use coordination::{CoordinationClient, WatchEvent};
pub use error::{CoordinatorError, Result};
pub use group::GroupZnodeHandle;
pub use supervisor::{Handle, Supervisor};
pub use topics::{MembershipSnapshot, Topics};
