// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unified error codes for the group coordinator.
///
/// These map directly onto the taxonomy in the coordinator's error
/// handling design: transient coordination errors are retried below this
/// layer and never reach a caller as one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatorError {
    /// The coordination service could not be reached.
    Unavailable,
    /// The coordination-service session backing this handle was lost.
    /// Fatal: all ephemeral state (registrations, claims) is gone.
    SessionLost,
    /// The operation raced another writer (e.g. `createEphemeral` on an
    /// already-existing node). Not surfaced to `ClaimPartition` callers;
    /// it drives the internal wait loop instead.
    Conflict,
    /// A blocking wait was aborted by the caller's cancel signal.
    Cancelled,
    /// The handle has already been stopped.
    Stopped,
}

impl CoordinatorError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "UNAVAILABLE",
            Self::SessionLost => "SESSION_LOST",
            Self::Conflict => "CONFLICT",
            Self::Cancelled => "CANCELLED",
            Self::Stopped => "STOPPED",
        }
    }

    /// True for errors a retry loop inside the coordinator may absorb
    /// silently rather than surface to the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for CoordinatorError {}

pub type Result<T> = std::result::Result<T, CoordinatorError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
