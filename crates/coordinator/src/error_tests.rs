// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn display_matches_as_str() {
    for err in [
        CoordinatorError::Unavailable,
        CoordinatorError::SessionLost,
        CoordinatorError::Conflict,
        CoordinatorError::Cancelled,
        CoordinatorError::Stopped,
    ] {
        assert_eq!(err.to_string(), err.as_str());
    }
}

#[test]
fn only_unavailable_is_transient() {
    assert!(CoordinatorError::Unavailable.is_transient());
    assert!(!CoordinatorError::SessionLost.is_transient());
    assert!(!CoordinatorError::Conflict.is_transient());
    assert!(!CoordinatorError::Cancelled.is_transient());
    assert!(!CoordinatorError::Stopped.is_transient());
}

#[test]
fn round_trips_through_json() {
    let encoded = serde_json::to_string(&CoordinatorError::SessionLost).unwrap();
    let decoded: CoordinatorError = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, CoordinatorError::SessionLost);
}
