//! Aggregate runtime state for an embedding process.
//!
//! The stores are owned by an explicitly constructed `ClubState` that the
//! embedder injects wherever it is needed - there is no module-level
//! singleton. Multi-threaded embedders wrap it in [`SharedClubState`] so
//! every mutation, including the quorum check inside a confirmation, runs
//! under one writer lock.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::matches::{LedgerState, MatchLedger};
use crate::session::{CoordinatorState, SessionCoordinator};

/// Shared handle serializing all mutation across threads.
pub type SharedClubState = Arc<RwLock<ClubState>>;

/// Runtime state: the match ledger plus the doubles-session coordinator.
#[derive(Debug)]
pub struct ClubState {
    pub ledger: MatchLedger,
    pub sessions: SessionCoordinator,
}

/// Snapshot of both stores for save/load. Subscribers are runtime wiring
/// and are not part of the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClubSnapshot {
    pub ledger: LedgerState,
    pub sessions: CoordinatorState,
}

impl Default for ClubState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClubState {
    pub fn new() -> Self {
        Self { ledger: MatchLedger::new(), sessions: SessionCoordinator::new() }
    }

    /// Restore runtime state from a snapshot.
    pub fn from_snapshot(snapshot: ClubSnapshot) -> Self {
        Self {
            ledger: MatchLedger::from_state(snapshot.ledger),
            sessions: SessionCoordinator::from_state(snapshot.sessions),
        }
    }

    /// Capture both stores for saving.
    pub fn to_snapshot(&self) -> ClubSnapshot {
        ClubSnapshot {
            ledger: self.ledger.get_state().clone(),
            sessions: self.sessions.get_state().clone(),
        }
    }

    pub fn into_shared(self) -> SharedClubState {
        Arc::new(RwLock::new(self))
    }
}
