//! The doubles-session coordinator: one live session, a phase machine, and
//! the pairwise win/loss ledger.
//!
//! The phase cycle is `Ready -> Arranging -> Ready -> ...`: teams unlock to
//! rearrange, lock to play, and every recorded game drops the session back
//! to `Arranging` so the group decides the next pairing deliberately.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::types::{DoublesSession, SessionGameRecord, SessionPhase, SESSION_PLAYERS};
use crate::error::CoreError;
use crate::events::{SubscriberId, Subscribers};
use crate::{PlayerId, SessionId};

pub type SessionResult<T> = std::result::Result<T, CoreError>;

/// Coordinator state for save/load.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoordinatorState {
    pub active: Option<DoublesSession>,
}

/// Notification emitted after each successful coordinator mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SessionStarted { session_id: SessionId },
    ArrangementChanged { session_id: SessionId },
    TeamsLocked { session_id: SessionId },
    TeamsUnlocked { session_id: SessionId },
    GameRecorded { session_id: SessionId, game_index: usize },
    SessionEnded { session_id: SessionId },
}

/// Owns at most one active session at a time.
#[derive(Debug)]
pub struct SessionCoordinator {
    state: CoordinatorState,
    subscribers: Subscribers<SessionEvent>,
}

impl Default for SessionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCoordinator {
    pub fn new() -> Self {
        Self { state: CoordinatorState::default(), subscribers: Subscribers::new() }
    }

    /// Load from save data.
    pub fn from_state(state: CoordinatorState) -> Self {
        Self { state, subscribers: Subscribers::new() }
    }

    /// Get current state for saving.
    pub fn get_state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn subscribe(&mut self, callback: impl Fn(&SessionEvent) + Send + 'static) -> SubscriberId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn active(&self) -> Option<&DoublesSession> {
        self.state.active.as_ref()
    }

    /// Start a session for exactly four distinct players. TeamA defaults to
    /// the first two, teamB to the last two; phase starts at `Ready`. An
    /// already-active session is replaced.
    pub fn start_session(
        &mut self,
        court_id: impl Into<String>,
        court_name: impl Into<String>,
        players: Vec<PlayerId>,
    ) -> SessionResult<&DoublesSession> {
        if players.len() != SESSION_PLAYERS {
            return Err(CoreError::Validation(format!(
                "A doubles session takes exactly {} players, got {}",
                SESSION_PLAYERS,
                players.len()
            )));
        }
        let distinct: HashSet<&str> = players.iter().map(String::as_str).collect();
        if distinct.len() != SESSION_PLAYERS {
            return Err(CoreError::Validation("Session players must be distinct".to_string()));
        }

        if let Some(previous) = &self.state.active {
            if previous.phase != SessionPhase::Completed {
                log::warn!("replacing live session {} at {}", previous.id, previous.court_name);
            }
        }

        let players: [PlayerId; 4] =
            players.try_into().expect("length checked above");
        let session =
            DoublesSession::start(court_id.into(), court_name.into(), players, Utc::now());
        let session_id = session.id.clone();
        self.state.active = Some(session);
        self.subscribers.emit(&SessionEvent::SessionStarted { session_id });
        Ok(self.state.active.as_ref().unwrap())
    }

    /// Re-pair the four players. Only effective while `Arranging`; in any
    /// other phase the call is ignored. A proposal that does not partition
    /// the session's players is rejected.
    pub fn update_arrangement(
        &mut self,
        team_a: [PlayerId; 2],
        team_b: [PlayerId; 2],
    ) -> SessionResult<()> {
        let session = match self.state.active.as_mut() {
            Some(session) => session,
            None => {
                log::debug!("arrangement ignored: no active session");
                return Ok(());
            }
        };
        if session.phase != SessionPhase::Arranging {
            log::debug!("arrangement ignored: phase is {:?}", session.phase);
            return Ok(());
        }

        session.validate_arrangement(&team_a, &team_b)?;
        session.team_a = team_a;
        session.team_b = team_b;

        let session_id = session.id.clone();
        self.subscribers.emit(&SessionEvent::ArrangementChanged { session_id });
        Ok(())
    }

    /// `Arranging -> Ready`. Returns whether the transition applied.
    pub fn lock_teams(&mut self) -> bool {
        let session = match self.state.active.as_mut() {
            Some(session) if session.phase == SessionPhase::Arranging => session,
            _ => {
                log::debug!("lock ignored: not arranging");
                return false;
            }
        };
        session.phase = SessionPhase::Ready;
        let session_id = session.id.clone();
        self.subscribers.emit(&SessionEvent::TeamsLocked { session_id });
        true
    }

    /// `Ready -> Arranging`. Returns whether the transition applied.
    pub fn unlock_teams(&mut self) -> bool {
        let session = match self.state.active.as_mut() {
            Some(session) if session.phase == SessionPhase::Ready => session,
            _ => {
                log::debug!("unlock ignored: not ready");
                return false;
            }
        };
        session.phase = SessionPhase::Arranging;
        let session_id = session.id.clone();
        self.subscribers.emit(&SessionEvent::TeamsUnlocked { session_id });
        true
    }

    /// Record a finished game under the current pairing. The winning
    /// pairing's combo gains a win, the losing pairing's a loss, and the
    /// phase drops back to `Arranging` whatever it was. Rally scoring
    /// cannot draw, so equal scores are a malformed pair. With no active
    /// session the call is ignored.
    pub fn record_game(&mut self, score_a: u16, score_b: u16) -> SessionResult<()> {
        let session = match self.state.active.as_mut() {
            Some(session) => session,
            None => {
                log::debug!("game ignored: no active session");
                return Ok(());
            }
        };
        if score_a == score_b {
            return Err(CoreError::Validation(format!(
                "A game cannot end drawn ({}-{})",
                score_a, score_b
            )));
        }

        let record = SessionGameRecord {
            team_a: session.team_a.clone(),
            team_b: session.team_b.clone(),
            score_a,
            score_b,
            recorded_at: Utc::now(),
        };
        session.games.push(record);

        let (winners, losers) = if score_a > score_b {
            (session.team_a.clone(), session.team_b.clone())
        } else {
            (session.team_b.clone(), session.team_a.clone())
        };
        if let Some(combo) = session.combo_mut(&winners[0], &winners[1]) {
            combo.wins += 1;
        }
        if let Some(combo) = session.combo_mut(&losers[0], &losers[1]) {
            combo.losses += 1;
        }

        session.phase = SessionPhase::Arranging;

        let session_id = session.id.clone();
        let game_index = session.games.len() - 1;
        self.subscribers.emit(&SessionEvent::GameRecorded { session_id, game_index });
        Ok(())
    }

    /// Complete the session and hand it to the caller for archival. The
    /// coordinator stops tracking it; with nothing active this returns
    /// `None`.
    pub fn end_session(&mut self) -> Option<DoublesSession> {
        let mut session = self.state.active.take()?;
        session.phase = SessionPhase::Completed;
        self.subscribers.emit(&SessionEvent::SessionEnded { session_id: session.id.clone() });
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::combo_id;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn players() -> Vec<PlayerId> {
        vec!["p1".to_string(), "p2".to_string(), "p3".to_string(), "p4".to_string()]
    }

    fn pair(a: &str, b: &str) -> [PlayerId; 2] {
        [a.to_string(), b.to_string()]
    }

    fn started() -> SessionCoordinator {
        let mut coordinator = SessionCoordinator::new();
        coordinator.start_session("court-1", "Center Court", players()).unwrap();
        coordinator
    }

    #[test]
    fn test_start_session_defaults() {
        let coordinator = started();
        let session = coordinator.active().unwrap();

        assert_eq!(session.team_a, ["p1", "p2"]);
        assert_eq!(session.team_b, ["p3", "p4"]);
        assert_eq!(session.phase, SessionPhase::Ready);
        assert_eq!(session.combo_records.len(), 6);
        assert!(session.combo_records.iter().all(|c| c.games_played() == 0));
    }

    #[test]
    fn test_start_session_rejects_wrong_count() {
        let mut coordinator = SessionCoordinator::new();
        let mut three = players();
        three.pop();

        let err = coordinator.start_session("court-1", "Center Court", three).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(coordinator.active().is_none());
    }

    #[test]
    fn test_start_session_rejects_duplicates() {
        let mut coordinator = SessionCoordinator::new();
        let mut dupes = players();
        dupes[3] = "p1".to_string();

        assert!(matches!(
            coordinator.start_session("court-1", "Center Court", dupes),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_start_session_replaces_previous() {
        let mut coordinator = started();
        let first_id = coordinator.active().unwrap().id.clone();

        coordinator
            .start_session(
                "court-2",
                "Back Court",
                vec!["q1".to_string(), "q2".to_string(), "q3".to_string(), "q4".to_string()],
            )
            .unwrap();

        let session = coordinator.active().unwrap();
        assert_ne!(session.id, first_id);
        assert_eq!(session.court_id, "court-2");
    }

    #[test]
    fn test_lock_unlock_cycle() {
        let mut coordinator = started();

        assert!(!coordinator.lock_teams(), "already ready, lock is a no-op");
        assert!(coordinator.unlock_teams());
        assert_eq!(coordinator.active().unwrap().phase, SessionPhase::Arranging);
        assert!(!coordinator.unlock_teams(), "already arranging");
        assert!(coordinator.lock_teams());
        assert_eq!(coordinator.active().unwrap().phase, SessionPhase::Ready);
    }

    #[test]
    fn test_update_arrangement_only_while_arranging() {
        let mut coordinator = started();

        // Ready: silently ignored.
        coordinator.update_arrangement(pair("p1", "p3"), pair("p2", "p4")).unwrap();
        assert_eq!(coordinator.active().unwrap().team_a, ["p1", "p2"]);

        coordinator.unlock_teams();
        coordinator.update_arrangement(pair("p1", "p3"), pair("p2", "p4")).unwrap();
        let session = coordinator.active().unwrap();
        assert_eq!(session.team_a, ["p1", "p3"]);
        assert_eq!(session.team_b, ["p2", "p4"]);
    }

    #[test]
    fn test_update_arrangement_rejects_bad_partition() {
        let mut coordinator = started();
        coordinator.unlock_teams();

        let err =
            coordinator.update_arrangement(pair("p1", "p2"), pair("p2", "p4")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        // State untouched after the rejection.
        assert_eq!(coordinator.active().unwrap().team_a, ["p1", "p2"]);
    }

    #[test]
    fn test_record_game_updates_exactly_two_combos() {
        let mut coordinator = started();
        coordinator.record_game(11, 5).unwrap();

        let session = coordinator.active().unwrap();
        assert_eq!(session.games.len(), 1);
        assert_eq!(session.combo("p1", "p2").unwrap().wins, 1);
        assert_eq!(session.combo("p3", "p4").unwrap().losses, 1);

        let touched: u32 =
            session.combo_records.iter().map(|c| c.wins + c.losses).sum();
        assert_eq!(touched, 2 * session.games.len() as u32);
        assert_eq!(session.phase, SessionPhase::Arranging, "recording forces a rearrangement");
    }

    #[test]
    fn test_record_game_rejects_draws() {
        let mut coordinator = started();
        let err = coordinator.record_game(7, 7).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(coordinator.active().unwrap().games.is_empty());
    }

    #[test]
    fn test_record_game_without_session_is_noop() {
        let mut coordinator = SessionCoordinator::new();
        coordinator.record_game(11, 5).unwrap();
        assert!(coordinator.active().is_none());
    }

    #[test]
    fn test_rearranged_game_credits_new_pairing() {
        let mut coordinator = started();
        coordinator.unlock_teams();
        coordinator.update_arrangement(pair("p1", "p3"), pair("p2", "p4")).unwrap();
        coordinator.lock_teams();

        coordinator.record_game(11, 5).unwrap();

        let session = coordinator.active().unwrap();
        assert_eq!(session.combo("p1", "p3").unwrap().wins, 1);
        assert_eq!(session.combo("p2", "p4").unwrap().losses, 1);
        for (a, b) in [("p1", "p2"), ("p1", "p4"), ("p2", "p3"), ("p3", "p4")] {
            assert_eq!(session.combo(a, b).unwrap().games_played(), 0, "{a}+{b} untouched");
        }
    }

    #[test]
    fn test_game_record_freezes_pairing() {
        let mut coordinator = started();
        coordinator.record_game(11, 5).unwrap();
        coordinator.update_arrangement(pair("p1", "p3"), pair("p2", "p4")).unwrap();
        coordinator.lock_teams();
        coordinator.record_game(4, 11).unwrap();

        let session = coordinator.active().unwrap();
        assert_eq!(session.games[0].team_a, ["p1", "p2"]);
        assert_eq!(session.games[1].team_a, ["p1", "p3"]);
        assert_eq!(session.combo("p2", "p4").unwrap().wins, 1);
        assert_eq!(session.combo("p1", "p3").unwrap().losses, 1);
    }

    #[test]
    fn test_end_session() {
        let mut coordinator = started();
        coordinator.record_game(11, 5).unwrap();

        let session = coordinator.end_session().unwrap();
        assert_eq!(session.phase, SessionPhase::Completed);
        assert_eq!(session.games.len(), 1);
        assert!(coordinator.active().is_none());
        assert!(coordinator.end_session().is_none(), "nothing left to end");
    }

    #[test]
    fn test_events_fire_per_mutation() {
        let mut coordinator = SessionCoordinator::new();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        coordinator.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        coordinator.start_session("court-1", "Center Court", players()).unwrap();
        coordinator.unlock_teams();
        coordinator.update_arrangement(pair("p1", "p3"), pair("p2", "p4")).unwrap();
        coordinator.lock_teams();
        coordinator.record_game(11, 5).unwrap();
        coordinator.end_session().unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 6);

        // No-ops never notify.
        coordinator.record_game(11, 5).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_state_roundtrip() {
        let mut coordinator = started();
        coordinator.record_game(11, 5).unwrap();

        let restored = SessionCoordinator::from_state(coordinator.get_state().clone());
        let session = restored.active().unwrap();
        assert_eq!(session.games.len(), 1);
        assert_eq!(session.combo("p1", "p2").unwrap().id, combo_id("p1", "p2"));
        assert_eq!(session.combo("p1", "p2").unwrap().wins, 1);
    }
}
