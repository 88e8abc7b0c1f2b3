//! Swappable service seam.
//!
//! The core defines no wire protocol; it expects to be fronted by a remote
//! backend with an equivalent contract. These traits are that contract -
//! the in-memory stores implement them directly, and a future remote client
//! implements the same surface over whatever transport it picks. Boundary
//! methods return owned values, not borrows into store internals.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::matches::{Match, MatchLedger, MatchSubmission};
use crate::session::{DoublesSession, SessionCoordinator};
use crate::PlayerId;

/// Offset pagination over the history, most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { offset: 0, limit: 20 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}

/// Match operations a backend must provide.
pub trait MatchService {
    fn create(&mut self, submission: MatchSubmission) -> Result<Match, CoreError>;
    fn confirm(&mut self, match_id: &str, approver_id: &str) -> Result<(), CoreError>;
    fn dispute(&mut self, match_id: &str, reason: &str) -> Result<(), CoreError>;
    fn get(&self, match_id: &str) -> Option<Match>;
    fn history(&self, page: PageRequest) -> Page<Match>;
}

/// Session operations a backend must provide.
pub trait SessionService {
    fn create(
        &mut self,
        court_id: &str,
        court_name: &str,
        players: Vec<PlayerId>,
    ) -> Result<DoublesSession, CoreError>;
    fn update_arrangement(
        &mut self,
        team_a: [PlayerId; 2],
        team_b: [PlayerId; 2],
    ) -> Result<(), CoreError>;
    fn record_game(&mut self, score_a: u16, score_b: u16) -> Result<(), CoreError>;
    fn end(&mut self) -> Option<DoublesSession>;
}

impl MatchService for MatchLedger {
    fn create(&mut self, submission: MatchSubmission) -> Result<Match, CoreError> {
        self.create_match(submission).map(Match::clone)
    }

    fn confirm(&mut self, match_id: &str, approver_id: &str) -> Result<(), CoreError> {
        self.confirm_match(match_id, approver_id)
    }

    fn dispute(&mut self, match_id: &str, reason: &str) -> Result<(), CoreError> {
        self.dispute_match(match_id, reason)
    }

    fn get(&self, match_id: &str) -> Option<Match> {
        MatchLedger::get(self, match_id).cloned()
    }

    fn history(&self, page: PageRequest) -> Page<Match> {
        let all = self.matches();
        let items = all.iter().skip(page.offset).take(page.limit).cloned().collect();
        Page { items, offset: page.offset, total: all.len() }
    }
}

impl SessionService for SessionCoordinator {
    fn create(
        &mut self,
        court_id: &str,
        court_name: &str,
        players: Vec<PlayerId>,
    ) -> Result<DoublesSession, CoreError> {
        self.start_session(court_id, court_name, players).map(DoublesSession::clone)
    }

    fn update_arrangement(
        &mut self,
        team_a: [PlayerId; 2],
        team_b: [PlayerId; 2],
    ) -> Result<(), CoreError> {
        SessionCoordinator::update_arrangement(self, team_a, team_b)
    }

    fn record_game(&mut self, score_a: u16, score_b: u16) -> Result<(), CoreError> {
        SessionCoordinator::record_game(self, score_a, score_b)
    }

    fn end(&mut self) -> Option<DoublesSession> {
        self.end_session()
    }
}
