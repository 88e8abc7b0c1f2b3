//! The match ledger: submission, ratification quorum, disputes, expiry.
//!
//! A match enters as `Pending` with the submitter pre-approved. Every teamB
//! participant must approve before it flips to `Confirmed`; one dispute
//! overrides any number of approvals; a sweep expires stale pending
//! matches. All three outcomes are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::types::{ConfirmationState, Match, MatchStatus, MatchSubmission};
use crate::error::CoreError;
use crate::events::{SubscriberId, Subscribers};
use crate::{MatchId, PlayerId};

pub type LedgerResult<T> = std::result::Result<T, CoreError>;

/// Ledger state for save/load.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LedgerState {
    /// Most recent first.
    pub matches: Vec<Match>,
}

/// Notification emitted after each successful ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    MatchCreated { match_id: MatchId },
    ConfirmationRecorded { match_id: MatchId, approver_id: PlayerId },
    MatchConfirmed { match_id: MatchId },
    MatchDisputed { match_id: MatchId },
    MatchExpired { match_id: MatchId },
    RatingDeltaAttached { match_id: MatchId },
}

/// In-memory store owning all submitted matches.
#[derive(Debug)]
pub struct MatchLedger {
    state: LedgerState,
    subscribers: Subscribers<LedgerEvent>,
}

impl Default for MatchLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchLedger {
    pub fn new() -> Self {
        Self { state: LedgerState::default(), subscribers: Subscribers::new() }
    }

    /// Load from save data.
    pub fn from_state(state: LedgerState) -> Self {
        Self { state, subscribers: Subscribers::new() }
    }

    /// Get current state for saving.
    pub fn get_state(&self) -> &LedgerState {
        &self.state
    }

    pub fn subscribe(&mut self, callback: impl Fn(&LedgerEvent) + Send + 'static) -> SubscriberId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Submit a match. The submitter's confirmation is pre-approved; each
    /// teamB participant gets a pending entry. Inserts at the head of the
    /// ledger (most recent first).
    pub fn create_match(&mut self, submission: MatchSubmission) -> LedgerResult<&Match> {
        validate_submission(&submission)?;

        let match_ = Match::create(submission, Utc::now());
        let match_id = match_.id.clone();
        self.state.matches.insert(0, match_);
        self.subscribers.emit(&LedgerEvent::MatchCreated { match_id });
        Ok(&self.state.matches[0])
    }

    /// Record one approver's ratification. When the last required entry
    /// turns approved, the match flips `Pending -> Confirmed` in the same
    /// write. Confirmations arriving after the match reached a terminal
    /// status are ignored, as are callers without a confirmation entry.
    pub fn confirm_match(&mut self, match_id: &str, approver_id: &str) -> LedgerResult<()> {
        let match_ = self.find_mut(match_id)?;

        if match_.status.is_terminal() {
            log::debug!("confirm ignored: match {} already {:?}", match_id, match_.status);
            return Ok(());
        }
        match match_.confirmation_for_mut(approver_id) {
            Some(entry) => entry.state = ConfirmationState::Approved,
            None => {
                log::debug!(
                    "confirm ignored: {} is not an approver of match {}",
                    approver_id,
                    match_id
                );
                return Ok(());
            }
        }

        let confirmed = match_.is_fully_approved();
        if confirmed {
            match_.status = MatchStatus::Confirmed;
        }

        self.subscribers.emit(&LedgerEvent::ConfirmationRecorded {
            match_id: match_id.to_string(),
            approver_id: approver_id.to_string(),
        });
        if confirmed {
            self.subscribers.emit(&LedgerEvent::MatchConfirmed { match_id: match_id.to_string() });
        }
        Ok(())
    }

    /// Dispute a pending match. A single dispute overrides any number of
    /// recorded approvals. Terminal matches are left untouched.
    pub fn dispute_match(&mut self, match_id: &str, reason: &str) -> LedgerResult<()> {
        let match_ = self.find_mut(match_id)?;

        if match_.status != MatchStatus::Pending {
            log::debug!("dispute ignored: match {} already {:?}", match_id, match_.status);
            return Ok(());
        }

        match_.status = MatchStatus::Disputed;
        match_.dispute_reason = Some(reason.to_string());
        self.subscribers.emit(&LedgerEvent::MatchDisputed { match_id: match_id.to_string() });
        Ok(())
    }

    /// Expire every pending match whose window has passed. Matches already
    /// in a terminal status are never touched, whatever their `expires_at`.
    /// Returns the expired ids.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> Vec<MatchId> {
        let mut expired = Vec::new();
        for match_ in &mut self.state.matches {
            if match_.status == MatchStatus::Pending && now > match_.expires_at {
                match_.status = MatchStatus::Expired;
                expired.push(match_.id.clone());
            }
        }
        for match_id in &expired {
            self.subscribers.emit(&LedgerEvent::MatchExpired { match_id: match_id.clone() });
        }
        expired
    }

    /// Attach a caller-computed display delta. Rating math lives with the
    /// caller; the ledger only stores the result.
    pub fn set_rating_delta(&mut self, match_id: &str, delta: i32) -> LedgerResult<()> {
        let match_ = self.find_mut(match_id)?;
        match_.rating_delta = Some(delta);
        self.subscribers.emit(&LedgerEvent::RatingDeltaAttached { match_id: match_id.to_string() });
        Ok(())
    }

    // ========================
    // Queries
    // ========================

    pub fn get(&self, match_id: &str) -> Option<&Match> {
        self.state.matches.iter().find(|m| m.id == match_id)
    }

    /// All matches, most recent first.
    pub fn matches(&self) -> &[Match] {
        &self.state.matches
    }

    pub fn matches_by_status(&self, status: MatchStatus) -> Vec<&Match> {
        self.state.matches.iter().filter(|m| m.status == status).collect()
    }

    /// Matches still waiting on this player's confirmation.
    pub fn matches_awaiting(&self, player_id: &str) -> Vec<&Match> {
        self.state.matches.iter().filter(|m| m.awaits_confirmation_from(player_id)).collect()
    }

    /// Badge count for the confirmation inbox.
    pub fn awaiting_count(&self, player_id: &str) -> usize {
        self.state.matches.iter().filter(|m| m.awaits_confirmation_from(player_id)).count()
    }

    pub fn statistics(&self) -> LedgerStatistics {
        LedgerStatistics {
            total: self.state.matches.len(),
            pending: self.matches_by_status(MatchStatus::Pending).len(),
            confirmed: self.matches_by_status(MatchStatus::Confirmed).len(),
            disputed: self.matches_by_status(MatchStatus::Disputed).len(),
            expired: self.matches_by_status(MatchStatus::Expired).len(),
        }
    }

    fn find_mut(&mut self, match_id: &str) -> LedgerResult<&mut Match> {
        self.state
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| CoreError::NotFound(format!("Match not found: {}", match_id)))
    }
}

/// Ledger counters for UI badges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStatistics {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub disputed: usize,
    pub expired: usize,
}

fn validate_submission(submission: &MatchSubmission) -> LedgerResult<()> {
    let expected = submission.mode.team_size();
    if submission.team_a.len() != expected || submission.team_b.len() != expected {
        return Err(CoreError::Validation(format!(
            "{:?} takes {} per side, got {}v{}",
            submission.mode,
            expected,
            submission.team_a.len(),
            submission.team_b.len()
        )));
    }

    let mut seen = HashSet::new();
    for participant in submission.team_a.iter().chain(&submission.team_b) {
        if !seen.insert(participant.id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate participant: {}",
                participant.id
            )));
        }
    }

    if !submission.team_a.iter().any(|p| p.id == submission.submitter_id) {
        return Err(CoreError::Validation(format!(
            "Submitter {} is not on teamA",
            submission.submitter_id
        )));
    }

    if submission.games.is_empty() {
        return Err(CoreError::Validation("A match needs at least one game".to_string()));
    }

    Ok(())
}
