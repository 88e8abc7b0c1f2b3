use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PlayerId;

/// Hours before an unconfirmed match lapses.
pub const MATCH_EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Singles,
    Doubles,
}

impl MatchMode {
    /// Players per side.
    pub fn team_size(&self) -> usize {
        match self {
            MatchMode::Singles => 1,
            MatchMode::Doubles => 2,
        }
    }
}

/// Match lifecycle status. Everything except `Pending` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Confirmed,
    Disputed,
    Expired,
}

impl MatchStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationState {
    Pending,
    Approved,
    Declined,
}

/// One required approver's ratification state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub approver_id: PlayerId,
    pub state: ConfirmationState,
}

impl Confirmation {
    pub fn pending(approver_id: impl Into<PlayerId>) -> Self {
        Self { approver_id: approver_id.into(), state: ConfirmationState::Pending }
    }

    pub fn approved(approver_id: impl Into<PlayerId>) -> Self {
        Self { approver_id: approver_id.into(), state: ConfirmationState::Approved }
    }
}

/// Caller-supplied participant data. Ids and avatar URLs are opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), avatar_url: None }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    TeamA,
    TeamB,
}

/// One game's score pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameScore {
    pub team_a: u16,
    pub team_b: u16,
}

impl GameScore {
    pub fn new(team_a: u16, team_b: u16) -> Self {
        Self { team_a, team_b }
    }

    /// Which side took the game, if either did. A drawn score counts for
    /// neither.
    pub fn winner(&self) -> Option<TeamSide> {
        match self.team_a.cmp(&self.team_b) {
            std::cmp::Ordering::Greater => Some(TeamSide::TeamA),
            std::cmp::Ordering::Less => Some(TeamSide::TeamB),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Raw score submission, as captured by the result entry screen.
#[derive(Debug, Clone)]
pub struct MatchSubmission {
    pub court_id: String,
    pub court_name: String,
    pub mode: MatchMode,
    pub team_a: Vec<Participant>,
    pub team_b: Vec<Participant>,
    pub games: Vec<GameScore>,
    pub submitter_id: PlayerId,
}

/// A submitted contest result, pending ratification by the opponents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub court_id: String,
    pub court_name: String,
    pub mode: MatchMode,
    /// Submitter's side, listed first by convention.
    pub team_a: Vec<Participant>,
    pub team_b: Vec<Participant>,
    pub games: Vec<GameScore>,
    pub team_a_wins: u8,
    pub team_b_wins: u8,
    pub status: MatchStatus,
    pub expires_at: DateTime<Utc>,
    /// Exactly one entry for the submitter (pre-approved) plus one per
    /// teamB participant. TeamA teammates other than the submitter never
    /// confirm; the asymmetry is the product rule, not an accident here.
    pub confirmations: Vec<Confirmation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_delta: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispute_reason: Option<String>,
}

impl Match {
    /// Build a pending match from a validated submission. The ledger is the
    /// only caller; confirmations and status are the only fields mutated
    /// afterwards.
    pub(crate) fn create(submission: MatchSubmission, now: DateTime<Utc>) -> Self {
        let (team_a_wins, team_b_wins) = count_wins(&submission.games);

        let mut confirmations = Vec::with_capacity(1 + submission.team_b.len());
        confirmations.push(Confirmation::approved(submission.submitter_id));
        for opponent in &submission.team_b {
            confirmations.push(Confirmation::pending(opponent.id.clone()));
        }

        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            court_id: submission.court_id,
            court_name: submission.court_name,
            mode: submission.mode,
            team_a: submission.team_a,
            team_b: submission.team_b,
            games: submission.games,
            team_a_wins,
            team_b_wins,
            status: MatchStatus::Pending,
            expires_at: now + Duration::hours(MATCH_EXPIRY_HOURS),
            confirmations,
            rating_delta: None,
            dispute_reason: None,
        }
    }

    pub fn confirmation_for(&self, approver_id: &str) -> Option<&Confirmation> {
        self.confirmations.iter().find(|c| c.approver_id == approver_id)
    }

    pub(crate) fn confirmation_for_mut(&mut self, approver_id: &str) -> Option<&mut Confirmation> {
        self.confirmations.iter_mut().find(|c| c.approver_id == approver_id)
    }

    pub fn is_fully_approved(&self) -> bool {
        self.confirmations.iter().all(|c| c.state == ConfirmationState::Approved)
    }

    /// Whether `player_id` still owes a confirmation on this match.
    pub fn awaits_confirmation_from(&self, player_id: &str) -> bool {
        self.status == MatchStatus::Pending
            && self
                .confirmation_for(player_id)
                .map(|c| c.state == ConfirmationState::Pending)
                .unwrap_or(false)
    }
}

fn count_wins(games: &[GameScore]) -> (u8, u8) {
    let mut team_a_wins = 0;
    let mut team_b_wins = 0;
    for game in games {
        match game.winner() {
            Some(TeamSide::TeamA) => team_a_wins += 1,
            Some(TeamSide::TeamB) => team_b_wins += 1,
            None => {}
        }
    }
    (team_a_wins, team_b_wins)
}
