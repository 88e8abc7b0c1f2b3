use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::PlayerId;

/// A doubles session always holds exactly four players.
pub const SESSION_PLAYERS: usize = 4;

/// Unordered pairs drawable from four players.
pub const COMBO_COUNT: usize = 6;

/// Session phase. `Arranging` and `Ready` alternate once per game;
/// `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Arranging,
    Ready,
    Completed,
}

/// Canonical, order-independent id for a 2-player pairing.
pub fn combo_id(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}+{}", a, b)
    } else {
        format!("{}+{}", b, a)
    }
}

/// Cumulative record of one pairing's games as a team, regardless of which
/// side of the net they held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboRecord {
    pub id: String,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub wins: u32,
    pub losses: u32,
}

impl ComboRecord {
    /// Zeroed record; players are stored in canonical (sorted) order so the
    /// same pair always serializes identically.
    pub fn new(a: &str, b: &str) -> Self {
        let (player1, player2) = if a <= b { (a, b) } else { (b, a) };
        Self {
            id: combo_id(a, b),
            player1_id: player1.to_string(),
            player2_id: player2.to_string(),
            wins: 0,
            losses: 0,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f32 {
        if self.games_played() == 0 {
            return 0.0;
        }
        self.wins as f32 / self.games_played() as f32
    }

    pub fn is_pair(&self, a: &str, b: &str) -> bool {
        self.id == combo_id(a, b)
    }
}

/// One recorded game with the pairing frozen at record time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGameRecord {
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
    pub score_a: u16,
    pub score_b: u16,
    pub recorded_at: DateTime<Utc>,
}

/// Live rotation state for four players at one court.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoublesSession {
    pub id: String,
    pub court_id: String,
    pub court_name: String,
    pub started_at: DateTime<Utc>,
    /// Fixed for the session's lifetime.
    pub players: [PlayerId; 4],
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
    pub phase: SessionPhase,
    pub games: Vec<SessionGameRecord>,
    /// The 6 unordered pairs drawable from the 4 players; created once at
    /// session start, never added to or removed.
    pub combo_records: Vec<ComboRecord>,
}

impl DoublesSession {
    /// First two players become teamA, last two teamB - a deterministic
    /// default the caller can rearrange before the first game.
    pub(crate) fn start(
        court_id: String,
        court_name: String,
        players: [PlayerId; 4],
        now: DateTime<Utc>,
    ) -> Self {
        let team_a = [players[0].clone(), players[1].clone()];
        let team_b = [players[2].clone(), players[3].clone()];

        let mut combo_records = Vec::with_capacity(COMBO_COUNT);
        for i in 0..SESSION_PLAYERS {
            for j in (i + 1)..SESSION_PLAYERS {
                combo_records.push(ComboRecord::new(&players[i], &players[j]));
            }
        }

        Self {
            id: Uuid::new_v4().to_string(),
            court_id,
            court_name,
            started_at: now,
            players,
            team_a,
            team_b,
            phase: SessionPhase::Ready,
            games: Vec::new(),
            combo_records,
        }
    }

    pub fn combo(&self, a: &str, b: &str) -> Option<&ComboRecord> {
        self.combo_records.iter().find(|c| c.is_pair(a, b))
    }

    pub(crate) fn combo_mut(&mut self, a: &str, b: &str) -> Option<&mut ComboRecord> {
        self.combo_records.iter_mut().find(|c| c.is_pair(a, b))
    }

    /// Pairing with the best win rate among those that have played.
    /// Ties resolve toward more games, then canonical id.
    pub fn best_combo(&self) -> Option<&ComboRecord> {
        self.played_combos().max_by(|x, y| {
            rank(x)
                .partial_cmp(&rank(y))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(y.id.cmp(&x.id))
        })
    }

    /// Pairing with the worst win rate among those that have played.
    pub fn worst_combo(&self) -> Option<&ComboRecord> {
        self.played_combos().min_by(|x, y| {
            rank(x)
                .partial_cmp(&rank(y))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(x.id.cmp(&y.id))
        })
    }

    fn played_combos(&self) -> impl Iterator<Item = &ComboRecord> {
        self.combo_records.iter().filter(|c| c.games_played() > 0)
    }

    /// The two teams must partition the session's four players.
    pub(crate) fn validate_arrangement(
        &self,
        team_a: &[PlayerId; 2],
        team_b: &[PlayerId; 2],
    ) -> Result<(), CoreError> {
        let mut proposed: Vec<&str> =
            team_a.iter().chain(team_b.iter()).map(String::as_str).collect();
        proposed.sort_unstable();
        proposed.dedup();

        let mut current: Vec<&str> = self.players.iter().map(String::as_str).collect();
        current.sort_unstable();

        if proposed != current {
            return Err(CoreError::Validation(
                "Arrangement must split the session's four players into two pairs".to_string(),
            ));
        }
        Ok(())
    }
}

fn rank(combo: &ComboRecord) -> (f32, u32) {
    (combo.win_rate(), combo.games_played())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> [PlayerId; 4] {
        ["p1", "p2", "p3", "p4"].map(String::from)
    }

    fn session() -> DoublesSession {
        DoublesSession::start("court-1".to_string(), "Center Court".to_string(), players(), Utc::now())
    }

    #[test]
    fn test_combo_id_is_order_independent() {
        assert_eq!(combo_id("p1", "p2"), combo_id("p2", "p1"));
        assert_ne!(combo_id("p1", "p2"), combo_id("p1", "p3"));
    }

    #[test]
    fn test_start_defaults() {
        let session = session();
        assert_eq!(session.team_a, ["p1", "p2"]);
        assert_eq!(session.team_b, ["p3", "p4"]);
        assert_eq!(session.phase, SessionPhase::Ready);
        assert!(session.games.is_empty());
    }

    #[test]
    fn test_start_builds_all_six_combos_zeroed() {
        let session = session();
        assert_eq!(session.combo_records.len(), COMBO_COUNT);
        for combo in &session.combo_records {
            assert_eq!(combo.games_played(), 0);
        }
        // Every unordered pair is present exactly once.
        for (a, b) in [("p1", "p2"), ("p1", "p3"), ("p1", "p4"), ("p2", "p3"), ("p2", "p4"), ("p3", "p4")]
        {
            assert!(session.combo(a, b).is_some(), "missing combo {a}+{b}");
            assert!(session.combo(b, a).is_some(), "combo lookup must ignore order");
        }
    }

    #[test]
    fn test_combo_record_canonical_order() {
        let combo = ComboRecord::new("p4", "p1");
        assert_eq!(combo.player1_id, "p1");
        assert_eq!(combo.player2_id, "p4");
    }

    #[test]
    fn test_win_rate() {
        let mut combo = ComboRecord::new("p1", "p2");
        assert_eq!(combo.win_rate(), 0.0);
        combo.wins = 3;
        combo.losses = 1;
        assert!((combo.win_rate() - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_best_and_worst_combo() {
        let mut session = session();
        assert!(session.best_combo().is_none(), "nothing played yet");

        session.combo_mut("p1", "p2").unwrap().wins = 2;
        session.combo_mut("p3", "p4").unwrap().losses = 2;
        session.combo_mut("p1", "p3").unwrap().wins = 1;
        session.combo_mut("p1", "p3").unwrap().losses = 1;

        assert_eq!(session.best_combo().unwrap().id, combo_id("p1", "p2"));
        assert_eq!(session.worst_combo().unwrap().id, combo_id("p3", "p4"));
    }

    #[test]
    fn test_validate_arrangement() {
        let session = session();
        let ok = session.validate_arrangement(
            &["p1".to_string(), "p3".to_string()],
            &["p2".to_string(), "p4".to_string()],
        );
        assert!(ok.is_ok());

        let overlap = session.validate_arrangement(
            &["p1".to_string(), "p2".to_string()],
            &["p2".to_string(), "p4".to_string()],
        );
        assert!(overlap.is_err(), "p2 on both teams, p3 missing");

        let stranger = session.validate_arrangement(
            &["p1".to_string(), "p9".to_string()],
            &["p2".to_string(), "p4".to_string()],
        );
        assert!(stranger.is_err());
    }
}
