//! # rally_core - Match confirmation and doubles-session lifecycle engine
//!
//! The data core behind a court-side play app: players submit a match
//! result, opponents ratify it before it counts, and groups of four rotate
//! doubles partners while the engine remembers which pairings beat which.
//!
//! ## Components
//! - [`matches::MatchLedger`] - submission, multi-party confirmation
//!   quorum, disputes, and time-based expiry
//! - [`session::SessionCoordinator`] - the four-player rotation state
//!   machine and its pairwise win/loss ledger
//! - [`rating`] - skill-score math: display ratings, win probability,
//!   Elo deltas
//! - [`swap`] - the drag-gesture proximity search used to re-pair players
//!
//! Stores are plain owned values mutated through `&mut self`; embedders
//! that share one across threads wrap it in [`SharedClubState`]. Every
//! mutation notifies subscribers synchronously, after the state change.

pub mod error;
pub mod events;
pub mod matches;
pub mod rating;
pub mod service;
pub mod session;
pub mod state;
pub mod swap;


pub use error::{CoreError, Result};
pub use events::{SubscriberId, Subscribers};
pub use matches::{
    Confirmation, ConfirmationState, GameScore, LedgerEvent, LedgerState, LedgerStatistics, Match,
    MatchLedger, MatchMode, MatchStatus, MatchSubmission, Participant, TeamSide,
    MATCH_EXPIRY_HOURS,
};
pub use rating::RatingConfig;
pub use service::{MatchService, Page, PageRequest, SessionService};
pub use session::{
    combo_id, ComboRecord, CoordinatorState, DoublesSession, SessionCoordinator, SessionEvent,
    SessionGameRecord, SessionPhase,
};
pub use state::{ClubSnapshot, ClubState, SharedClubState};
pub use swap::{find_swap_target, Point, Rect, SWAP_RADIUS};

/// Opaque caller-supplied identifiers. The core checks only count and
/// uniqueness, never shape.
pub type PlayerId = String;
pub type MatchId = String;
pub type SessionId = String;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
