pub mod ledger;
pub mod types;

pub use ledger::{LedgerEvent, LedgerResult, LedgerState, LedgerStatistics, MatchLedger};
pub use types::{
    Confirmation, ConfirmationState, GameScore, Match, MatchMode, MatchStatus, MatchSubmission,
    Participant, TeamSide, MATCH_EXPIRY_HOURS,
};
