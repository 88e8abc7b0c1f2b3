pub mod coordinator;
pub mod types;

pub use coordinator::{CoordinatorState, SessionCoordinator, SessionEvent, SessionResult};
pub use types::{
    combo_id, ComboRecord, DoublesSession, SessionGameRecord, SessionPhase, COMBO_COUNT,
    SESSION_PLAYERS,
};
