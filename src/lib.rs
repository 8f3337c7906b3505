//! Typing-practice core: a character-matching session state machine plus the
//! statistics and milestone tracking derived from it. Rendering, persistence
//! and text selection are left to the caller.

pub mod clock;
pub mod config;
pub mod engine;
pub mod replay;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Milestone, MilestoneThresholds, StatsSnapshot, StatsTracker};
pub use session::{
    BackspaceResult, CharStatus, CharacterResult, MatchPolicy, SessionPhase, TypingSession,
};
