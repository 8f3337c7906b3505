pub mod input;
pub mod policy;
pub mod result;
pub mod typing;

pub use input::{BackspaceResult, CharStatus, CharacterEvent, CharacterResult};
pub use policy::MatchPolicy;
pub use typing::{CursorState, SessionPhase, TypingSession};
