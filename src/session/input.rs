use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::typing::{SessionPhase, TypingSession};

/// Per-position classification of the target text, for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharStatus {
    Untyped,
    Correct,
    Incorrect,
}

/// One accepted forward keystroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEvent {
    pub typed: char,
    pub expected: char,
    pub correct: bool,
    pub position: usize,
    pub at_ms: u64,
}

/// Outcome of a forward submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterResult {
    pub position: usize,
    pub correct: bool,
    pub ignored: bool,
    /// Set when the submission arrived with the cursor already at the end of the text.
    pub overflow: bool,
}

impl CharacterResult {
    fn accepted(position: usize, correct: bool) -> Self {
        Self {
            position,
            correct,
            ignored: false,
            overflow: false,
        }
    }

    fn overflowed(position: usize) -> Self {
        Self {
            position,
            correct: false,
            ignored: true,
            overflow: true,
        }
    }
}

/// Outcome of a backspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackspaceResult {
    pub applied: bool,
    pub new_position: usize,
    /// The submission that was undone, if any.
    pub undone: Option<CharacterEvent>,
}

pub fn process_char(session: &mut TypingSession, ch: char, now_ms: u64) -> CharacterResult {
    let position = session.cursor.index;
    if session.phase == SessionPhase::Completed || position >= session.target.len() {
        debug!(position, ?ch, "submission past end of text ignored");
        return CharacterResult::overflowed(position);
    }

    if session.phase == SessionPhase::NotStarted {
        session.phase = SessionPhase::InProgress;
        session.started_at_ms = Some(now_ms);
        debug!(at_ms = now_ms, "session started");
    }

    let expected = session.target[position];
    let correct = session.policy.matches(ch, expected);

    session.log.push(CharacterEvent {
        typed: ch,
        expected,
        correct,
        position,
        at_ms: now_ms,
    });
    if correct {
        session.cursor.correct += 1;
    } else {
        session.cursor.mistakes += 1;
    }
    session.cursor.index += 1;

    if session.cursor.index == session.target.len() {
        session.phase = SessionPhase::Completed;
        session.completed_at_ms = Some(now_ms);
        debug!(
            at_ms = now_ms,
            correct = session.cursor.correct,
            mistakes = session.cursor.mistakes,
            "session completed"
        );
    }

    CharacterResult::accepted(position, correct)
}

pub fn process_backspace(session: &mut TypingSession, now_ms: u64) -> BackspaceResult {
    let refused = BackspaceResult {
        applied: false,
        new_position: session.cursor.index,
        undone: None,
    };
    if !session.policy.allow_backspace
        || session.phase == SessionPhase::Completed
        || session.cursor.index == 0
    {
        debug!(position = session.cursor.index, "backspace refused");
        return refused;
    }

    let Some(undone) = session.log.pop() else {
        return refused;
    };
    if undone.correct {
        session.cursor.correct -= 1;
    } else {
        session.cursor.mistakes -= 1;
    }
    session.cursor.index -= 1;
    session.corrections += 1;
    debug!(position = session.cursor.index, at_ms = now_ms, "backspace applied");

    BackspaceResult {
        applied: true,
        new_position: session.cursor.index,
        undone: Some(undone),
    }
}
