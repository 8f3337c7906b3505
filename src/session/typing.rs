use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;
use crate::session::input::{self, BackspaceResult, CharStatus, CharacterEvent, CharacterResult};
use crate::session::policy::MatchPolicy;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Cursor position plus running counts. `correct + mistakes == index` always.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    pub index: usize,
    pub mistakes: usize,
    pub correct: usize,
}

/// Character-matching state machine for one practice text.
///
/// Replace mode: every accepted keystroke advances the cursor, right or wrong.
/// Backspace undoes the most recent submission instead of logging its own event.
#[derive(Clone, Debug)]
pub struct TypingSession {
    pub(crate) target: Vec<char>,
    pub(crate) log: Vec<CharacterEvent>,
    pub(crate) cursor: CursorState,
    pub(crate) phase: SessionPhase,
    pub(crate) started_at_ms: Option<u64>,
    pub(crate) completed_at_ms: Option<u64>,
    pub(crate) corrections: usize,
    pub(crate) policy: MatchPolicy,
}

impl Default for TypingSession {
    fn default() -> Self {
        Self::with_policy(MatchPolicy::default())
    }
}

impl TypingSession {
    pub fn new(text: &str) -> Self {
        let mut session = Self::default();
        session.load_text(text);
        session
    }

    pub fn with_policy(policy: MatchPolicy) -> Self {
        Self {
            target: Vec::new(),
            log: Vec::new(),
            cursor: CursorState::default(),
            phase: SessionPhase::Completed,
            started_at_ms: None,
            completed_at_ms: None,
            corrections: 0,
            policy,
        }
    }

    pub fn load_text(&mut self, text: &str) {
        self.load_chars(text.chars().collect());
    }

    pub fn load_chars(&mut self, target: Vec<char>) {
        self.target = target;
        self.log.clear();
        self.cursor = CursorState::default();
        self.started_at_ms = None;
        self.completed_at_ms = None;
        self.corrections = 0;
        // Nothing to type: already at the end.
        self.phase = if self.target.is_empty() {
            SessionPhase::Completed
        } else {
            SessionPhase::NotStarted
        };
        debug!(len = self.target.len(), phase = ?self.phase, "text loaded");
    }

    pub fn reset(&mut self) {
        let target = std::mem::take(&mut self.target);
        self.load_chars(target);
    }

    pub fn submit_character(&mut self, ch: char, now_ms: u64) -> CharacterResult {
        input::process_char(self, ch, now_ms)
    }

    pub fn submit_backspace(&mut self, now_ms: u64) -> BackspaceResult {
        input::process_backspace(self, now_ms)
    }

    pub fn type_char_now(&mut self, clock: &impl Clock, ch: char) -> CharacterResult {
        self.submit_character(ch, clock.now_ms())
    }

    pub fn backspace_now(&mut self, clock: &impl Clock) -> BackspaceResult {
        self.submit_backspace(clock.now_ms())
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Applies to later comparisons only; already graded events keep their outcome.
    pub fn set_policy(&mut self, policy: MatchPolicy) {
        self.policy = policy;
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    pub fn input_log(&self) -> &[CharacterEvent] {
        &self.log
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn completed_at_ms(&self) -> Option<u64> {
        self.completed_at_ms
    }

    /// Number of backspaces that undid a submission since the text was loaded.
    pub fn corrections(&self) -> usize {
        self.corrections
    }

    pub fn progress(&self) -> f64 {
        if self.target.is_empty() {
            return 1.0;
        }
        self.cursor.index as f64 / self.target.len() as f64
    }

    pub fn mistake_positions(&self) -> Vec<usize> {
        self.log
            .iter()
            .filter(|ev| !ev.correct)
            .map(|ev| ev.position)
            .collect()
    }

    pub fn typed_text(&self) -> String {
        self.log.iter().map(|ev| ev.typed).collect()
    }

    pub fn char_status(&self, position: usize) -> CharStatus {
        match self.log.get(position) {
            Some(ev) if ev.correct => CharStatus::Correct,
            Some(_) => CharStatus::Incorrect,
            None => CharStatus::Untyped,
        }
    }

    pub fn statuses(&self) -> impl Iterator<Item = CharStatus> + '_ {
        (0..self.target.len()).map(|i| self.char_status(i))
    }
}
