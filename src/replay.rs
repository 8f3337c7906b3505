//! Keystroke transcripts: JSON Lines recordings of typing input that can be
//! fed back through a session, e.g. for regression fixtures or headless runs.

use std::io::{self, BufRead};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::engine::milestone::Milestone;
use crate::engine::stats::{StatsSnapshot, StatsTracker};
use crate::session::typing::TypingSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyAction {
    Char { ch: char, at_ms: u64 },
    Backspace { at_ms: u64 },
    Reset,
}

impl KeyAction {
    pub fn at_ms(&self) -> Option<u64> {
        match self {
            KeyAction::Char { at_ms, .. } | KeyAction::Backspace { at_ms } => Some(*at_ms),
            KeyAction::Reset => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read transcript")]
    Io(#[from] io::Error),
    #[error("invalid transcript entry on line {line}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses one action per non-blank line.
pub fn parse_transcript(reader: impl BufRead) -> Result<Vec<KeyAction>, ReplayError> {
    let mut actions = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let action = serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse {
            line: idx + 1,
            source,
        })?;
        actions.push(action);
    }
    Ok(actions)
}

/// Builds a transcript from plain text typed at a fixed interval.
/// `'\x08'` stands for backspace.
pub fn actions_from_keys(keys: &str, start_ms: u64, interval_ms: u64) -> Vec<KeyAction> {
    keys.chars()
        .enumerate()
        .map(|(i, ch)| {
            let at_ms = start_ms + i as u64 * interval_ms;
            if ch == '\x08' {
                KeyAction::Backspace { at_ms }
            } else {
                KeyAction::Char { ch, at_ms }
            }
        })
        .collect()
}

#[derive(Clone, Debug, Default)]
pub struct ReplayOutcome {
    pub snapshot: StatsSnapshot,
    pub milestones: Vec<Milestone>,
    pub ignored: usize,
    pub refused_backspaces: usize,
    pub last_at_ms: u64,
}

/// Applies `actions` in order, polling the tracker after each one so that
/// milestones are reported in the order they were crossed.
pub fn run(
    session: &mut TypingSession,
    tracker: &mut StatsTracker,
    actions: &[KeyAction],
) -> ReplayOutcome {
    let mut outcome = ReplayOutcome::default();
    for action in actions {
        if let Some(at_ms) = action.at_ms() {
            outcome.last_at_ms = at_ms;
        }
        match *action {
            KeyAction::Char { ch, at_ms } => {
                if session.submit_character(ch, at_ms).ignored {
                    outcome.ignored += 1;
                }
            }
            KeyAction::Backspace { at_ms } => {
                if !session.submit_backspace(at_ms).applied {
                    outcome.refused_backspaces += 1;
                }
            }
            KeyAction::Reset => {
                session.reset();
                tracker.reset();
                continue;
            }
        }
        let (_, fresh) = tracker.update(session, outcome.last_at_ms);
        outcome.milestones.extend(fresh);
    }
    outcome.snapshot = tracker.snapshot(session, outcome.last_at_ms);
    debug!(
        actions = actions.len(),
        ignored = outcome.ignored,
        refused_backspaces = outcome.refused_backspaces,
        "replay finished"
    );
    outcome
}
