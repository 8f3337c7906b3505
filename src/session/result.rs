use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::stats::StatsSnapshot;
use crate::session::input::CharacterEvent;
use crate::session::typing::TypingSession;

/// End-of-exercise summary, suitable for handing to a persistence layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionResult {
    pub wpm: f64,
    pub cpm: f64,
    pub accuracy: f64,
    pub correct: usize,
    pub incorrect: usize,
    pub corrections: usize,
    pub total_chars: usize,
    pub elapsed_secs: f64,
    pub timestamp: DateTime<Utc>,
    pub per_key_times: Vec<KeyTime>,
    #[serde(default)]
    pub partial: bool,
    #[serde(default = "default_completion_percent")]
    pub completion_percent: f64,
}

fn default_completion_percent() -> f64 {
    100.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyTime {
    pub key: char,
    pub time_ms: f64,
    pub correct: bool,
}

/// Time between consecutive surviving submissions, keyed by the expected char.
/// The first keystroke has no predecessor and is skipped.
pub fn per_key_times(events: &[CharacterEvent]) -> Vec<KeyTime> {
    events
        .windows(2)
        .map(|pair| KeyTime {
            key: pair[1].expected,
            time_ms: pair[1].at_ms.saturating_sub(pair[0].at_ms) as f64,
            correct: pair[1].correct,
        })
        .collect()
}

impl SessionResult {
    pub fn from_session(session: &TypingSession, snapshot: &StatsSnapshot) -> Self {
        Self {
            wpm: snapshot.wpm,
            cpm: snapshot.cpm,
            accuracy: snapshot.accuracy,
            correct: snapshot.correct,
            incorrect: snapshot.mistakes,
            corrections: snapshot.corrections,
            total_chars: session.target().len(),
            elapsed_secs: snapshot.elapsed_secs,
            timestamp: Utc::now(),
            per_key_times: per_key_times(session.input_log()),
            partial: !session.is_complete(),
            completion_percent: (snapshot.progress * 100.0).clamp(0.0, 100.0),
        }
    }
}
