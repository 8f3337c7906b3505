use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::milestone::{Milestone, MilestoneThresholds, MilestoneTracker};
use crate::session::typing::{SessionPhase, TypingSession};

const CHARS_PER_WORD: f64 = 5.0;

/// Point-in-time performance figures for a session. Recomputed on demand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub wpm: f64,
    pub cpm: f64,
    pub accuracy: f64,
    pub elapsed_secs: f64,
    pub correct: usize,
    pub mistakes: usize,
    pub corrections: usize,
    pub progress: f64,
}

impl StatsSnapshot {
    /// Forward keystrokes currently standing in the input log.
    pub fn keystrokes(&self) -> usize {
        self.correct + self.mistakes
    }
}

pub fn elapsed_secs(session: &TypingSession, now_ms: u64) -> f64 {
    let Some(started) = session.started_at_ms() else {
        return 0.0;
    };
    let end = match session.phase() {
        SessionPhase::Completed => session.completed_at_ms().unwrap_or(now_ms),
        _ => now_ms,
    };
    if end < started {
        warn!(started, end, "non-monotonic timestamp, clamping elapsed time to zero");
        return 0.0;
    }
    (end - started) as f64 / 1000.0
}

pub fn accuracy(correct: usize, mistakes: usize) -> f64 {
    let total = correct + mistakes;
    if total == 0 {
        return 100.0;
    }
    (correct as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

pub fn wpm(correct: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    (correct as f64 / CHARS_PER_WORD) / (elapsed_secs / 60.0)
}

pub fn cpm(correct: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    correct as f64 / (elapsed_secs / 60.0)
}

/// Derives a snapshot from session state alone. O(1), safe to call every frame.
pub fn compute_snapshot(session: &TypingSession, now_ms: u64) -> StatsSnapshot {
    let cursor = session.cursor();
    let elapsed = elapsed_secs(session, now_ms);
    StatsSnapshot {
        wpm: wpm(cursor.correct, elapsed),
        cpm: cpm(cursor.correct, elapsed),
        accuracy: accuracy(cursor.correct, cursor.mistakes),
        elapsed_secs: elapsed,
        correct: cursor.correct,
        mistakes: cursor.mistakes,
        corrections: session.corrections(),
        progress: session.progress(),
    }
}

/// Observer paired 1:1 with a [`TypingSession`].
///
/// Never mutates the session; the only state it keeps is the set of
/// milestones already announced, so repeated polling of an unchanged
/// session reports each milestone once.
#[derive(Clone, Debug, Default)]
pub struct StatsTracker {
    milestones: MilestoneTracker,
}

impl StatsTracker {
    pub fn new(thresholds: MilestoneThresholds) -> Self {
        Self {
            milestones: MilestoneTracker::new(thresholds),
        }
    }

    pub fn snapshot(&self, session: &TypingSession, now_ms: u64) -> StatsSnapshot {
        compute_snapshot(session, now_ms)
    }

    /// Snapshot plus any milestones crossed for the first time this session.
    pub fn update(
        &mut self,
        session: &TypingSession,
        now_ms: u64,
    ) -> (StatsSnapshot, Vec<Milestone>) {
        let snapshot = compute_snapshot(session, now_ms);
        let reached = self.milestones.observe(&snapshot);
        (snapshot, reached)
    }

    pub fn milestones(&self) -> &MilestoneTracker {
        &self.milestones
    }

    pub fn reset(&mut self) {
        self.milestones.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_session() {
        let session = TypingSession::new("test");
        let snap = compute_snapshot(&session, 5_000);
        assert_eq!(snap.accuracy, 100.0);
        assert_eq!(snap.wpm, 0.0);
        assert_eq!(snap.elapsed_secs, 0.0);
    }

    #[test]
    fn test_cat_final_snapshot() {
        let mut session = TypingSession::new("cat");
        session.submit_character('c', 0);
        session.submit_character('x', 100);
        session.submit_character('t', 200);

        let snap = compute_snapshot(&session, 200);
        assert_eq!(snap.correct, 2);
        assert_eq!(snap.mistakes, 1);
        assert!((snap.accuracy - 66.666).abs() < 0.01);
        assert!((snap.elapsed_secs - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_freezes_on_completion() {
        let mut session = TypingSession::new("ab");
        session.submit_character('a', 1_000);
        session.submit_character('b', 3_000);
        let snap = compute_snapshot(&session, 60_000);
        assert_eq!(snap.elapsed_secs, 2.0);
    }

    #[test]
    fn test_wpm_sixty_chars_in_sixty_seconds() {
        let text = "a".repeat(60);
        let mut session = TypingSession::new(&text);
        for i in 0..60u64 {
            session.submit_character('a', i * 60_000 / 59);
        }
        assert!(session.is_complete());
        let snap = compute_snapshot(&session, 60_000);
        assert_eq!(snap.elapsed_secs, 60.0);
        assert!((snap.wpm - 12.0).abs() < 1e-9);
        assert!((snap.cpm - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_mistakes() {
        let mut session = TypingSession::new("abcd");
        for (i, ch) in "wxyz".chars().enumerate() {
            session.submit_character(ch, i as u64 * 500);
        }
        let snap = compute_snapshot(&session, 2_000);
        assert_eq!(snap.accuracy, 0.0);
        assert_eq!(snap.wpm, 0.0);
    }

    #[test]
    fn test_non_monotonic_clock_is_clamped() {
        let mut session = TypingSession::new("abc");
        session.submit_character('a', 10_000);
        let snap = compute_snapshot(&session, 5_000);
        assert_eq!(snap.elapsed_secs, 0.0);
        assert_eq!(snap.wpm, 0.0);
    }

    #[test]
    fn test_corrections_counted() {
        let mut session = TypingSession::new("abc");
        session.submit_character('x', 0);
        session.submit_backspace(100);
        session.submit_character('a', 200);
        let snap = compute_snapshot(&session, 300);
        assert_eq!(snap.corrections, 1);
        assert_eq!(snap.mistakes, 0);
        assert_eq!(snap.accuracy, 100.0);
    }

    #[test]
    fn test_tracker_reports_milestone_once() {
        let mut tracker = StatsTracker::new(MilestoneThresholds {
            wpm: vec![10],
            accuracy: vec![],
        });
        let text = "a".repeat(10);
        let mut session = TypingSession::new(&text);
        for i in 0..10u64 {
            session.submit_character('a', i * 300);
        }

        let (_, first) = tracker.update(&session, 2_700);
        let (_, second) = tracker.update(&session, 2_700);
        assert_eq!(first, vec![Milestone::Wpm(10)]);
        assert!(second.is_empty());

        tracker.reset();
        let (_, again) = tracker.update(&session, 2_700);
        assert_eq!(again, vec![Milestone::Wpm(10)]);
    }

    #[test]
    fn test_two_key_burst_fires_no_wpm_milestone() {
        let mut tracker = StatsTracker::default();
        let mut session = TypingSession::new("abcdefgh");
        session.submit_character('a', 0);
        session.submit_character('b', 1);

        let (snap, fresh) = tracker.update(&session, 1);
        assert!((snap.wpm - 24_000.0).abs() < 1e-6);
        assert!(!fresh.iter().any(|m| matches!(m, Milestone::Wpm(_))));
        assert!(
            tracker
                .milestones()
                .reached()
                .iter()
                .all(|m| matches!(m, Milestone::Accuracy(_)))
        );
    }
}
