use typecore::engine::stats::compute_snapshot;
use typecore::engine::{Milestone, MilestoneThresholds, StatsTracker};
use typecore::session::result::SessionResult;
use typecore::{CharStatus, Clock, ManualClock, MatchPolicy, SessionPhase, TypingSession};

fn assert_invariants(session: &TypingSession, now_ms: u64) {
    let cursor = session.cursor();
    assert!(cursor.index <= session.target().len());
    assert_eq!(cursor.correct + cursor.mistakes, cursor.index);
    assert_eq!(
        session.phase() == SessionPhase::Completed,
        cursor.index == session.target().len()
    );
    let snap = compute_snapshot(session, now_ms);
    assert!((0.0..=100.0).contains(&snap.accuracy));
    assert!(snap.wpm >= 0.0);
}

#[test]
fn cat_with_one_mistake() {
    let mut session = TypingSession::new("cat");

    let r = session.submit_character('c', 0);
    assert_eq!((r.position, r.correct, r.ignored), (0, true, false));
    let r = session.submit_character('x', 100);
    assert_eq!((r.position, r.correct), (1, false));
    assert_eq!(session.cursor().mistakes, 1);
    let r = session.submit_character('t', 200);
    assert_eq!((r.position, r.correct), (2, true));
    assert_eq!(session.phase(), SessionPhase::Completed);

    let snap = compute_snapshot(&session, 200);
    assert_eq!(snap.correct, 2);
    assert_eq!(snap.mistakes, 1);
    assert!((snap.accuracy - 200.0 / 3.0).abs() < 1e-9);
}

#[test]
fn backspace_does_not_return_to_not_started() {
    let mut session = TypingSession::new("ab");
    session.submit_character('a', 0);
    session.submit_backspace(10);

    assert_eq!(session.cursor().index, 0);
    assert_eq!(session.cursor().correct, 0);
    assert!(session.input_log().is_empty());
    assert_eq!(session.phase(), SessionPhase::InProgress);

    session.reset();
    assert_eq!(session.phase(), SessionPhase::NotStarted);
}

#[test]
fn case_insensitive_and_whitespace_policies() {
    let mut session = TypingSession::with_policy(MatchPolicy::default().case_insensitive());
    session.load_text("Hi");
    assert!(session.submit_character('h', 0).correct);

    let mut session = TypingSession::with_policy(MatchPolicy::default().lenient_whitespace());
    session.load_text("a\tb");
    session.submit_character('a', 0);
    assert!(session.submit_character(' ', 10).correct);
}

#[test]
fn overflow_is_ignored() {
    let mut session = TypingSession::new("a");
    session.submit_character('a', 0);
    let before = session.cursor();
    let r = session.submit_character('b', 50);
    assert!(r.ignored && r.overflow);
    assert_eq!(session.cursor(), before);
}

#[test]
fn full_practice_round_with_clock_and_milestones() {
    let clock = ManualClock::new(0);
    let mut session = TypingSession::new("the fox");
    let mut tracker = StatsTracker::new(MilestoneThresholds {
        wpm: vec![10, 500],
        accuracy: vec![90],
    });
    let mut announced = Vec::new();

    for ch in "thx".chars() {
        session.type_char_now(&clock, ch);
        clock.advance(400);
        announced.extend(tracker.update(&session, clock.now_ms()).1);
        assert_invariants(&session, clock.now_ms());
    }
    session.backspace_now(&clock);
    for ch in "e fox".chars() {
        session.type_char_now(&clock, ch);
        clock.advance(400);
        announced.extend(tracker.update(&session, clock.now_ms()).1);
        assert_invariants(&session, clock.now_ms());
    }

    assert!(session.is_complete());
    assert_eq!(announced, vec![Milestone::Accuracy(90), Milestone::Wpm(10)]);
    assert!(tracker.update(&session, 99_999).1.is_empty());

    let snap = compute_snapshot(&session, 99_999);
    assert_eq!(snap.mistakes, 0);
    assert_eq!(snap.corrections, 1);

    let result = SessionResult::from_session(&session, &snap);
    assert!(!result.partial);
    assert_eq!(result.total_chars, 7);
    assert!(session.statuses().all(|s| s == CharStatus::Correct));
}
