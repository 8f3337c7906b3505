use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::stats::StatsSnapshot;

/// WPM over a shorter span than this is too noisy to announce.
pub const MIN_WPM_ELAPSED_SECS: f64 = 2.0;
/// One standard word.
pub const MIN_WPM_CORRECT_CHARS: usize = 5;

/// A one-time-per-session threshold crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Milestone {
    Wpm(u32),
    Accuracy(u32),
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Milestone::Wpm(v) => write!(f, "wpm:{v}"),
            Milestone::Accuracy(v) => write!(f, "accuracy:{v}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid milestone key {0:?}")]
pub struct ParseMilestoneError(String);

impl FromStr for Milestone {
    type Err = ParseMilestoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMilestoneError(s.to_string());
        let (kind, value) = s.split_once(':').ok_or_else(err)?;
        let value: u32 = value.parse().map_err(|_| err())?;
        match kind {
            "wpm" => Ok(Milestone::Wpm(value)),
            "accuracy" => Ok(Milestone::Accuracy(value)),
            _ => Err(err()),
        }
    }
}

impl From<Milestone> for String {
    fn from(m: Milestone) -> Self {
        m.to_string()
    }
}

impl TryFrom<String> for Milestone {
    type Error = ParseMilestoneError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneThresholds {
    #[serde(default = "default_wpm_thresholds")]
    pub wpm: Vec<u32>,
    #[serde(default = "default_accuracy_thresholds")]
    pub accuracy: Vec<u32>,
}

fn default_wpm_thresholds() -> Vec<u32> {
    (1..=8).map(|i| i * 10).collect()
}

fn default_accuracy_thresholds() -> Vec<u32> {
    vec![90, 95, 98, 99]
}

impl Default for MilestoneThresholds {
    fn default() -> Self {
        Self {
            wpm: default_wpm_thresholds(),
            accuracy: default_accuracy_thresholds(),
        }
    }
}

impl MilestoneThresholds {
    /// Sort ascending and drop duplicates.
    pub fn normalize(&mut self) {
        self.wpm.sort_unstable();
        self.wpm.dedup();
        self.accuracy.sort_unstable();
        self.accuracy.dedup();
    }
}

/// Milestones met by `snapshot` that are not yet in `reached`, ordered by
/// kind then threshold.
///
/// Accuracy milestones need at least one keystroke; an untouched session
/// reports 100% by definition and would otherwise trigger all of them.
/// WPM milestones need [`MIN_WPM_ELAPSED_SECS`] and [`MIN_WPM_CORRECT_CHARS`],
/// so an opening burst of two quick keys does not use them all up.
pub fn detect_milestones(
    snapshot: &StatsSnapshot,
    thresholds: &MilestoneThresholds,
    reached: &BTreeSet<Milestone>,
) -> Vec<Milestone> {
    let wpm = thresholds
        .wpm
        .iter()
        .filter(|_| wpm_eligible(snapshot))
        .filter(|&&t| snapshot.wpm >= t as f64)
        .map(|&t| Milestone::Wpm(t));
    let accuracy = thresholds
        .accuracy
        .iter()
        .filter(|_| snapshot.keystrokes() > 0)
        .filter(|&&t| snapshot.accuracy >= t as f64)
        .map(|&t| Milestone::Accuracy(t));

    let mut fresh: Vec<Milestone> = wpm
        .chain(accuracy)
        .filter(|m| !reached.contains(m))
        .collect();
    fresh.sort_unstable();
    fresh.dedup();
    fresh
}

fn wpm_eligible(snapshot: &StatsSnapshot) -> bool {
    snapshot.elapsed_secs >= MIN_WPM_ELAPSED_SECS && snapshot.correct >= MIN_WPM_CORRECT_CHARS
}

#[derive(Clone, Debug, Default)]
pub struct MilestoneTracker {
    thresholds: MilestoneThresholds,
    reached: BTreeSet<Milestone>,
}

impl MilestoneTracker {
    pub fn new(mut thresholds: MilestoneThresholds) -> Self {
        thresholds.normalize();
        Self {
            thresholds,
            reached: BTreeSet::new(),
        }
    }

    pub fn thresholds(&self) -> &MilestoneThresholds {
        &self.thresholds
    }

    pub fn reached(&self) -> &BTreeSet<Milestone> {
        &self.reached
    }

    /// Records and returns milestones newly crossed by `snapshot`.
    pub fn observe(&mut self, snapshot: &StatsSnapshot) -> Vec<Milestone> {
        let fresh = detect_milestones(snapshot, &self.thresholds, &self.reached);
        for m in &fresh {
            debug!(milestone = %m, "milestone reached");
            self.reached.insert(*m);
        }
        fresh
    }

    pub fn reset(&mut self) {
        self.reached.clear();
    }
}
