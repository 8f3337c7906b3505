pub mod milestone;
pub mod stats;

pub use milestone::{Milestone, MilestoneThresholds, MilestoneTracker, detect_milestones};
pub use stats::{StatsSnapshot, StatsTracker, compute_snapshot};
