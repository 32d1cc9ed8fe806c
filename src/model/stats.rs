use serde::{Deserialize, Serialize};

/// Aggregate counters recomputed from the source tables on every evaluation.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityStats {
    pub courses_uploaded: i64,
    pub study_minutes: i64,
    pub completed_sessions: i64,
    pub assessment_attempts: i64,
    pub files_viewed: i64,
    pub sessions_completed: i64,
    pub groups_joined: i64,
}

impl ActivityStats {
    /// Whole hours studied, rounded down.
    pub fn study_hours(&self) -> i64 {
        self.study_minutes.max(0) / 60
    }
}
