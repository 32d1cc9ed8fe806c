use crate::model::{ActivityStats, RequirementKey, Requirements, UserProgress};
use clap::ValueEnum;

/// How an achievement's populated thresholds combine.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequirementMode {
    /// Keys are tried in precedence order and the first one met unlocks.
    #[default]
    FirstMatch,
    /// Every populated key must be met.
    AllOf,
}

impl RequirementMode {
    /// Returns the key that satisfied `requirements`, or `None` if they are
    /// not met. An achievement without populated keys never unlocks.
    pub fn evaluate<F>(&self, requirements: &Requirements, measure: F) -> Option<RequirementKey>
    where
        F: Fn(RequirementKey) -> i64,
    {
        let mut populated = requirements.populated().peekable();
        match self {
            RequirementMode::FirstMatch => populated
                .find(|(key, threshold)| measure(*key) >= *threshold)
                .map(|(key, _)| key),
            RequirementMode::AllOf => {
                let (first, _) = *populated.peek()?;
                populated
                    .all(|(key, threshold)| measure(key) >= threshold)
                    .then_some(first)
            }
        }
    }
}

/// Current value of the aggregate a requirement key is compared against.
pub fn measure(key: RequirementKey, stats: &ActivityStats, progress: &UserProgress) -> i64 {
    match key {
        RequirementKey::CoursesCompleted | RequirementKey::CoursesUploaded => {
            stats.courses_uploaded
        }
        RequirementKey::StudyHours => stats.study_hours(),
        RequirementKey::StudySessions => stats.completed_sessions,
        RequirementKey::AssessmentsCompleted => stats.assessment_attempts,
        RequirementKey::StreakDays => i64::from(progress.current_streak),
        RequirementKey::LongestStreak => i64::from(progress.longest_streak),
        RequirementKey::XpEarned => progress.xp,
        RequirementKey::FilesViewed => stats.files_viewed,
        RequirementKey::SessionsCompleted => stats.sessions_completed,
        RequirementKey::GroupsJoined => stats.groups_joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgressRow;
    use uuid::Uuid;

    fn progress(xp: i64, current_streak: i32, longest_streak: i32) -> UserProgress {
        let mut row = ProgressRow::new(Uuid::new_v4());
        row.xp = xp;
        row.current_streak = current_streak;
        row.longest_streak = longest_streak;
        row.with_achievements(Vec::new())
    }

    #[test]
    fn measure_maps_each_key_to_its_aggregate() {
        let stats = ActivityStats {
            courses_uploaded: 3,
            study_minutes: 179,
            completed_sessions: 4,
            assessment_attempts: 5,
            files_viewed: 6,
            sessions_completed: 7,
            groups_joined: 8,
        };
        let progress = progress(420, 2, 9);

        let expected = [
            (RequirementKey::CoursesCompleted, 3),
            (RequirementKey::CoursesUploaded, 3),
            (RequirementKey::StudyHours, 2),
            (RequirementKey::StudySessions, 4),
            (RequirementKey::AssessmentsCompleted, 5),
            (RequirementKey::StreakDays, 2),
            (RequirementKey::LongestStreak, 9),
            (RequirementKey::XpEarned, 420),
            (RequirementKey::FilesViewed, 6),
            (RequirementKey::SessionsCompleted, 7),
            (RequirementKey::GroupsJoined, 8),
        ];
        for (key, value) in expected {
            assert_eq!(measure(key, &stats, &progress), value, "key {}", key);
        }
    }

    #[test]
    fn first_match_skips_unmet_keys_and_stops_at_first_met() {
        let requirements = Requirements {
            study_hours: Some(5),
            xp_earned: Some(100),
            groups_joined: Some(1),
            ..Requirements::default()
        };
        let measured = |key: RequirementKey| match key {
            RequirementKey::XpEarned => 150,
            RequirementKey::GroupsJoined => 3,
            _ => 0,
        };

        assert_eq!(
            RequirementMode::FirstMatch.evaluate(&requirements, measured),
            Some(RequirementKey::XpEarned)
        );
        assert_eq!(RequirementMode::AllOf.evaluate(&requirements, measured), None);
    }

    #[test]
    fn all_of_requires_every_populated_key() {
        let requirements = Requirements {
            courses_uploaded: Some(2),
            assessments_completed: Some(1),
            ..Requirements::default()
        };

        assert_eq!(
            RequirementMode::AllOf.evaluate(&requirements, |_| 2),
            Some(RequirementKey::CoursesUploaded)
        );
        assert_eq!(
            RequirementMode::AllOf.evaluate(&requirements, |key| match key {
                RequirementKey::CoursesUploaded => 2,
                _ => 0,
            }),
            None
        );
    }

    #[test]
    fn empty_requirements_never_match() {
        let requirements = Requirements::default();
        assert_eq!(RequirementMode::FirstMatch.evaluate(&requirements, |_| 1_000), None);
        assert_eq!(RequirementMode::AllOf.evaluate(&requirements, |_| 1_000), None);
    }
}
