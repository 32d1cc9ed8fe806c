use crate::schema::achievements;
use anyhow::{Context, anyhow};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Study,
    Social,
    Streak,
    Course,
    Assessment,
}

impl AchievementCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Study => "study",
            Self::Social => "social",
            Self::Streak => "streak",
            Self::Course => "course",
            Self::Assessment => "assessment",
        }
    }
}

impl fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "study" => Ok(Self::Study),
            "social" => Ok(Self::Social),
            "streak" => Ok(Self::Streak),
            "course" => Ok(Self::Course),
            "assessment" => Ok(Self::Assessment),
            other => Err(anyhow!("unknown achievement category '{}'", other)),
        }
    }
}

/// Named requirement thresholds, in the order the evaluator tries them.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKey {
    CoursesCompleted,
    CoursesUploaded,
    StudyHours,
    StudySessions,
    AssessmentsCompleted,
    StreakDays,
    LongestStreak,
    XpEarned,
    FilesViewed,
    SessionsCompleted,
    GroupsJoined,
}

impl RequirementKey {
    pub const PRECEDENCE: [RequirementKey; 11] = [
        Self::CoursesCompleted,
        Self::CoursesUploaded,
        Self::StudyHours,
        Self::StudySessions,
        Self::AssessmentsCompleted,
        Self::StreakDays,
        Self::LongestStreak,
        Self::XpEarned,
        Self::FilesViewed,
        Self::SessionsCompleted,
        Self::GroupsJoined,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CoursesCompleted => "courses_completed",
            Self::CoursesUploaded => "courses_uploaded",
            Self::StudyHours => "study_hours",
            Self::StudySessions => "study_sessions",
            Self::AssessmentsCompleted => "assessments_completed",
            Self::StreakDays => "streak_days",
            Self::LongestStreak => "longest_streak",
            Self::XpEarned => "xp_earned",
            Self::FilesViewed => "files_viewed",
            Self::SessionsCompleted => "sessions_completed",
            Self::GroupsJoined => "groups_joined",
        }
    }
}

impl fmt::Display for RequirementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sparse threshold record stored as JSON on each catalog entry.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Requirements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses_completed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses_uploaded: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_sessions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessments_completed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_streak: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp_earned: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_viewed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions_completed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups_joined: Option<i64>,
}

impl Requirements {
    /// Threshold for `key`, if populated. Zero and negative values count as unset.
    pub fn threshold(&self, key: RequirementKey) -> Option<i64> {
        let value = match key {
            RequirementKey::CoursesCompleted => self.courses_completed,
            RequirementKey::CoursesUploaded => self.courses_uploaded,
            RequirementKey::StudyHours => self.study_hours,
            RequirementKey::StudySessions => self.study_sessions,
            RequirementKey::AssessmentsCompleted => self.assessments_completed,
            RequirementKey::StreakDays => self.streak_days,
            RequirementKey::LongestStreak => self.longest_streak,
            RequirementKey::XpEarned => self.xp_earned,
            RequirementKey::FilesViewed => self.files_viewed,
            RequirementKey::SessionsCompleted => self.sessions_completed,
            RequirementKey::GroupsJoined => self.groups_joined,
        };
        value.filter(|threshold| *threshold > 0)
    }

    /// Record with only `key` populated.
    pub fn single(key: RequirementKey, threshold: i64) -> Self {
        let mut requirements = Requirements::default();
        let slot = match key {
            RequirementKey::CoursesCompleted => &mut requirements.courses_completed,
            RequirementKey::CoursesUploaded => &mut requirements.courses_uploaded,
            RequirementKey::StudyHours => &mut requirements.study_hours,
            RequirementKey::StudySessions => &mut requirements.study_sessions,
            RequirementKey::AssessmentsCompleted => &mut requirements.assessments_completed,
            RequirementKey::StreakDays => &mut requirements.streak_days,
            RequirementKey::LongestStreak => &mut requirements.longest_streak,
            RequirementKey::XpEarned => &mut requirements.xp_earned,
            RequirementKey::FilesViewed => &mut requirements.files_viewed,
            RequirementKey::SessionsCompleted => &mut requirements.sessions_completed,
            RequirementKey::GroupsJoined => &mut requirements.groups_joined,
        };
        *slot = Some(threshold);
        requirements
    }

    /// Populated keys in precedence order.
    pub fn populated(&self) -> impl Iterator<Item = (RequirementKey, i64)> + '_ {
        RequirementKey::PRECEDENCE
            .into_iter()
            .filter_map(|key| self.threshold(key).map(|threshold| (key, threshold)))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Achievement {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub requirements: Requirements,
    pub xp_reward: i32,
    pub badge_color: String,
}

impl Achievement {
    pub const MAX_NAME_CHARS: usize = 255;
    pub const MAX_ICON_CHARS: usize = 64;
    pub const MAX_BADGE_COLOR_CHARS: usize = 32;

    /// First field longer than its catalog column allows, with that limit.
    pub fn oversized_field(&self) -> Option<(&'static str, usize)> {
        [
            ("name", &self.name, Self::MAX_NAME_CHARS),
            ("icon", &self.icon, Self::MAX_ICON_CHARS),
            ("badge_color", &self.badge_color, Self::MAX_BADGE_COLOR_CHARS),
        ]
        .into_iter()
        .find(|(_, value, limit)| value.chars().count() > *limit)
        .map(|(field, _, limit)| (field, limit))
    }
}

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = achievements, primary_key(name))]
pub struct AchievementRow {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub requirements: JsonValue,
    pub xp_reward: i32,
    pub badge_color: String,
}

impl TryFrom<AchievementRow> for Achievement {
    type Error = anyhow::Error;

    fn try_from(row: AchievementRow) -> Result<Self, Self::Error> {
        let category = row.category.parse()?;
        let requirements = serde_json::from_value(row.requirements)
            .with_context(|| format!("Malformed requirements on achievement '{}'", row.name))?;
        Ok(Achievement {
            name: row.name,
            description: row.description,
            icon: row.icon,
            category,
            requirements,
            xp_reward: row.xp_reward,
            badge_color: row.badge_color,
        })
    }
}

impl TryFrom<&Achievement> for AchievementRow {
    type Error = serde_json::Error;

    fn try_from(achievement: &Achievement) -> Result<Self, Self::Error> {
        Ok(AchievementRow {
            name: achievement.name.clone(),
            description: achievement.description.clone(),
            icon: achievement.icon.clone(),
            category: achievement.category.as_str().to_string(),
            requirements: serde_json::to_value(&achievement.requirements)?,
            xp_reward: achievement.xp_reward,
            badge_color: achievement.badge_color.clone(),
        })
    }
}
