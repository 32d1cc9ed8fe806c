//! Built-in Studygram achievements.
//!
//! Mirrors the seed migration so the in-memory backend starts with the same
//! catalog a fresh PostgreSQL database has.

use crate::model::{Achievement, AchievementCategory, RequirementKey, Requirements};

struct BuiltIn {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: AchievementCategory,
    key: RequirementKey,
    threshold: i64,
    xp_reward: i32,
    badge_color: &'static str,
}

const BUILT_IN: &[BuiltIn] = &[
    BuiltIn {
        name: "First Course",
        description: "Upload your first course",
        icon: "book",
        category: AchievementCategory::Course,
        key: RequirementKey::CoursesUploaded,
        threshold: 1,
        xp_reward: 50,
        badge_color: "blue",
    },
    BuiltIn {
        name: "Course Collector",
        description: "Upload five courses",
        icon: "library",
        category: AchievementCategory::Course,
        key: RequirementKey::CoursesUploaded,
        threshold: 5,
        xp_reward: 100,
        badge_color: "indigo",
    },
    BuiltIn {
        name: "Study Starter",
        description: "Study for one hour in total",
        icon: "clock",
        category: AchievementCategory::Study,
        key: RequirementKey::StudyHours,
        threshold: 1,
        xp_reward: 25,
        badge_color: "green",
    },
    BuiltIn {
        name: "Dedicated Learner",
        description: "Study for ten hours in total",
        icon: "hourglass",
        category: AchievementCategory::Study,
        key: RequirementKey::StudyHours,
        threshold: 10,
        xp_reward: 150,
        badge_color: "emerald",
    },
    BuiltIn {
        name: "Session Finisher",
        description: "Finish five study sessions",
        icon: "check",
        category: AchievementCategory::Study,
        key: RequirementKey::StudySessions,
        threshold: 5,
        xp_reward: 50,
        badge_color: "teal",
    },
    BuiltIn {
        name: "Quiz Taker",
        description: "Complete your first assessment",
        icon: "pencil",
        category: AchievementCategory::Assessment,
        key: RequirementKey::AssessmentsCompleted,
        threshold: 1,
        xp_reward: 30,
        badge_color: "orange",
    },
    BuiltIn {
        name: "Assessment Ace",
        description: "Complete twenty assessments",
        icon: "trophy",
        category: AchievementCategory::Assessment,
        key: RequirementKey::AssessmentsCompleted,
        threshold: 20,
        xp_reward: 200,
        badge_color: "amber",
    },
    BuiltIn {
        name: "Week Warrior",
        description: "Study seven days in a row",
        icon: "flame",
        category: AchievementCategory::Streak,
        key: RequirementKey::StreakDays,
        threshold: 7,
        xp_reward: 100,
        badge_color: "red",
    },
    BuiltIn {
        name: "Unstoppable",
        description: "Reach a thirty day streak",
        icon: "rocket",
        category: AchievementCategory::Streak,
        key: RequirementKey::LongestStreak,
        threshold: 30,
        xp_reward: 300,
        badge_color: "rose",
    },
    BuiltIn {
        name: "XP Hunter",
        description: "Earn 1000 XP",
        icon: "star",
        category: AchievementCategory::Study,
        key: RequirementKey::XpEarned,
        threshold: 1000,
        xp_reward: 100,
        badge_color: "yellow",
    },
    BuiltIn {
        name: "Curious Reader",
        description: "View ten course files",
        icon: "eye",
        category: AchievementCategory::Course,
        key: RequirementKey::FilesViewed,
        threshold: 10,
        xp_reward: 40,
        badge_color: "sky",
    },
    BuiltIn {
        name: "Marathoner",
        description: "Complete twenty-five sessions",
        icon: "medal",
        category: AchievementCategory::Study,
        key: RequirementKey::SessionsCompleted,
        threshold: 25,
        xp_reward: 150,
        badge_color: "purple",
    },
    BuiltIn {
        name: "Team Player",
        description: "Join your first study group",
        icon: "users",
        category: AchievementCategory::Social,
        key: RequirementKey::GroupsJoined,
        threshold: 1,
        xp_reward: 30,
        badge_color: "pink",
    },
];

pub fn default_catalog() -> Vec<Achievement> {
    BUILT_IN
        .iter()
        .map(|entry| Achievement {
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            icon: entry.icon.to_string(),
            category: entry.category,
            requirements: Requirements::single(entry.key, entry.threshold),
            xp_reward: entry.xp_reward,
            badge_color: entry.badge_color.to_string(),
        })
        .collect()
}
