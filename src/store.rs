//! Persistence seam of the progress engine.
//!
//! Every method is one atomic unit: implementations must never let two
//! concurrent calls for the same user lose an XP increment or unlock the
//! same achievement twice.

use crate::errors::AppError;
use crate::model::{
    Achievement, ActivityStats, NewXpActivity, ProgressRow, UserProgress, XpActivity,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Filter for reading a user's XP log, newest entries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityQuery {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: i64,
}

impl ActivityQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 500;

    pub fn new(
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Self {
        ActivityQuery {
            since,
            until,
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    pub(crate) fn matches(&self, at: DateTime<Utc>) -> bool {
        self.since.is_none_or(|since| at >= since) && self.until.is_none_or(|until| at <= until)
    }
}

impl Default for ActivityQuery {
    fn default() -> Self {
        ActivityQuery::new(None, None, None)
    }
}

#[async_trait]
pub trait GamificationStore: Send + Sync {
    /// Progress of `user_id` with its unlocked achievement names, if any exists.
    async fn load_progress(&self, user_id: Uuid) -> Result<Option<UserProgress>, AppError>;

    /// Adds `activity.xp_earned` to the user's progress (creating it if absent)
    /// and appends `activity` to the log.
    async fn grant_xp(&self, activity: NewXpActivity) -> Result<ProgressRow, AppError>;

    /// Records the unlock, grants its reward and logs it. Returns `false`
    /// without side effects when the user already holds the achievement.
    async fn unlock_achievement(
        &self,
        user_id: Uuid,
        achievement: &Achievement,
    ) -> Result<bool, AppError>;

    /// Counts `day` toward the user's streak (creating progress if absent).
    async fn record_streak_day(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<UserProgress, AppError>;

    async fn activity_stats(&self, user_id: Uuid) -> Result<ActivityStats, AppError>;

    /// Full catalog, oldest entries first.
    async fn load_catalog(&self) -> Result<Vec<Achievement>, AppError>;

    /// Inserts or replaces the catalog entry with the same name.
    async fn save_achievement(&self, achievement: &Achievement) -> Result<(), AppError>;

    async fn list_activities(
        &self,
        user_id: Uuid,
        query: ActivityQuery,
    ) -> Result<Vec<XpActivity>, AppError>;
}
