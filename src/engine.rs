//! XP awarding and achievement unlocking.
//!
//! [`ProgressEngine`] owns no state of its own: every mutation is delegated
//! to the injected [`GamificationStore`] as a single atomic operation.

use crate::errors::AppError;
use crate::model::{
    Achievement, ActivityStats, NewXpActivity, UserProgress, XpActivity,
};
use crate::store::{ActivityQuery, GamificationStore};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

mod requirements;

pub use requirements::{RequirementMode, measure};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StreakUpdate {
    pub progress: UserProgress,
    pub unlocked: Vec<Achievement>,
}

#[derive(Clone)]
pub struct ProgressEngine {
    store: Arc<dyn GamificationStore>,
    mode: RequirementMode,
}

impl ProgressEngine {
    pub fn new(store: Arc<dyn GamificationStore>, mode: RequirementMode) -> Self {
        ProgressEngine { store, mode }
    }

    pub fn mode(&self) -> RequirementMode {
        self.mode
    }

    /// Adds `amount` XP for `user_id`, logs it under `activity_type`, then
    /// runs the achievement evaluator and returns what it unlocked.
    #[instrument(skip(self, description))]
    pub async fn award_xp(
        &self,
        user_id: Uuid,
        amount: i64,
        activity_type: &str,
        description: &str,
    ) -> Result<Vec<Achievement>, AppError> {
        if amount < 0 {
            warn!("Rejecting negative XP amount {} for user {}", amount, user_id);
            return Err(AppError::BadRequest(format!(
                "XP amount must be non-negative, got {}",
                amount
            )));
        }

        let progress = self
            .store
            .grant_xp(NewXpActivity {
                user_id,
                activity_type: activity_type.to_string(),
                xp_earned: amount,
                description: description.to_string(),
            })
            .await?;
        info!(
            "Awarded {} XP to user {} ({}), now at {} XP / level {}",
            amount, user_id, activity_type, progress.xp, progress.level
        );

        self.check_and_unlock_achievements(user_id).await
    }

    /// [`award_xp`](Self::award_xp) for callers that must not fail because of
    /// gamification: errors are logged and yield an empty list.
    pub async fn award_xp_best_effort(
        &self,
        user_id: Uuid,
        amount: i64,
        activity_type: &str,
        description: &str,
    ) -> Vec<Achievement> {
        match self
            .award_xp(user_id, amount, activity_type, description)
            .await
        {
            Ok(unlocked) => unlocked,
            Err(err) => {
                warn!("XP award for user {} failed: {}", user_id, err);
                Vec::new()
            }
        }
    }

    /// Unlocks every catalog entry whose requirements the user now meets.
    ///
    /// Stats and XP are read once before the scan. A store failure aborts the
    /// remaining scan; unlocks made earlier in the same call stay committed.
    #[instrument(skip(self))]
    pub async fn check_and_unlock_achievements(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Achievement>, AppError> {
        let Some(progress) = self.store.load_progress(user_id).await? else {
            debug!("No progress for user {}, nothing to evaluate", user_id);
            return Ok(Vec::new());
        };
        let stats = self.store.activity_stats(user_id).await?;
        let catalog = self.store.load_catalog().await?;
        debug!(
            "Evaluating {} catalog entries for user {} with {:?}",
            catalog.len(),
            user_id,
            stats
        );

        let mut unlocked = Vec::new();
        for achievement in catalog {
            if progress.has_achievement(&achievement.name) {
                continue;
            }
            let Some(key) = self.mode.evaluate(&achievement.requirements, |key| {
                measure(key, &stats, &progress)
            }) else {
                continue;
            };

            if self.store.unlock_achievement(user_id, &achievement).await? {
                info!(
                    "User {} unlocked '{}' via {} (+{} XP)",
                    user_id, achievement.name, key, achievement.xp_reward
                );
                unlocked.push(achievement);
            } else {
                debug!(
                    "'{}' was unlocked concurrently for user {}",
                    achievement.name, user_id
                );
            }
        }

        Ok(unlocked)
    }

    /// Counts `day` toward the user's streak and evaluates streak achievements.
    /// Days after the current UTC day are rejected.
    #[instrument(skip(self))]
    pub async fn record_streak_day(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<StreakUpdate, AppError> {
        let today = Utc::now().date_naive();
        if day > today {
            warn!("Rejecting future streak day {} for user {}", day, user_id);
            return Err(AppError::BadRequest(format!(
                "Streak day {} is after the current day {}",
                day, today
            )));
        }

        let progress = self.store.record_streak_day(user_id, day).await?;
        info!(
            "User {} streak at {} days (longest {})",
            user_id, progress.current_streak, progress.longest_streak
        );

        let unlocked = self.check_and_unlock_achievements(user_id).await?;
        let progress = if unlocked.is_empty() {
            progress
        } else {
            self.store.load_progress(user_id).await?.unwrap_or(progress)
        };
        Ok(StreakUpdate { progress, unlocked })
    }

    pub async fn progress(&self, user_id: Uuid) -> Result<Option<UserProgress>, AppError> {
        self.store.load_progress(user_id).await
    }

    pub async fn stats(&self, user_id: Uuid) -> Result<ActivityStats, AppError> {
        self.store.activity_stats(user_id).await
    }

    pub async fn activities(
        &self,
        user_id: Uuid,
        query: ActivityQuery,
    ) -> Result<Vec<XpActivity>, AppError> {
        self.store.list_activities(user_id, query).await
    }

    pub async fn catalog(&self) -> Result<Vec<Achievement>, AppError> {
        self.store.load_catalog().await
    }

    #[instrument(skip(self, achievement), fields(name = %achievement.name))]
    pub async fn save_achievement(&self, achievement: &Achievement) -> Result<(), AppError> {
        if achievement.name.trim().is_empty() {
            return Err(AppError::UnprocessableEntity(
                "Achievement name must not be empty".to_string(),
            ));
        }
        if achievement.xp_reward <= 0 {
            return Err(AppError::UnprocessableEntity(format!(
                "Achievement '{}' must have a positive XP reward",
                achievement.name
            )));
        }
        if let Some((field, limit)) = achievement.oversized_field() {
            return Err(AppError::UnprocessableEntity(format!(
                "Achievement {} must be at most {} characters",
                field, limit
            )));
        }

        self.store.save_achievement(achievement).await?;
        info!("Saved catalog entry '{}'", achievement.name);
        Ok(())
    }
}
