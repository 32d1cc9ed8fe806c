use super::{ActivityQuery, GamificationStore};
use crate::errors::AppError;
use crate::model::activity::{FILE_VIEW, SESSION_COMPLETE};
use crate::model::{
    Achievement, ActivityStats, NewXpActivity, ProgressRow, UserProgress, XpActivity,
};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-process backend. One mutex guards all state, so each trait call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    progress: HashMap<Uuid, ProgressRow>,
    unlocked: HashMap<Uuid, Vec<String>>,
    activities: Vec<XpActivity>,
    catalog: Vec<Achievement>,
    courses: Vec<Uuid>,
    sessions: Vec<StudySession>,
    attempts: Vec<Uuid>,
    memberships: HashSet<(i64, Uuid)>,
}

struct StudySession {
    user_id: Uuid,
    minutes: i64,
    ended: bool,
}

impl MemoryState {
    fn progress_mut(&mut self, user_id: Uuid) -> &mut ProgressRow {
        self.progress
            .entry(user_id)
            .or_insert_with(|| ProgressRow::new(user_id))
    }

    fn grant(&mut self, activity: NewXpActivity) -> ProgressRow {
        let now = Utc::now();
        let progress = self.progress_mut(activity.user_id);
        progress.gain_xp(activity.xp_earned, now);
        let snapshot = progress.clone();

        let id = self.activities.len() as i64 + 1;
        self.activities.push(XpActivity {
            id,
            user_id: activity.user_id,
            activity_type: activity.activity_type,
            xp_earned: activity.xp_earned,
            description: activity.description,
            created_at: now,
        });
        snapshot
    }

    fn snapshot(&self, user_id: Uuid) -> Option<UserProgress> {
        let row = self.progress.get(&user_id)?.clone();
        let names = self.unlocked.get(&user_id).cloned().unwrap_or_default();
        Some(row.with_achievements(names))
    }

    fn count_activities(&self, user_id: Uuid, kind: &str) -> i64 {
        self.activities
            .iter()
            .filter(|activity| activity.user_id == user_id && activity.activity_type == kind)
            .count() as i64
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Vec<Achievement>) -> Self {
        MemoryStore {
            state: Mutex::new(MemoryState {
                catalog,
                ..MemoryState::default()
            }),
        }
    }

    pub async fn add_course(&self, user_id: Uuid) {
        self.state.lock().await.courses.push(user_id);
    }

    pub async fn add_study_session(&self, user_id: Uuid, minutes: i64, ended: bool) {
        self.state.lock().await.sessions.push(StudySession {
            user_id,
            minutes,
            ended,
        });
    }

    pub async fn add_assessment_attempt(&self, user_id: Uuid) {
        self.state.lock().await.attempts.push(user_id);
    }

    pub async fn add_group_membership(&self, user_id: Uuid, group_id: i64) {
        self.state.lock().await.memberships.insert((group_id, user_id));
    }
}

#[async_trait]
impl GamificationStore for MemoryStore {
    async fn load_progress(&self, user_id: Uuid) -> Result<Option<UserProgress>, AppError> {
        Ok(self.state.lock().await.snapshot(user_id))
    }

    async fn grant_xp(&self, activity: NewXpActivity) -> Result<ProgressRow, AppError> {
        Ok(self.state.lock().await.grant(activity))
    }

    async fn unlock_achievement(
        &self,
        user_id: Uuid,
        achievement: &Achievement,
    ) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        let unlocked = state.unlocked.entry(user_id).or_default();
        if unlocked.contains(&achievement.name) {
            return Ok(false);
        }
        unlocked.push(achievement.name.clone());

        state.grant(NewXpActivity::unlock(
            user_id,
            &achievement.name,
            i64::from(achievement.xp_reward),
        ));
        Ok(true)
    }

    async fn record_streak_day(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<UserProgress, AppError> {
        let mut state = self.state.lock().await;
        state.progress_mut(user_id).register_streak_day(day);
        state
            .snapshot(user_id)
            .ok_or_else(|| AppError::InternalServerError(anyhow!("progress vanished")))
    }

    async fn activity_stats(&self, user_id: Uuid) -> Result<ActivityStats, AppError> {
        let state = self.state.lock().await;
        let sessions = state
            .sessions
            .iter()
            .filter(|session| session.user_id == user_id);

        Ok(ActivityStats {
            courses_uploaded: state.courses.iter().filter(|owner| **owner == user_id).count()
                as i64,
            study_minutes: sessions.clone().map(|session| session.minutes).sum(),
            completed_sessions: sessions.filter(|session| session.ended).count() as i64,
            assessment_attempts: state.attempts.iter().filter(|u| **u == user_id).count() as i64,
            files_viewed: state.count_activities(user_id, FILE_VIEW),
            sessions_completed: state.count_activities(user_id, SESSION_COMPLETE),
            groups_joined: state
                .memberships
                .iter()
                .filter(|(_, member)| *member == user_id)
                .count() as i64,
        })
    }

    async fn load_catalog(&self) -> Result<Vec<Achievement>, AppError> {
        Ok(self.state.lock().await.catalog.clone())
    }

    async fn save_achievement(&self, achievement: &Achievement) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let catalog = &mut state.catalog;
        match catalog
            .iter()
            .position(|entry| entry.name == achievement.name)
        {
            Some(index) => catalog[index] = achievement.clone(),
            None => catalog.push(achievement.clone()),
        }
        Ok(())
    }

    async fn list_activities(
        &self,
        user_id: Uuid,
        query: ActivityQuery,
    ) -> Result<Vec<XpActivity>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .activities
            .iter()
            .rev()
            .filter(|activity| activity.user_id == user_id && query.matches(activity.created_at))
            .take(query.limit as usize)
            .cloned()
            .collect())
    }
}
