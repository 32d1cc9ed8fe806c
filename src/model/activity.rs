use crate::schema::{user_achievements, xp_activities};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Activity tags the evaluator counts or writes itself.
pub const FILE_VIEW: &str = "file_view";
pub const SESSION_COMPLETE: &str = "session_complete";
pub const ACHIEVEMENT_UNLOCK: &str = "achievement_unlock";

/// Append-only XP log entry.
#[derive(Queryable, Selectable, Deserialize, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = xp_activities)]
pub struct XpActivity {
    pub id: i64,
    pub user_id: Uuid,
    pub activity_type: String,
    pub xp_earned: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = xp_activities)]
pub struct NewXpActivity {
    pub user_id: Uuid,
    pub activity_type: String,
    pub xp_earned: i64,
    pub description: String,
    // created_at has a DB default (CURRENT_TIMESTAMP)
}

impl NewXpActivity {
    pub fn unlock(user_id: Uuid, achievement_name: &str, xp_reward: i64) -> Self {
        NewXpActivity {
            user_id,
            activity_type: ACHIEVEMENT_UNLOCK.to_string(),
            xp_earned: xp_reward,
            description: format!("Unlocked achievement: {}", achievement_name),
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = user_achievements)]
pub struct NewUserAchievement<'a> {
    pub user_id: Uuid,
    pub achievement_name: &'a str,
    // unlocked_at has a DB default (CURRENT_TIMESTAMP)
}
