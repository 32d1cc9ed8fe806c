use crate::schema::user_progress;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// XP needed to advance one level.
pub const XP_PER_LEVEL: i64 = 100;

/// Level reached with `xp` points: `floor(xp / 100) + 1`.
pub fn level_for_xp(xp: i64) -> i32 {
    i32::try_from(xp.max(0) / XP_PER_LEVEL + 1).unwrap_or(i32::MAX)
}

/// Stored progress record of a single user.
///
/// Every XP mutation goes through [`ProgressRow::gain_xp`], which keeps
/// `level` derived from `xp`.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = user_progress, primary_key(user_id), treat_none_as_null = true)]
pub struct ProgressRow {
    pub user_id: Uuid,
    pub xp: i64,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub streak_date: Option<NaiveDate>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ProgressRow {
    /// Zero-valued progress, as used before the first award.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            xp: 0,
            level: level_for_xp(0),
            current_streak: 0,
            longest_streak: 0,
            streak_date: None,
            last_activity: None,
        }
    }

    /// Adds `amount` XP and recomputes the derived fields.
    ///
    /// `current_streak` is preserved; `longest_streak` is raised to it if needed.
    pub fn gain_xp(&mut self, amount: i64, at: DateTime<Utc>) {
        self.xp = self.xp.saturating_add(amount.max(0));
        self.level = level_for_xp(self.xp);
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_activity = Some(at);
    }

    /// Counts `day` toward the study streak. Returns `false` when `day` was
    /// already counted (or is older than the last counted day).
    pub fn register_streak_day(&mut self, day: NaiveDate) -> bool {
        match self.streak_date {
            Some(last) if last >= day => return false,
            Some(last) if last.succ_opt() == Some(day) => {
                self.current_streak = self.current_streak.saturating_add(1);
            }
            _ => self.current_streak = 1,
        }
        self.streak_date = Some(day);
        self.longest_streak = self.longest_streak.max(self.current_streak);
        true
    }

    pub fn with_achievements(self, achievements: Vec<String>) -> UserProgress {
        UserProgress {
            user_id: self.user_id,
            xp: self.xp,
            level: self.level,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            streak_date: self.streak_date,
            last_activity: self.last_activity,
            achievements,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct UserProgress {
    pub user_id: Uuid,
    pub xp: i64,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub streak_date: Option<NaiveDate>,
    pub last_activity: Option<DateTime<Utc>>,
    // names of unlocked achievements, in unlock order
    pub achievements: Vec<String>,
}

impl UserProgress {
    pub fn has_achievement(&self, name: &str) -> bool {
        self.achievements.iter().any(|unlocked| unlocked == name)
    }
}
