use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize, Serialize, Debug)]
pub struct AwardXpPayload {
    pub user_id: Uuid,
    pub amount: i64,
    pub activity_type: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CheckAchievementsPayload {
    pub user_id: Uuid,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RecordStreakDayPayload {
    pub user_id: Uuid,
    // defaults to the current UTC day
    pub day: Option<NaiveDate>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GetActivitiesParams {
    pub user_id: Uuid,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}
