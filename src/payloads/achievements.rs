use crate::model::{Achievement, AchievementCategory, Requirements};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct SaveAchievementPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub category: AchievementCategory,
    #[serde(default)]
    pub requirements: Requirements,
    pub xp_reward: i32,
    #[serde(default)]
    pub badge_color: String,
}

impl From<SaveAchievementPayload> for Achievement {
    fn from(payload: SaveAchievementPayload) -> Self {
        Achievement {
            name: payload.name.trim().to_string(),
            description: payload.description,
            icon: payload.icon,
            category: payload.category,
            requirements: payload.requirements,
            xp_reward: payload.xp_reward,
            badge_color: payload.badge_color,
        }
    }
}
