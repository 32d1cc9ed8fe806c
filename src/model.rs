pub mod achievement;
pub mod activity;
pub mod progress;
pub mod stats;

pub use achievement::{Achievement, AchievementCategory, RequirementKey, Requirements};
pub use activity::{NewXpActivity, XpActivity};
pub use progress::{ProgressRow, UserProgress, XP_PER_LEVEL, level_for_xp};
pub use stats::ActivityStats;
