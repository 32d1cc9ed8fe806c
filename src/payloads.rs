pub mod achievements;
pub mod progress;
