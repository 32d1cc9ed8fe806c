use axum::Router;
pub(crate) use axum_test::TestServer;
use std::sync::Arc;
use studygram_progress::engine::{ProgressEngine, RequirementMode};
use studygram_progress::init_test_router;
use studygram_progress::model::{Achievement, AchievementCategory, Requirements};
use studygram_progress::payloads::progress::AwardXpPayload;
pub(crate) use studygram_progress::store::MemoryStore;
use uuid::Uuid;

pub mod postgres;

// test infra setup

pub async fn setup_test_environment(catalog: Vec<Achievement>) -> (TestServer, Arc<MemoryStore>) {
    setup_test_environment_with_mode(catalog, RequirementMode::FirstMatch).await
}

pub async fn setup_test_environment_with_mode(
    catalog: Vec<Achievement>,
    mode: RequirementMode,
) -> (TestServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_catalog(catalog));
    let engine = ProgressEngine::new(store.clone(), mode);
    let app: Router = init_test_router(engine);
    let server = TestServer::new(app).expect("Failed to create TestServer");
    (server, store)
}

// catalog helpers

pub fn test_achievement(name: &str, requirements: Requirements, xp_reward: i32) -> Achievement {
    Achievement {
        name: name.to_string(),
        description: format!("Test achievement {}", name),
        icon: "star".to_string(),
        category: AchievementCategory::Study,
        requirements,
        xp_reward,
        badge_color: "blue".to_string(),
    }
}

pub fn first_course_achievement() -> Achievement {
    test_achievement(
        "First Course",
        Requirements {
            courses_uploaded: Some(1),
            ..Requirements::default()
        },
        50,
    )
}

// endpoint helpers

pub fn award_payload(user_id: Uuid, amount: i64, activity_type: &str) -> AwardXpPayload {
    AwardXpPayload {
        user_id,
        amount,
        activity_type: activity_type.to_string(),
        description: format!("Test {}", activity_type),
    }
}

pub async fn award_xp(server: &TestServer, user_id: Uuid, amount: i64, activity_type: &str) {
    let response = server
        .post("/progress/award_xp")
        .json(&award_payload(user_id, amount, activity_type))
        .await;
    response.assert_status_ok();
}
