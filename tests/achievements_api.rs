use axum::http::StatusCode;
use serde_json::{Value, json};
use studygram_progress::catalog::default_catalog;
use studygram_progress::model::{Achievement, AchievementCategory, Requirements};
use studygram_progress::payloads::achievements::SaveAchievementPayload;
use studygram_progress::payloads::progress::CheckAchievementsPayload;
use studygram_progress::response::ApiResponse;
use uuid::Uuid;

mod helpers;
use helpers::{award_xp, first_course_achievement, setup_test_environment};

fn save_payload(name: &str, requirements: Requirements, xp_reward: i32) -> SaveAchievementPayload {
    SaveAchievementPayload {
        name: name.to_string(),
        description: format!("Reach {}", name),
        icon: "trophy".to_string(),
        category: AchievementCategory::Social,
        requirements,
        xp_reward,
        badge_color: "gold".to_string(),
    }
}

// list_catalog

#[tokio::test]
async fn test_list_catalog_default() {
    let (server, _store) = setup_test_environment(default_catalog()).await;

    let response = server.get("/achievements/list_catalog").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let catalog = response.json::<ApiResponse<Vec<Achievement>>>().data.unwrap();
    assert_eq!(catalog, default_catalog());
    assert_eq!(catalog[0].name, "First Course");
}

#[tokio::test]
async fn test_list_catalog_empty() {
    let (server, _store) = setup_test_environment(Vec::new()).await;

    let response = server.get("/achievements/list_catalog").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.json::<ApiResponse<Vec<Achievement>>>().data.unwrap().is_empty());
}

// save_achievement

#[tokio::test]
async fn test_save_achievement_creates_entry() {
    let (server, store) = setup_test_environment(Vec::new()).await;
    let payload = save_payload(
        "  Study Buddy ",
        Requirements {
            groups_joined: Some(2),
            ..Requirements::default()
        },
        40,
    );

    let response = server
        .post("/achievements/save_achievement")
        .json(&payload)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<ApiResponse<bool>>().data, Some(true));

    let catalog = server
        .get("/achievements/list_catalog")
        .await
        .json::<ApiResponse<Vec<Achievement>>>()
        .data
        .unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "Study Buddy");
    assert_eq!(catalog[0].requirements.groups_joined, Some(2));

    // the new entry takes part in evaluation right away
    let user_id = Uuid::new_v4();
    store.add_group_membership(user_id, 7).await;
    store.add_group_membership(user_id, 8).await;
    award_xp(&server, user_id, 0, "group_join").await;

    let response = server
        .post("/progress/check_achievements")
        .json(&CheckAchievementsPayload { user_id })
        .await;
    assert!(response.json::<ApiResponse<Vec<Achievement>>>().data.unwrap().is_empty());

    let progress = server
        .get(&format!("/progress/get_progress/{}", user_id))
        .await
        .json::<ApiResponse<Value>>()
        .data
        .unwrap();
    assert_eq!(progress["xp"], 40);
    assert_eq!(progress["achievements"], json!(["Study Buddy"]));
}

#[tokio::test]
async fn test_save_achievement_replaces_existing() {
    let (server, _store) = setup_test_environment(vec![first_course_achievement()]).await;
    let payload = save_payload(
        "First Course",
        Requirements {
            courses_uploaded: Some(2),
            ..Requirements::default()
        },
        75,
    );

    let response = server
        .post("/achievements/save_achievement")
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let catalog = server
        .get("/achievements/list_catalog")
        .await
        .json::<ApiResponse<Vec<Achievement>>>()
        .data
        .unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].xp_reward, 75);
    assert_eq!(catalog[0].category, AchievementCategory::Social);
    assert_eq!(catalog[0].requirements.courses_uploaded, Some(2));
}

#[tokio::test]
async fn test_save_achievement_unprocessable_zero_reward() {
    let (server, _store) = setup_test_environment(Vec::new()).await;

    let response = server
        .post("/achievements/save_achievement")
        .json(&save_payload("Freebie", Requirements::default(), 0))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.status_code, 422);
    assert!(body.status_message.contains("positive XP reward"));
}

#[tokio::test]
async fn test_save_achievement_unprocessable_blank_name() {
    let (server, _store) = setup_test_environment(Vec::new()).await;

    let response = server
        .post("/achievements/save_achievement")
        .json(&save_payload("   ", Requirements::default(), 10))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let catalog = server
        .get("/achievements/list_catalog")
        .await
        .json::<ApiResponse<Vec<Achievement>>>()
        .data
        .unwrap();
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn test_save_achievement_unprocessable_oversized_fields() {
    let (server, _store) = setup_test_environment(Vec::new()).await;

    let mut long_name = save_payload("x", Requirements::default(), 10);
    long_name.name = "n".repeat(Achievement::MAX_NAME_CHARS + 1);
    let mut long_color = save_payload("Colorful", Requirements::default(), 10);
    long_color.badge_color = "b".repeat(Achievement::MAX_BADGE_COLOR_CHARS + 1);

    for payload in [long_name, long_color] {
        let response = server
            .post("/achievements/save_achievement")
            .json(&payload)
            .await;
        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ApiResponse<Value> = response.json();
        assert!(body.status_message.contains("characters"));
    }

    let catalog = server
        .get("/achievements/list_catalog")
        .await
        .json::<ApiResponse<Vec<Achievement>>>()
        .data
        .unwrap();
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn test_save_achievement_rejects_unknown_category() {
    let (server, _store) = setup_test_environment(Vec::new()).await;

    let response = server
        .post("/achievements/save_achievement")
        .json(&json!({
            "name": "Odd One",
            "category": "gaming",
            "xp_reward": 10
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}
