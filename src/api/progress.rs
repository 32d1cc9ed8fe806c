use crate::engine::{ProgressEngine, StreakUpdate};
use crate::errors::AppError;
use crate::model::{Achievement, ActivityStats, UserProgress, XpActivity};
use crate::payloads::progress::{
    AwardXpPayload, CheckAchievementsPayload, GetActivitiesParams, RecordStreakDayPayload,
};
use crate::response::ApiResponse;
use crate::store::ActivityQuery;
use axum::extract::{Path, Query};
use axum::{extract::State, response::Json};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Awards XP to a user, then unlocks any achievements that became due.
///
/// Returns (wrapped in `ApiResponse`)
/// * `Vec<Achievement>`: Achievements unlocked by this award (200 OK).
/// * `400 Bad Request`: If the amount is negative or the activity type is blank.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(engine, payload))]
pub async fn award_xp(
    State(engine): State<ProgressEngine>,
    Json(payload): Json<AwardXpPayload>,
) -> Result<ApiResponse<Vec<Achievement>>, AppError> {
    info!(
        "Attempting to award {} XP to user_id: {}",
        payload.amount, payload.user_id
    );
    debug!("Award XP payload: {:?}", payload);

    if payload.activity_type.trim().is_empty() {
        warn!("Rejected XP award without activity type for user_id: {}", payload.user_id);
        return Err(AppError::BadRequest(
            "activity_type must not be empty".to_string(),
        ));
    }

    let unlocked = engine
        .award_xp(
            payload.user_id,
            payload.amount,
            payload.activity_type.trim(),
            &payload.description,
        )
        .await?;

    info!(
        "Awarded XP to user_id: {}, {} achievement(s) unlocked",
        payload.user_id,
        unlocked.len()
    );
    Ok(ApiResponse::ok(unlocked))
}

/// Re-evaluates the achievement catalog for a user.
///
/// Returns (wrapped in `ApiResponse`)
/// * `Vec<Achievement>`: Newly unlocked achievements, empty if none or if the user has no progress (200 OK).
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(engine, payload))]
pub async fn check_achievements(
    State(engine): State<ProgressEngine>,
    Json(payload): Json<CheckAchievementsPayload>,
) -> Result<ApiResponse<Vec<Achievement>>, AppError> {
    info!("Checking achievements for user_id: {}", payload.user_id);

    let unlocked = engine.check_and_unlock_achievements(payload.user_id).await?;

    info!(
        "Achievement check for user_id: {} unlocked {}",
        payload.user_id,
        unlocked.len()
    );
    Ok(ApiResponse::ok(unlocked))
}

/// Counts a study day toward the user's streak.
///
/// Returns (wrapped in `ApiResponse`)
/// * `StreakUpdate`: Progress after the update plus any streak achievements unlocked (200 OK).
/// * `400 Bad Request`: If `day` is after the current UTC day.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(engine, payload))]
pub async fn record_streak_day(
    State(engine): State<ProgressEngine>,
    Json(payload): Json<RecordStreakDayPayload>,
) -> Result<ApiResponse<StreakUpdate>, AppError> {
    let day = payload.day.unwrap_or_else(|| Utc::now().date_naive());
    info!(
        "Recording streak day {} for user_id: {}",
        day, payload.user_id
    );

    let update = engine.record_streak_day(payload.user_id, day).await?;
    Ok(ApiResponse::ok(update))
}

/// Returns (wrapped in `ApiResponse`)
/// * `UserProgress`: XP, level, streaks and unlocked achievement names (200 OK).
/// * `404 Not Found`: If the user has never earned XP.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(engine))]
pub async fn get_progress(
    State(engine): State<ProgressEngine>,
    Path(user_id): Path<Uuid>,
) -> Result<ApiResponse<UserProgress>, AppError> {
    info!("Fetching progress for user_id: {}", user_id);

    match engine.progress(user_id).await? {
        Some(progress) => Ok(ApiResponse::ok(progress)),
        None => {
            warn!("No progress found for user_id: {}", user_id);
            Err(AppError::NotFound(format!(
                "Progress for user {} not found",
                user_id
            )))
        }
    }
}

/// Returns (wrapped in `ApiResponse`)
/// * `ActivityStats`: Aggregates the evaluator compares thresholds against (200 OK).
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(engine))]
pub async fn get_stats(
    State(engine): State<ProgressEngine>,
    Path(user_id): Path<Uuid>,
) -> Result<ApiResponse<ActivityStats>, AppError> {
    info!("Fetching activity stats for user_id: {}", user_id);
    let stats = engine.stats(user_id).await?;
    Ok(ApiResponse::ok(stats))
}

/// Lists a user's XP log, newest first.
///
/// Parameters
/// * user_id as `Uuid`
/// * since, until as optional RFC 3339 timestamps (inclusive)
/// * limit as optional `i64`, clamped to 1..=500 (default 50)
///
/// Returns (wrapped in `ApiResponse`)
/// * `Vec<XpActivity>` (200 OK).
/// * `400 Bad Request`: If `since` is after `until`.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(engine, params))]
pub async fn get_activities(
    State(engine): State<ProgressEngine>,
    Query(params): Query<GetActivitiesParams>,
) -> Result<ApiResponse<Vec<XpActivity>>, AppError> {
    info!("Fetching XP activities for user_id: {}", params.user_id);
    debug!("Get activities params: {:?}", params);

    if let (Some(since), Some(until)) = (params.since, params.until) {
        if since > until {
            return Err(AppError::BadRequest(format!(
                "since ({}) must not be after until ({})",
                since, until
            )));
        }
    }

    let query = ActivityQuery::new(params.since, params.until, params.limit);
    let activities = engine.activities(params.user_id, query).await?;

    info!(
        "Fetched {} XP activities for user_id: {}",
        activities.len(),
        params.user_id
    );
    Ok(ApiResponse::ok(activities))
}
