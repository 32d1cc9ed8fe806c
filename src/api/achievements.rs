use crate::engine::ProgressEngine;
use crate::errors::AppError;
use crate::model::Achievement;
use crate::payloads::achievements::SaveAchievementPayload;
use crate::response::ApiResponse;
use axum::{extract::State, response::Json};
use tracing::{debug, info, instrument};

/// Returns (wrapped in `ApiResponse`)
/// * `Vec<Achievement>`: The whole catalog, oldest entries first (200 OK).
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(engine))]
pub async fn list_catalog(
    State(engine): State<ProgressEngine>,
) -> Result<ApiResponse<Vec<Achievement>>, AppError> {
    info!("Fetching achievement catalog");
    let catalog = engine.catalog().await?;
    info!("Fetched {} catalog entries", catalog.len());
    Ok(ApiResponse::ok(catalog))
}

/// Creates a catalog entry or replaces the one with the same name.
///
/// Returns (wrapped in `ApiResponse`)
/// * `true` (200 OK).
/// * `422 Unprocessable Entity`: If the name is blank, a field is too long or the reward is not positive.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(engine, payload))]
pub async fn save_achievement(
    State(engine): State<ProgressEngine>,
    Json(payload): Json<SaveAchievementPayload>,
) -> Result<ApiResponse<bool>, AppError> {
    info!("Attempting to save achievement '{}'", payload.name);
    debug!("Save achievement payload: {:?}", payload);

    let achievement = Achievement::from(payload);
    engine.save_achievement(&achievement).await?;

    Ok(ApiResponse::ok(true))
}
