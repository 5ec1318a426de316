/// Training endpoints
///
/// - `GET /v1/trainings` - List trainings (login)
/// - `POST /v1/trainings` - Create a training (manager)
/// - `PUT /v1/trainings/:id` - Replace a training (manager)
/// - `DELETE /v1/trainings/:id` - Delete a training and its status rows (manager)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::CurrentSession,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use traintrack_shared::{
    models::training::{Training, TrainingInput},
    store::RecordStore,
};
use validator::Validate;

pub async fn list_trainings(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ApiResult<Json<Vec<Training>>> {
    current.require_login()?;
    Ok(Json(state.store.list_trainings().await?))
}

pub async fn create_training(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(req): Json<TrainingInput>,
) -> ApiResult<(StatusCode, Json<Training>)> {
    let session = current.require_manager()?;
    req.validate()?;

    let training = state.store.create_training(req).await?;
    tracing::info!(training_id = training.id, by = %session.username, "Training created");

    Ok((StatusCode::CREATED, Json(training)))
}

pub async fn update_training(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<i64>,
    Json(req): Json<TrainingInput>,
) -> ApiResult<Json<Training>> {
    let session = current.require_manager()?;
    req.validate()?;

    let training = state
        .store
        .update_training(id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Training not found".to_string()))?;
    tracing::info!(training_id = id, by = %session.username, "Training updated");

    Ok(Json(training))
}

pub async fn delete_training(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let session = current.require_manager()?;

    if !state.store.delete_training(id).await? {
        return Err(ApiError::NotFound("Training not found".to_string()));
    }
    tracing::info!(training_id = id, by = %session.username, "Training deleted");

    Ok(StatusCode::NO_CONTENT)
}
