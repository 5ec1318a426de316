/// Technician endpoints
///
/// - `GET /v1/technicians` - List technicians (login)
/// - `POST /v1/technicians` - Create a technician (manager)
/// - `PUT /v1/technicians/:id` - Replace a technician (manager)
/// - `DELETE /v1/technicians/:id` - Delete a technician (manager)

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
    models::technician::{Technician, TechnicianInput},
    store::RecordStore,
};
use validator::Validate;

pub async fn list_technicians(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ApiResult<Json<Vec<Technician>>> {
    current.require_login()?;
    Ok(Json(state.store.list_technicians().await?))
}

pub async fn create_technician(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(req): Json<TechnicianInput>,
) -> ApiResult<(StatusCode, Json<Technician>)> {
    let session = current.require_manager()?;
    req.validate()?;

    let technician = state.store.create_technician(req).await?;
    tracing::info!(technician_id = technician.id, by = %session.username, "Technician created");

    Ok((StatusCode::CREATED, Json(technician)))
}

pub async fn update_technician(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<i64>,
    Json(req): Json<TechnicianInput>,
) -> ApiResult<Json<Technician>> {
    let session = current.require_manager()?;
    req.validate()?;

    let technician = state
        .store
        .update_technician(id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Technician not found".to_string()))?;
    tracing::info!(technician_id = id, by = %session.username, "Technician updated");

    Ok(Json(technician))
}

pub async fn delete_technician(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let session = current.require_manager()?;

    if !state.store.delete_technician(id).await? {
        return Err(ApiError::NotFound("Technician not found".to_string()));
    }
    tracing::info!(technician_id = id, by = %session.username, "Technician deleted");

    Ok(StatusCode::NO_CONTENT)
}
