/// Dashboard and compliance report endpoints
///
/// All endpoints require a logged-in session.
///
/// - `GET /v1/dashboard`
/// - `GET /v1/compliance/overview`
/// - `GET /v1/compliance/monthly`
/// - `GET /v1/compliance/collaborators`
/// - `POST /v1/compliance/lookup`

use crate::{app::AppState, error::ApiResult, middleware::session::CurrentSession};
use axum::{extract::State, Json};
use serde::Deserialize;
use std::collections::BTreeMap;
use traintrack_shared::compliance::{Dashboard, MonthlyBucket, OverviewStats, StatusLookupRow};
use validator::Validate;

/// Collaborator lookup request; matches a name fragment or a registration
#[derive(Debug, Deserialize, Validate)]
pub struct LookupRequest {
    #[validate(length(max = 255, message = "Query must be at most 255 characters"))]
    pub query: String,
}

pub async fn dashboard(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ApiResult<Json<Dashboard>> {
    let session = current.require_login()?;
    Ok(Json(state.compliance.dashboard(session).await?))
}

pub async fn overview(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ApiResult<Json<OverviewStats>> {
    current.require_login()?;
    Ok(Json(state.compliance.get_overview_stats().await?))
}

pub async fn monthly(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ApiResult<Json<Vec<MonthlyBucket>>> {
    current.require_login()?;
    Ok(Json(state.compliance.get_monthly_breakdown().await?))
}

/// Collaborator name to compliance percentage
pub async fn collaborators(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ApiResult<Json<BTreeMap<String, f64>>> {
    current.require_login()?;
    Ok(Json(state.compliance.get_compliance_by_collaborator().await?))
}

pub async fn lookup(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(req): Json<LookupRequest>,
) -> ApiResult<Json<Vec<StatusLookupRow>>> {
    current.require_login()?;
    req.validate()?;

    Ok(Json(
        state
            .compliance
            .lookup_collaborator_status(&req.query)
            .await?,
    ))
}
