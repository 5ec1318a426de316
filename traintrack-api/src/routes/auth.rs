/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Register a new user
/// - `POST /v1/auth/login` - Log in and receive the session cookie
/// - `POST /v1/auth/logout` - End the current session
/// - `POST /v1/auth/reset-password` - Issue a temporary password
/// - `GET /v1/auth/me` - Current session state

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::{clear_session_cookie, session_cookie, CurrentSession},
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use traintrack_shared::{
    auth::{
        authorization,
        service::{Registration, ResetOutcome},
    },
    models::{session::Session, user::User},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub confirm_password: String,

    /// "manager" or "technician"
    #[serde(default)]
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
///
/// The token is also set as the `traintrack_session` cookie; clients that
/// cannot hold cookies send it as a bearer token instead.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session: Session,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Reset password request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Generic message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Current session state
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub logged_in: bool,
    pub is_manager: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

/// Registers a new user
///
/// # Errors
///
/// - `422`: invalid body, password mismatch, duplicate username or email,
///   missing or unknown role
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let user = state
        .auth
        .register(Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
            role: req.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Verifies credentials and opens a session
///
/// # Errors
///
/// - `401`: unknown username or wrong password (same response for both)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.auth.login(&req.username, &req.password).await?;

    let cookie = session_cookie(
        &outcome.token,
        state.auth.session_ttl().num_seconds(),
        state.config.api.production,
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            session: outcome.session,
            token: outcome.token,
            expires_at: outcome.expires_at,
        }),
    ))
}

/// Ends the current session; succeeds without one
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ApiResult<impl IntoResponse> {
    state.auth.logout(current.token.as_deref()).await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie(state.config.api.production))],
    ))
}

/// Replaces the password of the account with the given email
///
/// The temporary password goes to the delivery channel only and is never
/// part of the response.
///
/// # Errors
///
/// - `404`: no account has that email
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    match state.auth.reset_password(&req.email).await? {
        ResetOutcome::Reset { .. } => Ok(Json(MessageResponse {
            message: "Password reset. A temporary password has been issued.".to_string(),
        })),
        ResetOutcome::NotFound => Err(ApiError::NotFound("Email not found".to_string())),
    }
}

/// Reports whether the caller is logged in and as whom
pub async fn me(current: CurrentSession) -> Json<MeResponse> {
    let session = current.session.as_ref();

    Json(MeResponse {
        logged_in: authorization::is_logged_in(session),
        is_manager: authorization::is_manager(session),
        session: current.session.clone(),
    })
}
