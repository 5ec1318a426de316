/// Session resolution middleware
///
/// Reads the session token from the `traintrack_session` cookie, falling back
/// to an `Authorization: Bearer` header, resolves it through the auth service
/// and stores the result as a [`CurrentSession`] request extension. Requests
/// without a valid token get an anonymous `CurrentSession`; gating happens in
/// the handlers.

use crate::{app::AppState, error::ApiError};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use traintrack_shared::{
    auth::authorization::{self, AuthzError},
    models::session::Session,
};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "traintrack_session";

/// Session state for the current request
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    /// Resolved session; `None` for anonymous callers
    pub session: Option<Session>,

    /// Raw token as presented, even if it did not resolve
    pub token: Option<String>,
}

impl CurrentSession {
    pub fn require_login(&self) -> Result<&Session, AuthzError> {
        authorization::require_login(self.session.as_ref())
    }

    pub fn require_manager(&self) -> Result<&Session, AuthzError> {
        authorization::require_manager(self.session.as_ref())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Extracts the session token from the cookie or the bearer header
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// `Set-Cookie` value that stores a session token
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Resolves the caller's session and inserts a [`CurrentSession`]
pub async fn session_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers());

    let session = match token.as_deref() {
        Some(token) => state.auth.current_session(token).await?,
        None => None,
    };

    req.extensions_mut().insert(CurrentSession { session, token });

    Ok(next.run(req).await)
}
