/// Role checks over the current session
///
/// Two gates cover every operation:
///
/// 1. **Login**: viewing trainings, technicians and dashboards
/// 2. **Manager**: creating, updating and deleting records
///
/// Both take the caller's session explicitly; there is no ambient session.
/// A failed check is always reported the same way to the client (403,
/// "Access denied") so the variant is for logs only.
///
/// # Example
///
/// ```
/// use traintrack_shared::auth::authorization::{is_manager, require_login, require_manager};
/// use traintrack_shared::models::session::Session;
/// use traintrack_shared::models::user::Role;
///
/// let session = Session { logged_in: true, username: "ana".into(), role: Role::Technician };
///
/// assert!(require_login(Some(&session)).is_ok());
/// assert!(require_manager(Some(&session)).is_err());
/// assert!(!is_manager(None));
/// ```

use crate::models::session::Session;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No logged-in session
    #[error("Login required")]
    NotLoggedIn,

    /// Logged in without the manager role
    #[error("Manager role required")]
    NotManager,
}

/// True when a session exists and is logged in
pub fn is_logged_in(session: Option<&Session>) -> bool {
    session.is_some_and(|s| s.logged_in)
}

/// True when the session is logged in with the manager role
pub fn is_manager(session: Option<&Session>) -> bool {
    session.is_some_and(Session::is_manager)
}

/// Returns the session if it is logged in
pub fn require_login(session: Option<&Session>) -> Result<&Session, AuthzError> {
    match session {
        Some(s) if s.logged_in => Ok(s),
        _ => Err(AuthzError::NotLoggedIn),
    }
}

/// Returns the session if it is logged in as a manager
pub fn require_manager(session: Option<&Session>) -> Result<&Session, AuthzError> {
    let session = require_login(session)?;
    if !session.is_manager() {
        return Err(AuthzError::NotManager);
    }

    Ok(session)
}
