/// Auth service: registration, login, logout and password reset
///
/// The service is stateless apart from its stores. Callers pass the session
/// token in and get session state back; nothing is held per process.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use chrono::Duration;
/// use traintrack_shared::auth::service::{AuthService, Registration};
/// use traintrack_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let auth = AuthService::new(store.clone(), store, Duration::hours(8));
///
/// auth.register(Registration {
///     username: "ana".into(),
///     email: "ana@example.com".into(),
///     password: "s3cret".into(),
///     confirm_password: "s3cret".into(),
///     role: Some("manager".into()),
/// }).await?;
///
/// let login = auth.login("ana", "s3cret").await?;
/// assert!(login.session.is_manager());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::password::{self, PasswordError};
use super::token;
use crate::models::session::Session;
use crate::models::user::{CreateUser, Role, User};
use crate::store::{CredentialStore, SessionStore, StoreError};

/// Message for duplicate username or email
pub const DUPLICATE_USER_MESSAGE: &str = "Username or email already in use";

/// Message for mismatched password confirmation
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords do not match";

/// Message for a missing or unknown role
pub const INVALID_ROLE_MESSAGE: &str = "Select a role (manager or technician)";

/// Error type for auth operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Input rejected; nothing was written
    #[error("{0}")]
    Validation(String),

    /// Unknown username or wrong password; deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Registration form
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Raw role value; must be "manager" or "technician"
    pub role: Option<String>,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Session state for the caller
    pub session: Session,

    /// Plaintext session token; only its hash is stored
    pub token: String,

    pub expires_at: DateTime<Utc>,
}

/// Result of a password reset request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// A new temporary password was stored and existing sessions revoked
    Reset {
        /// Handed to the delivery channel; never returned to HTTP callers
        temporary_password: String,
    },

    /// No user has that email
    NotFound,
}

/// Verifies credentials and manages sessions
#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl AuthService {
    /// Creates a service over the given stores
    ///
    /// `session_ttl` is how long a login stays valid.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            sessions,
            session_ttl,
        }
    }

    /// Session lifetime
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Registers a new user
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` if the passwords differ, the username or
    ///   email is taken (including a concurrent insert winning the race), or
    ///   the role is missing or unknown
    /// - `AuthError::Store` on store failure
    pub async fn register(&self, form: Registration) -> Result<User, AuthError> {
        if form.password != form.confirm_password {
            return Err(AuthError::Validation(PASSWORD_MISMATCH_MESSAGE.to_string()));
        }

        if self
            .credentials
            .find_by_username_or_email(&form.username, &form.email)
            .await?
            .is_some()
        {
            debug!(username = %form.username, "Registration rejected: user exists");
            return Err(AuthError::Validation(DUPLICATE_USER_MESSAGE.to_string()));
        }

        let role: Role = form
            .role
            .as_deref()
            .ok_or_else(|| AuthError::Validation(INVALID_ROLE_MESSAGE.to_string()))?
            .parse()
            .map_err(|_| AuthError::Validation(INVALID_ROLE_MESSAGE.to_string()))?;

        let password_hash = password::hash_password(&form.password)?;

        let user = self
            .credentials
            .insert(CreateUser {
                username: form.username,
                email: form.email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(constraint) => {
                    debug!(%constraint, "Registration lost insert race");
                    AuthError::Validation(DUPLICATE_USER_MESSAGE.to_string())
                }
                other => AuthError::Store(other),
            })?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    /// Verifies credentials and opens a new session
    ///
    /// # Errors
    ///
    /// `AuthError::InvalidCredentials` for an unknown user or wrong password.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = match self.credentials.find_by_username(username).await? {
            Some(user) => user,
            None => {
                password::verify_against_dummy(password);
                debug!("Login failed");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !password::verify_password(password, &user.password_hash)? {
            debug!("Login failed");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session::for_user(&user);
        let (token, token_hash) = token::generate_session_token();
        let expires_at = Utc::now() + self.session_ttl;

        self.sessions
            .set_session(&token_hash, &session, expires_at)
            .await?;

        info!(username = %session.username, role = %session.role, "User logged in");
        Ok(LoginOutcome {
            session,
            token,
            expires_at,
        })
    }

    /// Resolves a session token into session state
    ///
    /// Malformed, unknown and expired tokens all resolve to `None`.
    pub async fn current_session(&self, token: &str) -> Result<Option<Session>, AuthError> {
        if !token::validate_session_token_format(token) {
            return Ok(None);
        }

        let token_hash = token::hash_session_token(token);
        Ok(self.sessions.current_session(&token_hash).await?)
    }

    /// Destroys the session for a token, if any
    pub async fn logout(&self, token: Option<&str>) -> Result<(), AuthError> {
        let Some(token) = token else {
            return Ok(());
        };

        let token_hash = token::hash_session_token(token);
        self.sessions.clear_session(&token_hash).await?;
        debug!("Session cleared");

        Ok(())
    }

    /// Replaces the password of the user with the given email
    ///
    /// A random temporary password is generated, hashed and stored, and all
    /// of the user's sessions are revoked. No email is sent.
    pub async fn reset_password(&self, email: &str) -> Result<ResetOutcome, AuthError> {
        let Some(user) = self.credentials.find_by_email(email).await? else {
            debug!("Password reset for unknown email");
            return Ok(ResetOutcome::NotFound);
        };

        let temporary_password = token::generate_temporary_password();
        let password_hash = password::hash_password(&temporary_password)?;

        if !self.credentials.update_password(email, &password_hash).await? {
            warn!(user_id = %user.id, "User disappeared during password reset");
            return Ok(ResetOutcome::NotFound);
        }

        let revoked = self.sessions.clear_user_sessions(&user.username).await?;
        info!(user_id = %user.id, revoked_sessions = revoked, "Password reset performed");

        Ok(ResetOutcome::Reset { temporary_password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn service() -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(store.clone(), store.clone(), Duration::hours(1));
        (auth, store)
    }

    fn registration(username: &str, email: &str, role: Option<&str>) -> Registration {
        Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: "s3cret".to_string(),
            confirm_password: "s3cret".to_string(),
            role: role.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_password_mismatch() {
        let (auth, store) = service();
        let mut form = registration("ana", "ana@example.com", Some("manager"));
        form.confirm_password = "other".to_string();

        let err = auth.register(form).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref m) if m == PASSWORD_MISMATCH_MESSAGE));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_and_unknown_role() {
        let (auth, store) = service();

        for role in [None, Some("admin"), Some("gerente")] {
            let err = auth
                .register(registration("ana", "ana@example.com", role))
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::Validation(ref m) if m == INVALID_ROLE_MESSAGE));
        }
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (auth, _) = service();
        auth.register(registration("ana", "ana@example.com", Some("manager")))
            .await
            .unwrap();

        let err = auth
            .register(registration("bia", "ana@example.com", Some("technician")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref m) if m == DUPLICATE_USER_MESSAGE));
    }

    #[tokio::test]
    async fn test_username_match_is_case_sensitive() {
        let (auth, store) = service();
        auth.register(registration("ana", "ana@example.com", Some("manager")))
            .await
            .unwrap();
        auth.register(registration("Ana", "ana2@example.com", Some("technician")))
            .await
            .unwrap();

        assert_eq!(store.user_count().await, 2);
    }

    #[tokio::test]
    async fn test_login_unknown_user_and_wrong_password_look_the_same() {
        let (auth, _) = service();
        auth.register(registration("ana", "ana@example.com", Some("manager")))
            .await
            .unwrap();

        let unknown = auth.login("nobody", "s3cret").await.unwrap_err();
        let wrong = auth.login("ana", "s3cre").await.unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_login_with_no_users_is_invalid_credentials() {
        let (auth, store) = service();

        for attempt in ["nobody", "", "ana"] {
            let err = auth.login(attempt, "s3cret").await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_login_logout_roundtrip() {
        let (auth, _) = service();
        auth.register(registration("ana", "ana@example.com", Some("technician")))
            .await
            .unwrap();

        let login = auth.login("ana", "s3cret").await.unwrap();
        assert_eq!(login.session.role, Role::Technician);
        assert!(login.expires_at > Utc::now());

        let current = auth.current_session(&login.token).await.unwrap();
        assert_eq!(current, Some(login.session.clone()));

        auth.logout(Some(&login.token)).await.unwrap();
        assert_eq!(auth.current_session(&login.token).await.unwrap(), None);

        // Idempotent
        auth.logout(Some(&login.token)).await.unwrap();
        auth.logout(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_token_has_no_session() {
        let (auth, _) = service();
        assert_eq!(auth.current_session("garbage").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session() {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(store.clone(), store.clone(), Duration::seconds(-1));
        auth.register(registration("ana", "ana@example.com", Some("manager")))
            .await
            .unwrap();

        let login = auth.login("ana", "s3cret").await.unwrap();
        assert_eq!(auth.current_session(&login.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reset_password_unknown_email() {
        let (auth, _) = service();
        let outcome = auth.reset_password("nobody@example.com").await.unwrap();
        assert_eq!(outcome, ResetOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_reset_password_replaces_credential_and_revokes_sessions() {
        let (auth, _) = service();
        auth.register(registration("ana", "ana@example.com", Some("manager")))
            .await
            .unwrap();
        let login = auth.login("ana", "s3cret").await.unwrap();

        let ResetOutcome::Reset { temporary_password } =
            auth.reset_password("ana@example.com").await.unwrap()
        else {
            panic!("expected a reset");
        };

        assert!(matches!(
            auth.login("ana", "s3cret").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(auth.login("ana", &temporary_password).await.is_ok());
        assert_eq!(auth.current_session(&login.token).await.unwrap(), None);
    }
}
