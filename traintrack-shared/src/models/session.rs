/// Session model and database operations
///
/// A session is created by a successful login and destroyed by logout or
/// expiry. Only the SHA-256 hash of the session token is persisted; the
/// plaintext token lives in the client's cookie.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     token_hash CHAR(64) PRIMARY KEY,
///     username VARCHAR(100) NOT NULL REFERENCES users(username) ON DELETE CASCADE,
///     role user_role NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::user::{Role, User};

/// Per-request session state
///
/// A session with `logged_in = true` always carries the role copied from the
/// stored user at login time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Whether the caller is authenticated
    pub logged_in: bool,

    /// Authenticated username
    pub username: String,

    /// Role at login time
    pub role: Role,
}

impl Session {
    /// Builds a logged-in session for a verified user
    pub fn for_user(user: &User) -> Self {
        Self {
            logged_in: true,
            username: user.username.clone(),
            role: user.role,
        }
    }

    /// Whether this session grants manager privileges
    pub fn is_manager(&self) -> bool {
        self.logged_in && self.role.can_manage_records()
    }
}

/// Persisted session row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRecord {
    /// SHA-256 hex of the session token
    pub token_hash: String,

    /// Owner of the session
    pub username: String,

    /// Role at login time
    pub role: Role,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session stops being valid
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Whether the session is still valid at `now`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Converts the stored row into request session state
    pub fn into_session(self) -> Session {
        Session {
            logged_in: true,
            username: self.username,
            role: self.role,
        }
    }

    /// Inserts a new session
    ///
    /// Expired sessions are purged in the same call.
    pub async fn create(
        pool: &PgPool,
        token_hash: &str,
        session: &Session,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        Self::purge_expired(pool).await?;

        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, username, role, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(token_hash)
        .bind(&session.username)
        .bind(session.role)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Finds an unexpired session by token hash
    pub async fn find_active(pool: &PgPool, token_hash: &str) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT token_hash, username, role, created_at, expires_at
            FROM sessions
            WHERE token_hash = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Deletes a session by token hash
    ///
    /// Returns true if a session was deleted.
    pub async fn delete(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every session owned by a user
    pub async fn delete_for_user(pool: &PgPool, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes all expired sessions
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
