/// Storage traits and implementations
///
/// The auth service and compliance aggregator depend only on these traits,
/// never on a concrete database.
///
/// # Traits
///
/// - [`CredentialStore`]: user accounts and password hashes
/// - [`SessionStore`]: server-side login sessions
/// - [`TrainingRecords`]: aggregate queries over training status rows
/// - [`RecordStore`]: training and technician records
/// - [`Store`]: all of the above plus a connectivity check
///
/// # Implementations
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx
/// - [`memory::MemoryStore`]: in-process, for tests and local development
///
/// Username and email uniqueness is enforced by the store itself, so two
/// concurrent inserts of the same username resolve to one row and one
/// [`StoreError::UniqueViolation`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::compliance::{CollaboratorTally, OverviewStats, StatusLookupRow};
use crate::models::session::Session;
use crate::models::technician::{Technician, TechnicianInput};
use crate::models::training::{Training, TrainingInput};
use crate::models::training_status::MonthlyCounts;
use crate::models::user::{CreateUser, User};

pub mod memory;
pub mod postgres;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Connectivity or query failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }

        StoreError::Database(err)
    }
}

/// Persistence for user accounts
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Any user holding the username or the email
    async fn find_by_username_or_email(&self, username: &str, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Inserts a user; fails with [`StoreError::UniqueViolation`] on a
    /// duplicate username or email
    async fn insert(&self, user: CreateUser) -> StoreResult<User>;

    /// Replaces the password hash; returns false if the email is unknown
    async fn update_password(&self, email: &str, password_hash: &str) -> StoreResult<bool>;
}

/// Persistence for login sessions, keyed by token hash
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The unexpired session for a token hash, if any
    async fn current_session(&self, token_hash: &str) -> StoreResult<Option<Session>>;

    async fn set_session(
        &self,
        token_hash: &str,
        session: &Session,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Removes a session; a missing session is not an error
    async fn clear_session(&self, token_hash: &str) -> StoreResult<()>;

    /// Removes every session of a user, returning how many were removed
    async fn clear_user_sessions(&self, username: &str) -> StoreResult<u64>;
}

/// Read-only aggregate queries over training status rows
#[async_trait]
pub trait TrainingRecords: Send + Sync {
    async fn overview_counts(&self) -> StoreResult<OverviewStats>;

    async fn monthly_counts(&self) -> StoreResult<Vec<MonthlyCounts>>;

    async fn collaborator_tallies(&self) -> StoreResult<Vec<CollaboratorTally>>;

    async fn lookup_status(&self, query: &str) -> StoreResult<Vec<StatusLookupRow>>;
}

/// Training and technician records
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_trainings(&self) -> StoreResult<Vec<Training>>;

    async fn create_training(&self, data: TrainingInput) -> StoreResult<Training>;

    async fn update_training(&self, id: i64, data: TrainingInput) -> StoreResult<Option<Training>>;

    async fn delete_training(&self, id: i64) -> StoreResult<bool>;

    async fn list_technicians(&self) -> StoreResult<Vec<Technician>>;

    async fn create_technician(&self, data: TechnicianInput) -> StoreResult<Technician>;

    async fn update_technician(&self, id: i64, data: TechnicianInput) -> StoreResult<Option<Technician>>;

    async fn delete_technician(&self, id: i64) -> StoreResult<bool>;
}

/// A complete backing store
#[async_trait]
pub trait Store: CredentialStore + SessionStore + TrainingRecords + RecordStore {
    /// Verifies the store is reachable
    async fn ping(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::UniqueViolation("users_username_key".to_string());
        assert!(err.to_string().contains("users_username_key"));

        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }
}
