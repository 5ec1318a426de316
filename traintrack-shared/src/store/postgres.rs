/// PostgreSQL-backed store
///
/// Thin adapter from the store traits onto the model queries. Uniqueness is
/// enforced by the `users_username_key` and `users_email_key` constraints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{
    CredentialStore, RecordStore, SessionStore, Store, StoreResult, TrainingRecords,
};
use crate::compliance::{CollaboratorTally, OverviewStats, StatusLookupRow};
use crate::db::pool::health_check;
use crate::models::session::{Session, SessionRecord};
use crate::models::technician::{Technician, TechnicianInput};
use crate::models::training::{Training, TrainingInput};
use crate::models::training_status::{MonthlyCounts, TrainingStatus};
use crate::models::user::{CreateUser, User};

/// Store over a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_username_or_email(&self, username: &str, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username_or_email(&self.pool, username, email).await?)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn insert(&self, user: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, user).await?)
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> StoreResult<bool> {
        Ok(User::update_password_by_email(&self.pool, email, password_hash).await?)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn current_session(&self, token_hash: &str) -> StoreResult<Option<Session>> {
        let record = SessionRecord::find_active(&self.pool, token_hash).await?;
        Ok(record.map(SessionRecord::into_session))
    }

    async fn set_session(
        &self,
        token_hash: &str,
        session: &Session,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        Ok(SessionRecord::create(&self.pool, token_hash, session, expires_at).await?)
    }

    async fn clear_session(&self, token_hash: &str) -> StoreResult<()> {
        SessionRecord::delete(&self.pool, token_hash).await?;
        Ok(())
    }

    async fn clear_user_sessions(&self, username: &str) -> StoreResult<u64> {
        Ok(SessionRecord::delete_for_user(&self.pool, username).await?)
    }
}

#[async_trait]
impl TrainingRecords for PgStore {
    async fn overview_counts(&self) -> StoreResult<OverviewStats> {
        Ok(TrainingStatus::overview(&self.pool).await?)
    }

    async fn monthly_counts(&self) -> StoreResult<Vec<MonthlyCounts>> {
        Ok(TrainingStatus::monthly(&self.pool).await?)
    }

    async fn collaborator_tallies(&self) -> StoreResult<Vec<CollaboratorTally>> {
        Ok(TrainingStatus::tallies_by_collaborator(&self.pool).await?)
    }

    async fn lookup_status(&self, query: &str) -> StoreResult<Vec<StatusLookupRow>> {
        Ok(TrainingStatus::lookup(&self.pool, query).await?)
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list_trainings(&self) -> StoreResult<Vec<Training>> {
        Ok(Training::list(&self.pool).await?)
    }

    async fn create_training(&self, data: TrainingInput) -> StoreResult<Training> {
        Ok(Training::create(&self.pool, data).await?)
    }

    async fn update_training(&self, id: i64, data: TrainingInput) -> StoreResult<Option<Training>> {
        Ok(Training::update(&self.pool, id, data).await?)
    }

    async fn delete_training(&self, id: i64) -> StoreResult<bool> {
        Ok(Training::delete(&self.pool, id).await?)
    }

    async fn list_technicians(&self) -> StoreResult<Vec<Technician>> {
        Ok(Technician::list(&self.pool).await?)
    }

    async fn create_technician(&self, data: TechnicianInput) -> StoreResult<Technician> {
        Ok(Technician::create(&self.pool, data).await?)
    }

    async fn update_technician(&self, id: i64, data: TechnicianInput) -> StoreResult<Option<Technician>> {
        Ok(Technician::update(&self.pool, id, data).await?)
    }

    async fn delete_technician(&self, id: i64) -> StoreResult<bool> {
        Ok(Technician::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
