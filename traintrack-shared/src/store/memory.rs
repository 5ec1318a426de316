/// In-memory store
///
/// Implements every store trait over a single `RwLock`-guarded state. All
/// writes happen under the write lock, so the uniqueness checks in
/// [`CredentialStore::insert`] cannot race. Used by tests and for running
/// the server without a database.
///
/// # Example
///
/// ```
/// use traintrack_shared::store::memory::MemoryStore;
/// use traintrack_shared::store::TrainingRecords;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let ana = store.add_collaborator("Ana", "Electrician", "1001").await;
/// let stats = store.overview_counts().await?;
/// assert_eq!(stats.total_trainings, 0);
/// # let _ = ana;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CredentialStore, RecordStore, SessionStore, Store, StoreError, StoreResult, TrainingRecords,
};
use crate::compliance::{CollaboratorTally, OverviewStats, StatusLookupRow};
use crate::models::session::{Session, SessionRecord};
use crate::models::technician::{Technician, TechnicianInput};
use crate::models::training::{Training, TrainingInput};
use crate::models::training_status::{Collaborator, MonthlyCounts, Situacao, TrainingStatus};
use crate::models::user::{CreateUser, User};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    sessions: HashMap<String, SessionRecord>,
    trainings: BTreeMap<i64, Training>,
    technicians: BTreeMap<i64, Technician>,
    collaborators: BTreeMap<i64, Collaborator>,
    statuses: Vec<TrainingStatus>,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Store backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collaborator and returns its id
    pub async fn add_collaborator(&self, name: &str, role_title: &str, registration: &str) -> i64 {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.collaborators.insert(
            id,
            Collaborator {
                id,
                name: name.to_string(),
                role_title: role_title.to_string(),
                registration: registration.to_string(),
            },
        );
        id
    }

    /// Records a collaborator's status for a training
    ///
    /// `situacao` is stored verbatim; values other than on-time and overdue
    /// are allowed.
    pub async fn add_status(&self, collaborator_id: i64, training_id: i64, situacao: &str) {
        let mut state = self.state.write().await;
        state.statuses.push(TrainingStatus {
            collaborator_id,
            training_id,
            situacao: situacao.to_string(),
        });
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Number of stored sessions, expired ones included
    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username_or_email(&self, username: &str, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation("users_username_key".to_string()));
        }
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn current_session(&self, token_hash: &str) -> StoreResult<Option<Session>> {
        let state = self.state.read().await;
        let now = Utc::now();
        Ok(state
            .sessions
            .get(token_hash)
            .filter(|record| record.is_active(now))
            .cloned()
            .map(SessionRecord::into_session))
    }

    async fn set_session(
        &self,
        token_hash: &str,
        session: &Session,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        state.sessions.retain(|_, record| record.is_active(now));
        state.sessions.insert(
            token_hash.to_string(),
            SessionRecord {
                token_hash: token_hash.to_string(),
                username: session.username.clone(),
                role: session.role,
                created_at: now,
                expires_at,
            },
        );
        Ok(())
    }

    async fn clear_session(&self, token_hash: &str) -> StoreResult<()> {
        self.state.write().await.sessions.remove(token_hash);
        Ok(())
    }

    async fn clear_user_sessions(&self, username: &str) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, record| record.username != username);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl TrainingRecords for MemoryStore {
    async fn overview_counts(&self) -> StoreResult<OverviewStats> {
        let state = self.state.read().await;
        let mut stats = OverviewStats::default();

        for status in &state.statuses {
            stats.total_trainings += 1;
            match Situacao::classify(&status.situacao) {
                Some(Situacao::OnTime) => stats.total_completed += 1,
                Some(Situacao::Overdue) => stats.total_overdue += 1,
                None => {}
            }
        }

        Ok(stats)
    }

    async fn monthly_counts(&self) -> StoreResult<Vec<MonthlyCounts>> {
        let state = self.state.read().await;
        let mut months: BTreeMap<u32, (i64, i64)> = BTreeMap::new();

        for status in &state.statuses {
            // Inner join: rows without a training are skipped
            let Some(training) = state.trainings.get(&status.training_id) else {
                continue;
            };
            let entry = months.entry(training.training_date.month()).or_default();
            match Situacao::classify(&status.situacao) {
                Some(Situacao::OnTime) => entry.0 += 1,
                Some(Situacao::Overdue) => entry.1 += 1,
                None => {}
            }
        }

        Ok(months
            .into_iter()
            .map(|(month, (completed, overdue))| MonthlyCounts {
                month: month as i32,
                completed_count: completed,
                overdue_count: overdue,
            })
            .collect())
    }

    async fn collaborator_tallies(&self) -> StoreResult<Vec<CollaboratorTally>> {
        let state = self.state.read().await;
        let mut tallies: BTreeMap<&str, (i64, i64)> = BTreeMap::new();

        for collaborator in state.collaborators.values() {
            tallies.entry(collaborator.name.as_str()).or_default();
        }

        for status in &state.statuses {
            let Some(collaborator) = state.collaborators.get(&status.collaborator_id) else {
                continue;
            };
            let entry = tallies.entry(collaborator.name.as_str()).or_default();
            entry.1 += 1;
            if Situacao::classify(&status.situacao) == Some(Situacao::OnTime) {
                entry.0 += 1;
            }
        }

        Ok(tallies
            .into_iter()
            .map(|(name, (completed, total))| CollaboratorTally {
                name: name.to_string(),
                completed,
                total,
            })
            .collect())
    }

    async fn lookup_status(&self, query: &str) -> StoreResult<Vec<StatusLookupRow>> {
        let state = self.state.read().await;

        let mut rows: Vec<StatusLookupRow> = state
            .statuses
            .iter()
            .filter_map(|status| {
                let collaborator = state.collaborators.get(&status.collaborator_id)?;
                let training = state.trainings.get(&status.training_id)?;
                let matches =
                    collaborator.name.contains(query) || collaborator.registration == query;
                matches.then(|| StatusLookupRow {
                    name: collaborator.name.clone(),
                    role_title: collaborator.role_title.clone(),
                    training: training.title.clone(),
                    situacao: status.situacao.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| (&a.name, &a.training).cmp(&(&b.name, &b.training)));

        Ok(rows)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_trainings(&self) -> StoreResult<Vec<Training>> {
        let state = self.state.read().await;
        let mut trainings: Vec<Training> = state.trainings.values().cloned().collect();
        trainings.sort_by_key(|t| (t.training_date, t.id));
        Ok(trainings)
    }

    async fn create_training(&self, data: TrainingInput) -> StoreResult<Training> {
        let mut state = self.state.write().await;
        let id = state.next_id();
        let training = Training::from_input(id, data);
        state.trainings.insert(id, training.clone());
        Ok(training)
    }

    async fn update_training(&self, id: i64, data: TrainingInput) -> StoreResult<Option<Training>> {
        let mut state = self.state.write().await;
        Ok(state.trainings.get_mut(&id).map(|existing| {
            *existing = Training::from_input(id, data);
            existing.clone()
        }))
    }

    async fn delete_training(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.trainings.remove(&id).is_some();
        if removed {
            state.statuses.retain(|s| s.training_id != id);
        }
        Ok(removed)
    }

    async fn list_technicians(&self) -> StoreResult<Vec<Technician>> {
        let state = self.state.read().await;
        let mut technicians: Vec<Technician> = state.technicians.values().cloned().collect();
        technicians.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(technicians)
    }

    async fn create_technician(&self, data: TechnicianInput) -> StoreResult<Technician> {
        let mut state = self.state.write().await;
        let id = state.next_id();
        let technician = Technician::from_input(id, data);
        state.technicians.insert(id, technician.clone());
        Ok(technician)
    }

    async fn update_technician(&self, id: i64, data: TechnicianInput) -> StoreResult<Option<Technician>> {
        let mut state = self.state.write().await;
        Ok(state.technicians.get_mut(&id).map(|existing| {
            *existing = Technician::from_input(id, data);
            existing.clone()
        }))
    }

    async fn delete_technician(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.technicians.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use chrono::{Duration, NaiveDate};

    fn create_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Technician,
        }
    }

    fn training(title: &str, month: u32) -> TrainingInput {
        TrainingInput {
            title: title.to_string(),
            description: String::new(),
            training_date: NaiveDate::from_ymd_opt(2024, month, 10).unwrap(),
            status: "done".to_string(),
            participants: String::new(),
            responsible: String::new(),
            location: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_username() {
        let store = MemoryStore::new();
        store.insert(create_user("ana", "ana@example.com")).await.unwrap();

        let err = store
            .insert(create_user("ana", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(c) if c.contains("username")));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.insert(create_user("ana", "ana@example.com")).await.unwrap();

        let err = store
            .insert(create_user("bia", "ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(c) if c.contains("email")));
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        store.insert(create_user("ana", "ana@example.com")).await.unwrap();

        assert!(store.find_by_username("ana").await.unwrap().is_some());
        assert!(store.find_by_username("Ana").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_not_current() {
        let store = MemoryStore::new();
        let session = Session {
            logged_in: true,
            username: "ana".to_string(),
            role: Role::Manager,
        };

        store
            .set_session("expired", &session, Utc::now() - Duration::seconds(1))
            .await
            .unwrap();
        assert!(store.current_session("expired").await.unwrap().is_none());

        store
            .set_session("live", &session, Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(store.current_session("live").await.unwrap(), Some(session));
        // The expired entry was purged by the second insert
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_clear_user_sessions() {
        let store = MemoryStore::new();
        let expires = Utc::now() + Duration::hours(1);
        for (hash, user) in [("a", "ana"), ("b", "ana"), ("c", "bia")] {
            let session = Session {
                logged_in: true,
                username: user.to_string(),
                role: Role::Technician,
            };
            store.set_session(hash, &session, expires).await.unwrap();
        }

        assert_eq!(store.clear_user_sessions("ana").await.unwrap(), 2);
        assert!(store.current_session("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_monthly_counts_skip_orphans_and_sort() {
        let store = MemoryStore::new();
        let ana = store.add_collaborator("Ana", "Electrician", "1001").await;
        let may = store.create_training(training("NR-35", 5)).await.unwrap();
        let jan = store.create_training(training("NR-10", 1)).await.unwrap();

        store.add_status(ana, may.id, "em_dias").await;
        store.add_status(ana, jan.id, "vencido").await;
        store.add_status(ana, 9999, "em_dias").await;

        let months = store.monthly_counts().await.unwrap();
        assert_eq!(
            months,
            vec![
                MonthlyCounts { month: 1, completed_count: 0, overdue_count: 1 },
                MonthlyCounts { month: 5, completed_count: 1, overdue_count: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_training_removes_statuses() {
        let store = MemoryStore::new();
        let ana = store.add_collaborator("Ana", "Electrician", "1001").await;
        let nr10 = store.create_training(training("NR-10", 1)).await.unwrap();
        store.add_status(ana, nr10.id, "em_dias").await;

        assert!(store.delete_training(nr10.id).await.unwrap());
        assert!(!store.delete_training(nr10.id).await.unwrap());
        assert_eq!(store.overview_counts().await.unwrap().total_trainings, 0);
    }
}
