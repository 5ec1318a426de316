/// Collaborators, training status rows, and the aggregate queries over them
///
/// Status rows link a collaborator to a training with a `situacao` value.
/// Stored values are `em_dias` (on time) and `vencido` (overdue); any other
/// value is a valid row that belongs to neither bucket.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE collaborators (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     role_title VARCHAR(255) NOT NULL DEFAULT '',
///     registration VARCHAR(50) NOT NULL UNIQUE
/// );
///
/// CREATE TABLE training_status (
///     collaborator_id BIGINT NOT NULL REFERENCES collaborators(id) ON DELETE CASCADE,
///     training_id BIGINT NOT NULL REFERENCES trainings(id) ON DELETE CASCADE,
///     situacao VARCHAR(20) NOT NULL,
///     PRIMARY KEY (collaborator_id, training_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::compliance::{CollaboratorTally, OverviewStats, StatusLookupRow};

/// Stored value for an on-time status row
pub const SITUACAO_ON_TIME: &str = "em_dias";

/// Stored value for an overdue status row
pub const SITUACAO_OVERDUE: &str = "vencido";

/// Classification of a training status row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situacao {
    OnTime,
    Overdue,
}

impl Situacao {
    /// Classifies a stored value; unknown values belong to no bucket
    pub fn classify(value: &str) -> Option<Self> {
        match value {
            SITUACAO_ON_TIME => Some(Situacao::OnTime),
            SITUACAO_OVERDUE => Some(Situacao::Overdue),
            _ => None,
        }
    }
}

/// An employee whose training completion is tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collaborator {
    pub id: i64,
    pub name: String,
    pub role_title: String,
    /// Employee number
    pub registration: String,
}

/// A collaborator's status for one training
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrainingStatus {
    pub collaborator_id: i64,
    pub training_id: i64,
    /// Raw stored value, see [`Situacao::classify`]
    pub situacao: String,
}

/// Raw per-month counts as returned by the grouped query
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct MonthlyCounts {
    /// Calendar month, 1..=12
    pub month: i32,
    pub completed_count: i64,
    pub overdue_count: i64,
}

/// Escapes `LIKE` wildcards so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl TrainingStatus {
    /// Counts all rows and classifies them into the on-time and overdue buckets
    pub async fn overview(pool: &PgPool) -> Result<OverviewStats, sqlx::Error> {
        sqlx::query_as::<_, OverviewStats>(
            r#"
            SELECT
                COUNT(*) AS total_trainings,
                COALESCE(SUM(CASE WHEN situacao = 'em_dias' THEN 1 ELSE 0 END), 0)::BIGINT AS total_completed,
                COALESCE(SUM(CASE WHEN situacao = 'vencido' THEN 1 ELSE 0 END), 0)::BIGINT AS total_overdue
            FROM training_status
            "#,
        )
        .fetch_one(pool)
        .await
    }

    /// Groups rows by the calendar month of the joined training date
    pub async fn monthly(pool: &PgPool) -> Result<Vec<MonthlyCounts>, sqlx::Error> {
        sqlx::query_as::<_, MonthlyCounts>(
            r#"
            SELECT
                EXTRACT(MONTH FROM t.training_date)::INT AS month,
                COALESCE(SUM(CASE WHEN st.situacao = 'em_dias' THEN 1 ELSE 0 END), 0)::BIGINT AS completed_count,
                COALESCE(SUM(CASE WHEN st.situacao = 'vencido' THEN 1 ELSE 0 END), 0)::BIGINT AS overdue_count
            FROM training_status st
            JOIN trainings t ON st.training_id = t.id
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Completed and total row counts per distinct collaborator name
    ///
    /// Collaborators without any status row are included with zero counts.
    pub async fn tallies_by_collaborator(pool: &PgPool) -> Result<Vec<CollaboratorTally>, sqlx::Error> {
        sqlx::query_as::<_, CollaboratorTally>(
            r#"
            SELECT
                c.name,
                COUNT(st.collaborator_id) FILTER (WHERE st.situacao = 'em_dias') AS completed,
                COUNT(st.collaborator_id) AS total
            FROM collaborators c
            LEFT JOIN training_status st ON c.id = st.collaborator_id
            GROUP BY c.name
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Status rows for collaborators whose name contains `query` or whose
    /// registration equals it
    pub async fn lookup(pool: &PgPool, query: &str) -> Result<Vec<StatusLookupRow>, sqlx::Error> {
        sqlx::query_as::<_, StatusLookupRow>(
            r#"
            SELECT c.name, c.role_title, t.title AS training, st.situacao
            FROM collaborators c
            JOIN training_status st ON c.id = st.collaborator_id
            JOIN trainings t ON st.training_id = t.id
            WHERE c.name LIKE $1 OR c.registration = $2
            ORDER BY c.name, t.title
            "#,
        )
        .bind(format!("%{}%", escape_like(query)))
        .bind(query)
        .fetch_all(pool)
        .await
    }
}
