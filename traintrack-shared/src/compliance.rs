/// Training compliance statistics
///
/// The aggregator turns training status rows into dashboard reports:
///
/// - **Overview**: total rows, on-time rows, overdue rows
/// - **Monthly breakdown**: on-time/overdue counts per calendar month of the
///   training date, ascending by month
/// - **Compliance by collaborator**: share of on-time rows per collaborator
///
/// All reports are read-only. Any store failure is returned as-is; no partial
/// results and no retries.
///
/// # Rounding
///
/// Percentages are rounded half away from zero to two decimal places, so
/// 2 on-time rows out of 3 yield `66.67`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use traintrack_shared::compliance::ComplianceAggregator;
/// use traintrack_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let aggregator = ComplianceAggregator::new(store);
///
/// let stats = aggregator.get_overview_stats().await?;
/// assert_eq!(stats.total_trainings, 0);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::session::Session;
use crate::models::user::Role;
use crate::store::{StoreResult, TrainingRecords};

/// Totals across all training status rows
///
/// Rows whose status is neither on-time nor overdue count toward
/// `total_trainings` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OverviewStats {
    pub total_trainings: i64,
    pub total_completed: i64,
    pub total_overdue: i64,
}

/// On-time/overdue counts for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    /// Calendar month, 1..=12
    pub month: u32,

    /// Display label, e.g. "Month 3"
    pub label: String,

    pub completed_count: i64,
    pub overdue_count: i64,
}

/// Completed and total status rows for one collaborator name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CollaboratorTally {
    pub name: String,
    pub completed: i64,
    pub total: i64,
}

/// Compliance percentage for one collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceEntry {
    pub name: String,
    pub completed: i64,
    pub total: i64,
    pub percentage: f64,
}

impl From<CollaboratorTally> for ComplianceEntry {
    fn from(tally: CollaboratorTally) -> Self {
        Self {
            percentage: compliance_percentage(tally.completed, tally.total),
            name: tally.name,
            completed: tally.completed,
            total: tally.total,
        }
    }
}

/// One row of a collaborator status lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatusLookupRow {
    pub name: String,
    pub role_title: String,
    pub training: String,
    pub situacao: String,
}

/// Everything the dashboard renders, in one payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub username: String,
    pub role: Role,
    pub overview: OverviewStats,
    pub monthly: Vec<MonthlyBucket>,
    pub compliance: Vec<ComplianceEntry>,
}

/// `completed / total * 100`, rounded to two decimals; 0 when `total` is 0
pub fn compliance_percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }

    let ratio = completed as f64 / total as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}

/// Display label for a calendar month
pub fn month_label(month: u32) -> String {
    format!("Month {}", month)
}

/// Computes compliance reports from training records
#[derive(Clone)]
pub struct ComplianceAggregator {
    records: Arc<dyn TrainingRecords>,
}

impl ComplianceAggregator {
    /// Creates an aggregator over the given records
    pub fn new(records: Arc<dyn TrainingRecords>) -> Self {
        Self { records }
    }

    /// Totals across all status rows
    pub async fn get_overview_stats(&self) -> StoreResult<OverviewStats> {
        let stats = self.records.overview_counts().await?;

        tracing::debug!(
            total = stats.total_trainings,
            completed = stats.total_completed,
            overdue = stats.total_overdue,
            "Computed overview stats"
        );

        Ok(stats)
    }

    /// Per-month counts ordered ascending by month number
    pub async fn get_monthly_breakdown(&self) -> StoreResult<Vec<MonthlyBucket>> {
        let mut counts = self.records.monthly_counts().await?;
        counts.sort_by_key(|c| c.month);

        let buckets = counts
            .into_iter()
            .filter_map(|c| {
                let month = u32::try_from(c.month).ok().filter(|m| (1..=12).contains(m))?;
                Some(MonthlyBucket {
                    month,
                    label: month_label(month),
                    completed_count: c.completed_count,
                    overdue_count: c.overdue_count,
                })
            })
            .collect();

        Ok(buckets)
    }

    /// Per-collaborator compliance with counts, ordered by name
    pub async fn compliance_entries(&self) -> StoreResult<Vec<ComplianceEntry>> {
        let mut entries: Vec<ComplianceEntry> = self
            .records
            .collaborator_tallies()
            .await?
            .into_iter()
            .map(ComplianceEntry::from)
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries)
    }

    /// Collaborator name → compliance percentage
    pub async fn get_compliance_by_collaborator(&self) -> StoreResult<BTreeMap<String, f64>> {
        let entries = self.compliance_entries().await?;
        Ok(entries.into_iter().map(|e| (e.name, e.percentage)).collect())
    }

    /// Status rows matching a collaborator name fragment or registration
    pub async fn lookup_collaborator_status(&self, query: &str) -> StoreResult<Vec<StatusLookupRow>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        self.records.lookup_status(query).await
    }

    /// Builds the full dashboard for a logged-in session
    pub async fn dashboard(&self, session: &Session) -> StoreResult<Dashboard> {
        let overview = self.get_overview_stats().await?;
        let monthly = self.get_monthly_breakdown().await?;
        let compliance = self.compliance_entries().await?;

        Ok(Dashboard {
            username: session.username.clone(),
            role: session.role,
            overview,
            monthly,
            compliance,
        })
    }
}
