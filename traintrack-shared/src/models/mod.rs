/// Database models for TrainTrack
///
/// This module contains the database models and their queries.
///
/// # Models
///
/// - `user`: User accounts and roles
/// - `session`: Server-side login sessions
/// - `training`: Trainings and their schedule
/// - `technician`: Technician directory
/// - `training_status`: Per-collaborator training status and aggregate queries
///
/// # Example
///
/// ```no_run
/// use traintrack_shared::models::user::{CreateUser, Role, User};
/// use traintrack_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     username: "ana".to_string(),
///     email: "ana@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::Technician,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod session;
pub mod technician;
pub mod training;
pub mod training_status;
pub mod user;
