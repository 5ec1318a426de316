/// Database layer for TrainTrack
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health check
/// - `migrations`: Embedded schema migrations
///
/// Models and their queries are in the `models` module at crate root level.

pub mod migrations;
pub mod pool;
