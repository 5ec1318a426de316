/// API route handlers, organized by resource
///
/// - `health`: Health check
/// - `auth`: Register, login, logout, password reset, current session
/// - `compliance`: Dashboard and compliance reports
/// - `trainings`: Training records
/// - `technicians`: Technician records

pub mod auth;
pub mod compliance;
pub mod health;
pub mod technicians;
pub mod trainings;
