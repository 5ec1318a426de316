/// Middleware for the API server
///
/// - `security`: Security response headers
/// - `session`: Session cookie resolution

pub mod security;
pub mod session;
