/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: Session token generation and hashing
/// - [`service`]: Registration, login, logout and password reset
/// - [`authorization`]: Login and manager gates over the current session
///
/// # Example
///
/// ```
/// use traintrack_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod password;
pub mod service;
pub mod token;
