/// Authentication and ownership enforcement
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Session token issuance and validation
/// - [`middleware`]: Authentication gate for protected routes
/// - [`authorization`]: Owner-of-record scoping for owned resources
/// - [`service`]: Registration, credential verification, and login
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, 64 MB memory, 3 iterations by default
/// - **Session Tokens**: HS256 with a configurable lifetime (72 hours by default)
/// - **Ownership**: every owned-resource query is filtered by owner
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use tasknest_shared::auth::jwt::{TokenIssuer, TokenValidator};
/// use tasknest_shared::auth::password::PasswordHasher;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::default();
/// let hash = hasher.hash("user_password")?;
/// assert!(hasher.verify("user_password", &hash)?);
///
/// let secret = "your-secret-key-at-least-32-bytes-long";
/// let token = TokenIssuer::new(secret, Duration::hours(72)).issue(1, "alice")?.token;
/// let claims = TokenValidator::new(secret).validate(&token)?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
