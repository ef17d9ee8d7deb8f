/// Registration, credential verification, and login
///
/// [`AuthService`] ties the credential store, the password hasher, and the
/// token issuer together. Argon2 work runs on the blocking thread pool and no
/// lock is held across it.
///
/// # Security
///
/// - Unknown usernames and wrong passwords both fail with
///   `AuthServiceError::InvalidCredentials`
/// - An unknown username still pays for one Argon2 verification against a
///   dummy hash, so response time does not reveal whether the account exists
/// - The username uniqueness constraint in storage decides concurrent
///   registrations; the lookup before insert is only a fast path
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use chrono::Duration;
/// use tasknest_shared::auth::jwt::TokenIssuer;
/// use tasknest_shared::auth::password::PasswordHasher;
/// use tasknest_shared::auth::service::AuthService;
/// use tasknest_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = AuthService::new(
///     Arc::new(MemoryStore::new()),
///     PasswordHasher::default(),
///     TokenIssuer::new("your-secret-key-at-least-32-bytes-long", Duration::hours(72)),
/// )?;
///
/// service.register("alice", "pw123").await?;
/// let outcome = service.login("alice", "pw123").await?;
/// println!("token: {}", outcome.token);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::jwt::{JwtError, TokenIssuer};
use super::password::{PasswordError, PasswordHasher};
use crate::models::user::{CreateUser, User};
use crate::store::{CredentialStore, StoreError};

/// Password verified against when the username does not exist
const DUMMY_PASSWORD: &str = "tasknest-dummy-password";

/// Error type for the authentication service
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Username is already registered
    #[error("Username already exists")]
    DuplicateUsername,

    /// Storage failure
    #[error(transparent)]
    Storage(StoreError),

    /// Password hashing failed or a stored hash is unreadable
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Token could not be issued
    #[error(transparent)]
    Token(#[from] JwtError),
}

impl From<StoreError> for AuthServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => AuthServiceError::DuplicateUsername,
            other => AuthServiceError::Storage(other),
        }
    }
}

impl From<PasswordError> for AuthServiceError {
    fn from(err: PasswordError) -> Self {
        AuthServiceError::Hashing(err.to_string())
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed session token
    pub token: String,

    /// When the token expires
    pub expires_at: DateTime<Utc>,

    /// The authenticated identity
    pub user: User,
}

/// Authentication service
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    dummy_hash: Arc<str>,
}

impl AuthService {
    /// Creates a new authentication service
    ///
    /// Hashes the dummy password up front, so this blocks for one Argon2 run.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::Hashing` if the hasher's parameters are invalid
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
    ) -> Result<Self, AuthServiceError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;

        Ok(Self {
            store,
            hasher,
            issuer,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Registers a new identity
    ///
    /// # Errors
    ///
    /// - `AuthServiceError::DuplicateUsername` if the username is taken
    /// - `AuthServiceError::Hashing` if hashing fails
    /// - `AuthServiceError::Storage` on storage failure
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthServiceError> {
        if self.store.find_by_username(username).await?.is_some() {
            debug!(username = %username, "Registration rejected: username taken");
            return Err(AuthServiceError::DuplicateUsername);
        }

        let password_hash = self.hash(password).await?;

        let user = self
            .store
            .insert_user(CreateUser {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies a username/password pair
    ///
    /// # Errors
    ///
    /// - `AuthServiceError::InvalidCredentials` if the username is unknown or
    ///   the password does not match
    /// - `AuthServiceError::Hashing` if the stored hash is unreadable
    /// - `AuthServiceError::Storage` on storage failure
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, AuthServiceError> {
        let user = self.store.find_by_username(username).await?;

        let Some(user) = user else {
            self.burn_dummy_verification(password).await;
            debug!(username = %username, "Login failed: unknown username");
            return Err(AuthServiceError::InvalidCredentials);
        };

        if self.check(password, &user.password_hash).await? {
            Ok(user)
        } else {
            debug!(user_id = user.id, "Login failed: wrong password");
            Err(AuthServiceError::InvalidCredentials)
        }
    }

    /// Verifies credentials and issues a session token
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::verify`], plus `AuthServiceError::Token` if
    /// signing fails
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthServiceError> {
        let user = self.verify(username, password).await?;
        let issued = self.issuer.issue(user.id, &user.username)?;

        info!(user_id = user.id, "User logged in");
        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    async fn hash(&self, password: &str) -> Result<String, AuthServiceError> {
        let hasher = self.hasher;
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthServiceError::Hashing(format!("Hashing task failed: {}", e)))?
            .map_err(AuthServiceError::from)
    }

    async fn check(&self, password: &str, hash: &str) -> Result<bool, AuthServiceError> {
        let hasher = self.hasher;
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthServiceError::Hashing(format!("Verification task failed: {}", e)))?
            .map_err(AuthServiceError::from)
    }

    /// Spends the same Argon2 effort as a real verification; the outcome is ignored
    async fn burn_dummy_verification(&self, password: &str) {
        let hasher = self.hasher;
        let dummy = self.dummy_hash.clone();
        let password = password.to_string();

        let result = tokio::task::spawn_blocking(move || hasher.verify(&password, &dummy)).await;

        if let Ok(Err(e)) = result {
            warn!(error = %e, "Dummy password verification failed");
        }
    }
}
