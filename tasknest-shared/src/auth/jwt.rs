/// JWT session token issuance and validation
///
/// Session tokens are stateless HS256 (HMAC-SHA256) JWTs. Validity depends only
/// on the signature and the `exp` claim; there is no server-side session table,
/// so a single token cannot be revoked before it expires.
///
/// # Claims
///
/// - `user_id`: Identity ID (required)
/// - `username`: Identity username
/// - `iat`: Issued at (Unix timestamp)
/// - `exp`: Expiration (Unix timestamp, required)
///
/// # Validation
///
/// - Only HS256 is accepted; any other `alg` in the header is rejected
/// - `exp` must be strictly after the validation instant (no leeway)
/// - Tokens without `user_id` are rejected
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use tasknest_shared::auth::jwt::{TokenIssuer, TokenValidator};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes-long";
/// let issuer = TokenIssuer::new(secret, Duration::hours(72));
/// let validator = TokenValidator::new(secret);
///
/// let issued = issuer.issue(42, "alice")?;
/// let claims = validator.validate(&issued.token)?;
/// assert_eq!(claims.user_id, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Default session lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 72;

/// Longest accepted session lifetime (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Error type for JWT operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token could not be parsed
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Signature does not verify, or the token was signed with another algorithm
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Expiry is not in the future
    #[error("Token has expired")]
    Expired,

    /// A required claim is absent
    #[error("Token is missing required claim: {0}")]
    MissingClaim(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::InvalidSignature,
            ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
            _ => JwtError::Malformed(err.to_string()),
        }
    }
}

/// Validated session claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity ID
    pub user_id: i64,

    /// Identity username
    pub username: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Whether the token is expired at `now`
    ///
    /// A token expiring exactly at `now` is already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// Claims as they appear on the wire, before required fields are checked
#[derive(Debug, Deserialize)]
struct RawClaims {
    user_id: Option<i64>,
    #[serde(default)]
    username: String,
    #[serde(default)]
    iat: i64,
    exp: i64,
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT
    pub token: String,

    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Signs session tokens
///
/// The secret is held only as an HMAC key and never exposed again.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer signing with `secret` and granting `ttl` of validity
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
            ttl,
        }
    }

    /// Issues a token for an identity, valid from now for the configured TTL
    pub fn issue(&self, user_id: i64, username: &str) -> Result<IssuedToken, JwtError> {
        self.issue_at(user_id, username, Utc::now())
    }

    /// Issues a token as if the current time were `now`
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            JwtError::CreateError("Token expiry is out of range".to_string())
        })?;
        let claims = Claims {
            user_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }
}

/// Verifies session tokens
#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator").finish_non_exhaustive()
    }
}

impl TokenValidator {
    /// Creates a validator for tokens signed with `secret`
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is checked against an explicit clock in `validate_at`
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    /// Validates a token against the current time
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    /// Validates a token as if the current time were `now`
    ///
    /// Checks, in order: structure and algorithm, signature, required claims,
    /// expiry. A tampered token is therefore reported as a signature failure
    /// even when it is also expired.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let raw = decode::<RawClaims>(token, &self.key, &self.validation)?.claims;

        let user_id = raw
            .user_id
            .ok_or_else(|| JwtError::MissingClaim("user_id".to_string()))?;

        let claims = Claims {
            user_id,
            username: raw.username,
            iat: raw.iat,
            exp: raw.exp,
        };

        if claims.is_expired_at(now) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}
