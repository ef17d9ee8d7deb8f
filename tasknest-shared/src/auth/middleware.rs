/// Authentication gate for Axum
///
/// Every protected route sits behind [`require_auth`]. The gate reads the
/// `Authorization: Bearer <token>` header, validates the session token, and
/// inserts an [`AuthUser`] into the request extensions before the handler runs.
/// Any failure short-circuits with 401 and the handler is never invoked.
///
/// # Request Extensions
///
/// After successful authentication the gate adds:
/// - `AuthUser`: user_id and username from the validated claims
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Extension, Router};
/// use tasknest_shared::auth::jwt::TokenValidator;
/// use tasknest_shared::auth::middleware::{require_auth, AuthUser};
///
/// async fn me(Extension(user): Extension<AuthUser>) -> String {
///     format!("Hello, {}!", user.username)
/// }
///
/// let validator = Arc::new(TokenValidator::new("your-secret-key-at-least-32-bytes-long"));
/// let app: Router = Router::new()
///     .route("/me", get(me))
///     .layer(middleware::from_fn_with_state(validator, require_auth));
/// ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::jwt::{Claims, JwtError, TokenValidator};

/// Authenticated caller, scoped to a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Identity ID
    pub user_id: i64,

    /// Identity username
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Error type for the authentication gate
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Authorization header is not `Bearer <token>`
    #[error("Expected Bearer token")]
    InvalidScheme,

    /// Token validation failed
    #[error(transparent)]
    InvalidToken(#[from] JwtError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(reason = %self, "Rejected unauthenticated request");

        let message = match &self {
            AuthError::InvalidToken(JwtError::Expired) => "Token has expired".to_string(),
            AuthError::InvalidToken(_) => "Invalid or malformed token".to_string(),
            other => other.to_string(),
        };

        let body = Json(serde_json::json!({
            "error": "unauthorized",
            "message": message,
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Resolves an Authorization header value to the authenticated caller
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if `header` is `None`
/// - `AuthError::InvalidScheme` if it is not a non-empty Bearer token
/// - `AuthError::InvalidToken` if the token fails validation
pub fn authenticate(validator: &TokenValidator, header: Option<&str>) -> Result<AuthUser, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidScheme)?;

    let claims = validator.validate(token)?;
    Ok(AuthUser::from(claims))
}

/// JWT authentication middleware
///
/// Use with `axum::middleware::from_fn_with_state`, passing the shared
/// [`TokenValidator`].
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing or not valid UTF-8
/// - Header is not a Bearer token
/// - Token signature, structure, claims, or expiry check fails
pub async fn require_auth(
    State(validator): State<Arc<TokenValidator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let user = authenticate(&validator, header)?;
    tracing::debug!(user_id = user.user_id, "Authenticated request");

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
