/// Ownership enforcement for owned resources
///
/// TaskNest has a single permission level: the owner of record. Ownership is
/// enforced as a mandatory query predicate rather than a check after loading:
/// every store method for an owned resource takes an [`OwnerScope`], and the
/// backend includes `user_id = scope` in its filter. A row that belongs to
/// someone else is therefore indistinguishable from a row that does not exist.
///
/// # Permission Model
///
/// 1. **Authentication**: the gate yields an `AuthUser` for the request
/// 2. **Scope**: handlers derive an `OwnerScope` from that `AuthUser` only
/// 3. **Filter**: storage never reads or writes outside the scope
///
/// Absence and non-ownership both surface as [`AuthzError::NotFoundOrForbidden`]
/// (HTTP 404), never 403.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::auth::authorization::{authorize, OwnerScope};
/// use tasknest_shared::auth::middleware::AuthUser;
/// use tasknest_shared::models::task::Task;
/// use tasknest_shared::store::TaskStore;
///
/// async fn load(store: &dyn TaskStore, user: &AuthUser, id: i64) -> Option<Task> {
///     let scope = OwnerScope::from(user);
///     authorize(store.find_task(&scope, id).await.ok()?).ok()
/// }
/// ```

use super::middleware::AuthUser;

/// Error type for ownership checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Resource is absent or owned by someone else
    #[error("Resource not found")]
    NotFoundOrForbidden,
}

/// The owner every owned-resource query is restricted to
///
/// Only constructible from an authenticated caller (or explicitly from an id
/// in trusted code such as tests and migrations), so a store method cannot be
/// called without deciding whose rows it may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerScope {
    owner_id: i64,
}

impl OwnerScope {
    /// Scope for a known owner id
    pub fn for_user(owner_id: i64) -> Self {
        Self { owner_id }
    }

    /// Owner id used in query predicates
    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    /// Whether a row owned by `row_owner` is inside this scope
    pub fn permits(&self, row_owner: i64) -> bool {
        self.owner_id == row_owner
    }
}

impl From<&AuthUser> for OwnerScope {
    fn from(user: &AuthUser) -> Self {
        Self::for_user(user.user_id)
    }
}

/// A record with a single owner of record
pub trait Owned {
    /// Owner id, set at creation and never changed
    fn owner_id(&self) -> i64;
}

/// Converts a scoped lookup result into an authorization decision
///
/// # Errors
///
/// Returns `AuthzError::NotFoundOrForbidden` if the scoped query found nothing
pub fn authorize<T>(found: Option<T>) -> Result<T, AuthzError> {
    found.ok_or(AuthzError::NotFoundOrForbidden)
}

/// Converts a scoped mutation's affected-row count into an authorization decision
///
/// # Errors
///
/// Returns `AuthzError::NotFoundOrForbidden` if no row matched the scope
pub fn authorize_mutation(rows_affected: u64) -> Result<(), AuthzError> {
    if rows_affected == 0 {
        Err(AuthzError::NotFoundOrForbidden)
    } else {
        Ok(())
    }
}

/// Copies out only the records inside `scope`; foreign rows are never cloned
pub fn within_scope<'a, T, I>(scope: &OwnerScope, records: I) -> Vec<T>
where
    T: Owned + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter(|r| scope.permits(r.owner_id()))
        .cloned()
        .collect()
}
