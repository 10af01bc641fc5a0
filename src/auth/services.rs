use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::error::{Error, Result};

/// Create an account. The store's unique constraint on `username` makes
/// this insert-if-absent atomic; a taken name maps to `AlreadyExists`.
pub async fn register(db: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let hash = hash_password(password)?;
    let user = User::create(db, username, &hash)
        .await
        .map_err(|e| Error::from(e).on_unique_violation(Error::AlreadyExists))?;
    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Check credentials. `Ok(None)` means unknown username or wrong
/// password; callers treat it as a normal outcome, not a failure.
pub async fn login(db: &SqlitePool, username: &str, password: &str) -> Result<Option<User>> {
    let Some(user) = User::find_by_username(db, username).await? else {
        warn!(%username, "login: unknown username");
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login: wrong password");
        return Ok(None);
    }
    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Some(user))
}
