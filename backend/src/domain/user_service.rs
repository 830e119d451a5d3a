//! Account use cases: signup, login, bearer authentication, and removal.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{PersistenceError, PersistenceGateway};
use crate::domain::{Error, User, UserToken, hash_password, verify_password};

const TOKEN_MISSING: &str = "Bearer token missing.";
const TOKEN_INVALID: &str = "Invalid token.";
const BAD_CREDENTIALS: &str = "Invalid user or password";

/// Usernames are compared without surrounding whitespace.
fn normalise_name(name: &str) -> &str {
    name.trim()
}

/// Service orchestrating user lifecycle over the persistence gateway.
#[derive(Clone)]
pub struct UserService {
    persistence: Arc<dyn PersistenceGateway>,
}

impl UserService {
    /// Create a service over `persistence`.
    pub fn new(persistence: Arc<dyn PersistenceGateway>) -> Self {
        Self { persistence }
    }

    /// Register a user, storing only an Argon2 hash of `password`.
    ///
    /// # Errors
    /// `InvalidRequest` for blank input, `Conflict` for a taken name.
    pub async fn create_user(&self, name: &str, password: &str) -> Result<User, Error> {
        let name = normalise_name(name);
        if name.is_empty() || password.is_empty() {
            return Err(PersistenceError::MissingParameter.into());
        }
        let hash = hash_password(password).await?;
        let user = self.persistence.create_user(name, &hash).await?;
        info!(user = %user.name, "user created");
        Ok(user)
    }

    /// Resolve a presented bearer token.
    ///
    /// An absent or blank token and an unknown token fail with distinct
    /// `Unauthorized` messages.
    pub async fn authenticate(&self, token: Option<&UserToken>) -> Result<User, Error> {
        let token = token
            .filter(|token| !token.is_blank())
            .ok_or_else(|| Error::unauthorized(TOKEN_MISSING))?;
        match self.persistence.get_user_by_token(token).await {
            Ok(user) => Ok(user),
            Err(
                PersistenceError::UserNotFound
                | PersistenceError::MissingUser
                | PersistenceError::NotFound { .. },
            ) => Err(Error::unauthorized(TOKEN_INVALID)),
            Err(other) => Err(other.into()),
        }
    }

    /// Exchange a name and password for the user record.
    ///
    /// Unknown names and wrong passwords are indistinguishable to callers.
    pub async fn login(&self, name: &str, password: &str) -> Result<User, Error> {
        let name = normalise_name(name);
        let user = match self.persistence.get_user_by_username(name).await {
            Ok(user) => user,
            Err(
                PersistenceError::NotFound { .. }
                | PersistenceError::MissingParameter
                | PersistenceError::ParameterTooLong,
            ) => {
                return Err(Error::unauthorized(BAD_CREDENTIALS));
            }
            Err(other) => return Err(other.into()),
        };
        if !verify_password(password, &user.password_hash).await? {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }
        Ok(user)
    }

    /// Delete the user owning `token` together with their groups.
    pub async fn delete_user_by_token(&self, token: &UserToken) -> Result<(), Error> {
        self.persistence.delete_user_by_token(token).await?;
        info!("user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
