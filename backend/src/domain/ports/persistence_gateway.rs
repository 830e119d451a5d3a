//! Driven port for user, group, and game storage.
//!
//! Every implementation honours the same contract:
//! - blank required strings fail with [`PersistenceError::MissingParameter`];
//! - required strings longer than [`MAX_PARAM_CHARS`] fail with
//!   [`PersistenceError::ParameterTooLong`];
//! - a blank acting user fails with [`PersistenceError::MissingUser`];
//! - an unknown acting user fails with [`PersistenceError::UserNotFound`];
//! - editing a group keeps its storage id and its games;
//! - deleting a group drops its games, deleting a user drops their groups.

use async_trait::async_trait;

use crate::domain::{Game, GameDetails, GameId, Group, User, UserToken};

/// Longest name or identifier either store accepts.
///
/// Document-store keyword sub-fields are not indexed past this length, so a
/// longer name could be written but never found again.
pub const MAX_PARAM_CHARS: usize = 256;

/// Client-facing messages shared by every adapter.
pub mod messages {
    /// Duplicate group name for the same owner.
    pub const GROUP_EXISTS: &str = "Group Name already exists.";
    /// Group name does not resolve for the owner.
    pub const GROUP_NOT_FOUND: &str = "Group not found";
    /// Duplicate game id within a group.
    pub const GAME_EXISTS: &str = "Game already exists";
    /// Game id is not in the group.
    pub const GAME_NOT_FOUND: &str = "Game not found";
    /// Username already registered.
    pub const USER_EXISTS: &str = "User already exists.";
    /// Username does not resolve.
    pub const USER_DOES_NOT_EXIST: &str = "User does not exist.";
}

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// A required argument was blank.
    #[error("Missing parameter")]
    MissingParameter,
    /// A required argument exceeded [`MAX_PARAM_CHARS`].
    #[error("Parameter too long")]
    ParameterTooLong,
    /// The acting user reference was blank.
    #[error("Missing user")]
    MissingUser,
    /// The acting user token did not resolve.
    #[error("User not Found")]
    UserNotFound,
    /// A user, group, or game was absent.
    #[error("{message}")]
    NotFound { message: String },
    /// A user, group, or game already exists.
    #[error("{message}")]
    Conflict { message: String },
    /// The backing store failed or answered unexpectedly.
    #[error("persistence store failed: {message}")]
    Store { message: String },
}

impl PersistenceError {
    /// Build a [`PersistenceError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Build a [`PersistenceError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Build a [`PersistenceError::Store`].
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

/// Reject the call when any required argument is blank or too long.
///
/// # Errors
/// [`PersistenceError::MissingParameter`] for a blank value,
/// [`PersistenceError::ParameterTooLong`] for one over [`MAX_PARAM_CHARS`].
pub fn require_params(values: &[&str]) -> Result<(), PersistenceError> {
    if values.iter().any(|value| value.trim().is_empty()) {
        return Err(PersistenceError::MissingParameter);
    }
    if values
        .iter()
        .any(|value| value.chars().count() > MAX_PARAM_CHARS)
    {
        return Err(PersistenceError::ParameterTooLong);
    }
    Ok(())
}

/// Reject a blank acting user.
///
/// # Errors
/// [`PersistenceError::MissingUser`] when the token is blank.
pub fn require_user(user: &UserToken) -> Result<(), PersistenceError> {
    if user.is_blank() {
        return Err(PersistenceError::MissingUser);
    }
    Ok(())
}

/// Storage for users and their groups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Register a user with a fresh token. Names are unique.
    async fn create_user(&self, name: &str, password_hash: &str)
    -> Result<User, PersistenceError>;

    /// Resolve a bearer token.
    async fn get_user_by_token(&self, token: &UserToken) -> Result<User, PersistenceError>;

    /// Resolve a username.
    async fn get_user_by_username(&self, name: &str) -> Result<User, PersistenceError>;

    /// Remove a user, their groups, and the groups' games.
    async fn delete_user_by_token(&self, token: &UserToken) -> Result<(), PersistenceError>;

    /// Remove a user by name, cascading like [`Self::delete_user_by_token`].
    async fn delete_user_by_username(&self, name: &str) -> Result<(), PersistenceError>;

    /// Create an empty group.
    async fn create_group(
        &self,
        user: &UserToken,
        name: &str,
        description: &str,
    ) -> Result<Group, PersistenceError>;

    /// Rename and redescribe a group, keeping its games.
    async fn edit_group(
        &self,
        user: &UserToken,
        old_name: &str,
        new_name: &str,
        description: &str,
    ) -> Result<Group, PersistenceError>;

    /// Every group owned by `user`, games populated.
    async fn list_all_groups(&self, user: &UserToken) -> Result<Vec<Group>, PersistenceError>;

    /// One group with games populated, or `None` when absent.
    async fn get_group_details(
        &self,
        user: &UserToken,
        name: &str,
    ) -> Result<Option<Group>, PersistenceError>;

    /// Remove a group and return its last state.
    async fn delete_group(&self, user: &UserToken, name: &str) -> Result<Group, PersistenceError>;

    /// Append a game snapshot to a group.
    async fn add_game_to_group(
        &self,
        user: &UserToken,
        group_name: &str,
        game: &GameDetails,
    ) -> Result<Game, PersistenceError>;

    /// Remove a game from a group and return it.
    async fn remove_game_from_group(
        &self,
        user: &UserToken,
        group_name: &str,
        game_id: &GameId,
    ) -> Result<Game, PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["a", "b"], true)]
    #[case(&["a", ""], false)]
    #[case(&["  ", "b"], false)]
    #[case(&[], true)]
    fn require_params_rejects_blank_values(#[case] values: &[&str], #[case] ok: bool) {
        assert_eq!(require_params(values).is_ok(), ok);
    }

    #[test]
    fn require_params_caps_length_in_characters() {
        let at_cap = "é".repeat(MAX_PARAM_CHARS);
        let over_cap = "a".repeat(MAX_PARAM_CHARS + 1);
        assert!(require_params(&[&at_cap]).is_ok());
        assert_eq!(
            require_params(&["ok", &over_cap]),
            Err(PersistenceError::ParameterTooLong)
        );
    }

    #[test]
    fn require_user_rejects_blank_tokens() {
        assert_eq!(
            require_user(&UserToken::new(" ")),
            Err(PersistenceError::MissingUser)
        );
        assert!(require_user(&UserToken::new("t")).is_ok());
    }
}
