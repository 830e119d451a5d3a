//! Process-local persistence adapter.
//!
//! The store is an explicit object: construct one per test or per process
//! and share it through an `Arc`. Nothing is kept in statics.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::ports::messages::{
    GAME_EXISTS, GAME_NOT_FOUND, GROUP_EXISTS, GROUP_NOT_FOUND, USER_DOES_NOT_EXIST, USER_EXISTS,
};
use crate::domain::ports::{PersistenceError, PersistenceGateway, require_params, require_user};
use crate::domain::{Game, GameDetails, GameId, Group, GroupId, User, UserToken};

/// One user and the groups they own, in creation order.
#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    groups: Vec<Group>,
}

impl UserRecord {
    fn group_mut(&mut self, name: &str) -> Result<&mut Group, PersistenceError> {
        self.groups
            .iter_mut()
            .find(|group| group.name == name)
            .ok_or_else(|| PersistenceError::not_found(GROUP_NOT_FOUND))
    }

    fn has_group(&self, name: &str) -> bool {
        self.groups.iter().any(|group| group.name == name)
    }
}

/// In-memory [`PersistenceGateway`].
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    users: Mutex<HashMap<UserToken, UserRecord>>,
}

impl MemoryPersistence {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn record_mut<'a>(
    users: &'a mut HashMap<UserToken, UserRecord>,
    token: &UserToken,
) -> Result<&'a mut UserRecord, PersistenceError> {
    require_user(token)?;
    users.get_mut(token).ok_or(PersistenceError::UserNotFound)
}

fn token_for_name(
    users: &HashMap<UserToken, UserRecord>,
    name: &str,
) -> Result<UserToken, PersistenceError> {
    users
        .values()
        .find(|record| record.user.name == name)
        .map(|record| record.user.token.clone())
        .ok_or_else(|| PersistenceError::not_found(USER_DOES_NOT_EXIST))
}

#[async_trait]
impl PersistenceGateway for MemoryPersistence {
    async fn create_user(
        &self,
        name: &str,
        password_hash: &str,
    ) -> Result<User, PersistenceError> {
        require_params(&[name, password_hash])?;
        let mut users = self.users.lock().await;
        if users.values().any(|record| record.user.name == name) {
            return Err(PersistenceError::conflict(USER_EXISTS));
        }
        let user = User {
            token: UserToken::generate(),
            name: name.to_owned(),
            password_hash: password_hash.to_owned(),
        };
        users.insert(
            user.token.clone(),
            UserRecord {
                user: user.clone(),
                groups: Vec::new(),
            },
        );
        Ok(user)
    }

    async fn get_user_by_token(&self, token: &UserToken) -> Result<User, PersistenceError> {
        let mut users = self.users.lock().await;
        record_mut(&mut users, token).map(|record| record.user.clone())
    }

    async fn get_user_by_username(&self, name: &str) -> Result<User, PersistenceError> {
        require_params(&[name])?;
        let users = self.users.lock().await;
        users
            .values()
            .find(|record| record.user.name == name)
            .map(|record| record.user.clone())
            .ok_or_else(|| PersistenceError::not_found(USER_DOES_NOT_EXIST))
    }

    async fn delete_user_by_token(&self, token: &UserToken) -> Result<(), PersistenceError> {
        require_user(token)?;
        let mut users = self.users.lock().await;
        users
            .remove(token)
            .map(|_| ())
            .ok_or(PersistenceError::UserNotFound)
    }

    async fn delete_user_by_username(&self, name: &str) -> Result<(), PersistenceError> {
        require_params(&[name])?;
        let mut users = self.users.lock().await;
        let token = token_for_name(&users, name)?;
        users.remove(&token);
        Ok(())
    }

    async fn create_group(
        &self,
        user: &UserToken,
        name: &str,
        description: &str,
    ) -> Result<Group, PersistenceError> {
        let mut users = self.users.lock().await;
        let record = record_mut(&mut users, user)?;
        require_params(&[name])?;
        if record.has_group(name) {
            return Err(PersistenceError::conflict(GROUP_EXISTS));
        }
        let group = Group {
            id: GroupId::new(Uuid::new_v4().to_string()),
            owner: user.clone(),
            name: name.to_owned(),
            description: description.to_owned(),
            games: Vec::new(),
        };
        record.groups.push(group.clone());
        Ok(group)
    }

    async fn edit_group(
        &self,
        user: &UserToken,
        old_name: &str,
        new_name: &str,
        description: &str,
    ) -> Result<Group, PersistenceError> {
        let mut users = self.users.lock().await;
        let record = record_mut(&mut users, user)?;
        require_params(&[old_name, new_name])?;
        if !record.has_group(old_name) {
            return Err(PersistenceError::not_found(GROUP_NOT_FOUND));
        }
        if old_name != new_name && record.has_group(new_name) {
            return Err(PersistenceError::conflict(GROUP_EXISTS));
        }
        let group = record.group_mut(old_name)?;
        new_name.clone_into(&mut group.name);
        description.clone_into(&mut group.description);
        Ok(group.clone())
    }

    async fn list_all_groups(&self, user: &UserToken) -> Result<Vec<Group>, PersistenceError> {
        let mut users = self.users.lock().await;
        record_mut(&mut users, user).map(|record| record.groups.clone())
    }

    async fn get_group_details(
        &self,
        user: &UserToken,
        name: &str,
    ) -> Result<Option<Group>, PersistenceError> {
        let mut users = self.users.lock().await;
        let record = record_mut(&mut users, user)?;
        require_params(&[name])?;
        Ok(record.groups.iter().find(|group| group.name == name).cloned())
    }

    async fn delete_group(&self, user: &UserToken, name: &str) -> Result<Group, PersistenceError> {
        let mut users = self.users.lock().await;
        let record = record_mut(&mut users, user)?;
        require_params(&[name])?;
        let index = record
            .groups
            .iter()
            .position(|group| group.name == name)
            .ok_or_else(|| PersistenceError::not_found(GROUP_NOT_FOUND))?;
        Ok(record.groups.remove(index))
    }

    async fn add_game_to_group(
        &self,
        user: &UserToken,
        group_name: &str,
        game: &GameDetails,
    ) -> Result<Game, PersistenceError> {
        let mut users = self.users.lock().await;
        let record = record_mut(&mut users, user)?;
        require_params(&[group_name, game.id.as_str()])?;
        let group = record.group_mut(group_name)?;
        if group.contains_game(&game.game_id()) {
            return Err(PersistenceError::conflict(GAME_EXISTS));
        }
        let game = Game::from_details(group.id.clone(), game);
        group.games.push(game.clone());
        Ok(game)
    }

    async fn remove_game_from_group(
        &self,
        user: &UserToken,
        group_name: &str,
        game_id: &GameId,
    ) -> Result<Game, PersistenceError> {
        let mut users = self.users.lock().await;
        let record = record_mut(&mut users, user)?;
        require_params(&[group_name, game_id.as_str()])?;
        let group = record.group_mut(group_name)?;
        let index = group
            .games
            .iter()
            .position(|game| &game.id == game_id)
            .ok_or_else(|| PersistenceError::not_found(GAME_NOT_FOUND))?;
        Ok(group.games.remove(index))
    }
}
