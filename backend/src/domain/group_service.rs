//! Group and game use cases.
//!
//! Every operation is scoped to the acting user's token. Adding a game
//! fetches the full record from the catalog first so callers only supply an
//! id.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::messages::GROUP_NOT_FOUND;
use crate::domain::ports::{CatalogGateway, PersistenceError, PersistenceGateway};
use crate::domain::{Error, Game, GameId, Group, UserToken};

const GROUP_NOT_OWNED: &str = "User doesn't have the group requested.";

/// Service orchestrating groups over persistence and the catalog.
#[derive(Clone)]
pub struct GroupService {
    persistence: Arc<dyn PersistenceGateway>,
    catalog: Arc<dyn CatalogGateway>,
}

impl GroupService {
    /// Create a service over the two gateways.
    pub fn new(persistence: Arc<dyn PersistenceGateway>, catalog: Arc<dyn CatalogGateway>) -> Self {
        Self {
            persistence,
            catalog,
        }
    }

    /// All groups owned by `user`.
    pub async fn groups(&self, user: &UserToken) -> Result<Vec<Group>, Error> {
        Ok(self.persistence.list_all_groups(user).await?)
    }

    /// Create an empty group.
    pub async fn create_group(
        &self,
        user: &UserToken,
        name: &str,
        description: &str,
    ) -> Result<Group, Error> {
        let group = self
            .persistence
            .create_group(user, name, description)
            .await?;
        info!(group = %group.name, "group created");
        Ok(group)
    }

    /// Confirm `user` owns `name` and return the group.
    ///
    /// Any lookup failure is reported as `Unauthorized` so callers cannot
    /// discover other users' group names.
    pub async fn authorize_group(&self, user: &UserToken, name: &str) -> Result<Group, Error> {
        match self.persistence.get_group_details(user, name).await {
            Ok(Some(group)) => Ok(group),
            Ok(None) | Err(_) => Err(Error::unauthorized(GROUP_NOT_OWNED)),
        }
    }

    /// One group with its games.
    pub async fn group(&self, user: &UserToken, name: &str) -> Result<Group, Error> {
        self.persistence
            .get_group_details(user, name)
            .await?
            .ok_or_else(|| Error::not_found(GROUP_NOT_FOUND))
    }

    /// Rename and redescribe a group. Its games are kept.
    pub async fn edit_group(
        &self,
        user: &UserToken,
        name: &str,
        new_name: &str,
        description: &str,
    ) -> Result<Group, Error> {
        let group = self
            .persistence
            .edit_group(user, name, new_name, description)
            .await?;
        info!(from = %name, group = %group.name, "group edited");
        Ok(group)
    }

    /// Remove a group and return its final state.
    pub async fn delete_group(&self, user: &UserToken, name: &str) -> Result<Group, Error> {
        let group = self.persistence.delete_group(user, name).await?;
        info!(group = %group.name, "group deleted");
        Ok(group)
    }

    /// Fetch `game_id` from the catalog and add it to the group.
    pub async fn add_game(
        &self,
        user: &UserToken,
        group_name: &str,
        game_id: &GameId,
    ) -> Result<Game, Error> {
        if game_id.as_str().trim().is_empty() {
            return Err(PersistenceError::MissingParameter.into());
        }
        let details = self.catalog.game_details(game_id).await?;
        let game = self
            .persistence
            .add_game_to_group(user, group_name, &details)
            .await?;
        info!(group = %group_name, game_id = %game.id, "game added");
        Ok(game)
    }

    /// Remove a game from a group.
    pub async fn remove_game(
        &self,
        user: &UserToken,
        group_name: &str,
        game_id: &GameId,
    ) -> Result<Game, Error> {
        let game = self
            .persistence
            .remove_game_from_group(user, group_name, game_id)
            .await?;
        info!(group = %group_name, game_id = %game.id, "game removed");
        Ok(game)
    }
}

#[cfg(test)]
#[path = "group_service_tests.rs"]
mod tests;
