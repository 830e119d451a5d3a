//! Catalog passthrough use cases.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::ports::{CatalogGateway, PersistenceError};
use crate::domain::{Error, GameDetails, GameId};

/// Result count used when a name search gives no limit.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// How a name search compares game names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameMatch {
    /// Loose match anywhere in the name.
    #[default]
    Contains,
    /// Literal, case-insensitive prefix.
    Prefix,
    /// The whole name, exactly. Yields at most one game.
    Exact,
}

/// Thin service over the catalog gateway.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogGateway>,
}

impl CatalogService {
    /// Create a service over `catalog`.
    pub fn new(catalog: Arc<dyn CatalogGateway>) -> Self {
        Self { catalog }
    }

    /// Full record for one game.
    pub async fn game_details(&self, id: &GameId) -> Result<GameDetails, Error> {
        Ok(self.catalog.game_details(id).await?)
    }

    /// Games whose name loosely contains `name`, at most `limit` (default 10).
    pub async fn games_from_name(
        &self,
        name: &str,
        limit: Option<u32>,
    ) -> Result<Vec<GameDetails>, Error> {
        self.search_by_name(name, NameMatch::Contains, limit).await
    }

    /// Name search under an explicit [`NameMatch`] mode.
    ///
    /// # Errors
    /// `InvalidRequest` for a blank name; catalog failures map through
    /// [`Error`].
    pub async fn search_by_name(
        &self,
        name: &str,
        mode: NameMatch,
        limit: Option<u32>,
    ) -> Result<Vec<GameDetails>, Error> {
        if name.trim().is_empty() {
            return Err(PersistenceError::MissingParameter.into());
        }
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let games = match mode {
            NameMatch::Contains => self.catalog.games_containing(name, limit).await?,
            NameMatch::Prefix => self.catalog.games_starting_with(name, limit).await?,
            NameMatch::Exact => self
                .catalog
                .game_with_exact_name(name)
                .await?
                .into_iter()
                .collect(),
        };
        Ok(games)
    }

    /// Top games by catalog rank.
    pub async fn games_by_rank(&self, limit: Option<u32>) -> Result<Vec<GameDetails>, Error> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        Ok(self.catalog.games_by_rank(limit).await?)
    }
}
