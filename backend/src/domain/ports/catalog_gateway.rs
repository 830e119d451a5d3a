//! Driven port for the external board game catalog.
//!
//! Adapters return [`GameDetails`] with descriptions already stripped of
//! markup and mechanic/category ids resolved to display names.

use async_trait::async_trait;

use crate::domain::{GameDetails, GameId, GameTag};

use super::persistence_gateway::messages::GAME_NOT_FOUND;

/// Errors surfaced while calling the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The catalog throttled the request (HTTP 429).
    #[error("{message}")]
    RateLimited { message: String },
    /// No game matches the requested id.
    #[error("{message}")]
    NotFound { message: String },
    /// The request never produced a response.
    #[error("catalog transport failed: {message}")]
    Transport { message: String },
    /// The catalog answered with an unexpected status.
    #[error("catalog request failed: {message}")]
    Upstream { message: String },
    /// The catalog response could not be decoded.
    #[error("catalog response decode failed: {message}")]
    Decode { message: String },
}

impl CatalogError {
    /// Build a [`CatalogError::RateLimited`].
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Build a [`CatalogError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Build a [`CatalogError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a [`CatalogError::Upstream`].
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Build a [`CatalogError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Read-only access to the game catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Top `limit` games ordered by catalog rank.
    async fn games_by_rank(&self, limit: u32) -> Result<Vec<GameDetails>, CatalogError>;

    /// At most `limit` games whose name starts with `name`, ignoring case.
    async fn games_starting_with(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<GameDetails>, CatalogError>;

    /// At most `limit` games whose name loosely contains `name`.
    async fn games_containing(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<GameDetails>, CatalogError>;

    /// The game named exactly `name`, if any.
    async fn game_with_exact_name(&self, name: &str)
    -> Result<Option<GameDetails>, CatalogError>;

    /// Full record for one game id.
    async fn game_details(&self, id: &GameId) -> Result<GameDetails, CatalogError>;
}

/// Deterministic in-process catalog.
///
/// Used by tests and by local runs that should not reach the network.
#[derive(Debug, Clone)]
pub struct FixtureCatalogGateway {
    games: Vec<GameDetails>,
}

impl FixtureCatalogGateway {
    /// Catalog serving exactly `games`.
    #[must_use]
    pub fn new(games: Vec<GameDetails>) -> Self {
        Self { games }
    }

    fn take(&self, limit: u32, keep: impl Fn(&GameDetails) -> bool) -> Vec<GameDetails> {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        self.games
            .iter()
            .filter(|game| keep(game))
            .take(limit)
            .cloned()
            .collect()
    }
}

impl Default for FixtureCatalogGateway {
    fn default() -> Self {
        let tag = |id: &str, name: &str| GameTag {
            id: id.to_owned(),
            name: name.to_owned(),
        };
        let game = |id: &str, name: &str, rank: u32, mechanics: Vec<GameTag>| GameDetails {
            id: id.to_owned(),
            name: name.to_owned(),
            description: format!("{name} is a board game."),
            mechanics,
            categories: vec![tag("eX8uuNlQkQ", "Strategy")],
            thumb_url: Some(format!("https://images.example/{id}-thumb.png")),
            rank: Some(rank),
            ..GameDetails::default()
        };
        Self::new(vec![
            game("TAAifFP590", "Root", 1, vec![tag("n1GtBt35Rd", "Area Control")]),
            game("RLlDWHh7hR", "Gloomhaven", 2, vec![tag("05zCZoLvQJ", "Cooperative")]),
            game("i5Oqu5VZgP", "Azul", 3, vec![tag("WPytek5P8l", "Tile Placement")]),
            game("kPDxpJZ8PD", "War Chest", 4, vec![tag("n1GtBt35Rd", "Area Control")]),
            game("5H5JS0KLzK", "Wingspan", 5, vec![tag("8PN2HE86wg", "Engine Building")]),
            game("OIXt3DmJU0", "Warhammer Underworlds", 6, Vec::new()),
            game("8xos44jY7Q", "Star Wars: Rebellion", 7, Vec::new()),
            game("yqR4PtpO8X", "Wartime", 8, Vec::new()),
            game("fDn9rQjH9O", "War of the Ring", 9, Vec::new()),
            game("VNBC6yq1WO", "Warfighter", 10, Vec::new()),
        ])
    }
}

#[async_trait]
impl CatalogGateway for FixtureCatalogGateway {
    async fn games_by_rank(&self, limit: u32) -> Result<Vec<GameDetails>, CatalogError> {
        let mut ranked = self.take(u32::MAX, |_| true);
        ranked.sort_by_key(|game| game.rank.unwrap_or(u32::MAX));
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ranked)
    }

    async fn games_starting_with(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<GameDetails>, CatalogError> {
        let prefix = name.to_lowercase();
        Ok(self.take(limit, |game| game.name.to_lowercase().starts_with(&prefix)))
    }

    async fn games_containing(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<GameDetails>, CatalogError> {
        let needle = name.to_lowercase();
        Ok(self.take(limit, |game| game.name.to_lowercase().contains(&needle)))
    }

    async fn game_with_exact_name(
        &self,
        name: &str,
    ) -> Result<Option<GameDetails>, CatalogError> {
        Ok(self.games.iter().find(|game| game.name == name).cloned())
    }

    async fn game_details(&self, id: &GameId) -> Result<GameDetails, CatalogError> {
        self.games
            .iter()
            .find(|game| game.id == id.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::not_found(GAME_NOT_FOUND))
    }
}
