//! Board game records.
//!
//! [`GameDetails`] is what the catalog knows about a game; [`Game`] is the
//! snapshot stored inside a group when the game is added.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::GroupId;

/// External catalog identifier of a game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Wrap a catalog identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GameId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A mechanic or category reference resolved to its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTag {
    pub id: String,
    pub name: String,
}

/// Full catalog record for one game.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetails {
    pub id: String,
    pub name: String,
    /// Plain text; markup is stripped by the catalog adapter.
    pub description: String,
    pub mechanics: Vec<GameTag>,
    pub categories: Vec<GameTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_published: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_players: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_players: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl GameDetails {
    /// Identifier as a [`GameId`].
    #[must_use]
    pub fn game_id(&self) -> GameId {
        GameId::new(self.id.clone())
    }
}

/// A game as stored in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub group_id: GroupId,
    pub id: GameId,
    pub name: String,
    pub description: String,
    pub mechanics: Vec<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Game {
    /// Snapshot catalog details into a group entry.
    ///
    /// Tags keep only their display names and the thumbnail is preferred
    /// over the full-size image.
    #[must_use]
    pub fn from_details(group_id: GroupId, details: &GameDetails) -> Self {
        Self {
            group_id,
            id: details.game_id(),
            name: details.name.clone(),
            description: details.description.clone(),
            mechanics: details.mechanics.iter().map(|tag| tag.name.clone()).collect(),
            categories: details.categories.iter().map(|tag| tag.name.clone()).collect(),
            image_url: details
                .thumb_url
                .clone()
                .or_else(|| details.image_url.clone()),
        }
    }
}
