//! User-owned game groups.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Game, GameId, UserToken};

/// Storage identifier assigned by the persistence gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Wrap a storage identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named collection of games owned by one user.
///
/// ## Invariants
/// - `name` is unique among the owner's groups.
/// - game ids are unique within `games`, which keeps insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    #[serde(skip)]
    pub owner: UserToken,
    pub name: String,
    pub description: String,
    pub games: Vec<Game>,
}

impl Group {
    /// Look up a game by id.
    #[must_use]
    pub fn game(&self, id: &GameId) -> Option<&Game> {
        self.games.iter().find(|game| &game.id == id)
    }

    /// Whether a game with `id` is already in the group.
    #[must_use]
    pub fn contains_game(&self, id: &GameId) -> bool {
        self.game(id).is_some()
    }
}
