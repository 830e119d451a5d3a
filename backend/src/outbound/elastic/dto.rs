//! Documents and response envelopes exchanged with the document store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::{Game, GameDetails, GameId, Group, GroupId, User, UserToken};

/// Hits returned per search. The store defaults to ten otherwise.
const SEARCH_SIZE: u32 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct UserDocument {
    pub(super) token: String,
    pub(super) name: String,
    pub(super) password_hash: String,
}

impl UserDocument {
    pub(super) fn into_domain(self) -> User {
        User {
            token: UserToken::new(self.token),
            name: self.name,
            password_hash: self.password_hash,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct GroupDocument {
    pub(super) owner: String,
    pub(super) name: String,
    #[serde(default)]
    pub(super) description: String,
}

impl GroupDocument {
    pub(super) fn into_domain(self, id: String, games: Vec<Game>) -> Group {
        Group {
            id: GroupId::new(id),
            owner: UserToken::new(self.owner),
            name: self.name,
            description: self.description,
            games,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct GameDocument {
    #[serde(rename = "groupId")]
    pub(super) group_id: String,
    pub(super) id: String,
    pub(super) name: String,
    #[serde(default)]
    pub(super) description: String,
    #[serde(default)]
    pub(super) mechanics: Vec<String>,
    #[serde(default)]
    pub(super) categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) img_url: Option<String>,
}

impl GameDocument {
    pub(super) fn from_details(group_id: &GroupId, details: &GameDetails) -> Self {
        Self::from(Game::from_details(group_id.clone(), details))
    }

    pub(super) fn into_domain(self) -> Game {
        Game {
            group_id: GroupId::new(self.group_id),
            id: GameId::new(self.id),
            name: self.name,
            description: self.description,
            mechanics: self.mechanics,
            categories: self.categories,
            image_url: self.img_url,
        }
    }
}

impl From<Game> for GameDocument {
    fn from(game: Game) -> Self {
        Self {
            group_id: game.group_id.as_str().to_owned(),
            id: game.id.as_str().to_owned(),
            name: game.name,
            description: game.description,
            mechanics: game.mechanics,
            categories: game.categories,
            img_url: game.image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponseDto<T> {
    pub(super) hits: HitsDto<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HitsDto<T> {
    #[serde(default = "Vec::new")]
    pub(super) hits: Vec<HitDto<T>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HitDto<T> {
    #[serde(rename = "_id")]
    pub(super) id: String,
    #[serde(rename = "_source")]
    pub(super) source: T,
}

#[derive(Debug, Deserialize)]
pub(super) struct IndexResponseDto {
    #[serde(rename = "_id")]
    pub(super) id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteByQueryResponseDto {
    #[serde(default)]
    pub(super) deleted: u64,
}

/// Build a `bool` query of exact `term` filters on keyword sub-fields.
pub(super) fn term_filters(filters: &[(&str, &str)]) -> Value {
    let terms: Vec<Value> = filters
        .iter()
        .map(|(field, value)| {
            let mut term = Map::new();
            term.insert(format!("{field}.keyword"), Value::from(*value));
            json!({ "term": term })
        })
        .collect();
    json!({ "bool": { "filter": terms } })
}

/// Search request body for [`term_filters`].
pub(super) fn search_body(filters: &[(&str, &str)]) -> Value {
    json!({ "size": SEARCH_SIZE, "query": term_filters(filters) })
}

/// Delete-by-query request body for [`term_filters`].
pub(super) fn delete_by_query_body(filters: &[(&str, &str)]) -> Value {
    json!({ "query": term_filters(filters) })
}
