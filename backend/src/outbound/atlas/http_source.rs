//! Reqwest-backed Board Game Atlas catalog adapter.
//!
//! This adapter owns transport details only: query building, status mapping,
//! JSON decoding, and markup/tag cleanup of the returned games.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::dto::{
    CategoriesResponseDto, GameDto, MechanicsResponseDto, SearchResponseDto, ThrottledDto,
};
use super::lookup::LookupTable;
use crate::domain::ports::messages::GAME_NOT_FOUND;
use crate::domain::ports::{CatalogError, CatalogGateway};
use crate::domain::{GameDetails, GameId};

const SEARCH_PATH: &str = "search";
const MECHANICS_PATH: &str = "game/mechanics";
const CATEGORIES_PATH: &str = "game/categories";
const THROTTLED_FALLBACK: &str = "Too many requests";

type QueryParams = Vec<(&'static str, String)>;

/// Catalog adapter issuing GET requests against the Atlas API.
pub struct AtlasCatalog {
    client: Client,
    base: Url,
    client_id: String,
    mechanics: LookupTable,
    categories: LookupTable,
}

impl AtlasCatalog {
    /// Build an adapter for the API rooted at `base`.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        client_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            client_id: client_id.into(),
            mechanics: LookupTable::default(),
            categories: LookupTable::default(),
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, CatalogError> {
        let url = build_url(&self.base, path, &self.client_id, params)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| CatalogError::transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| CatalogError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        serde_json::from_slice(&body).map_err(|err| CatalogError::decode(err.to_string()))
    }

    async fn search(&self, params: QueryParams) -> Result<Vec<GameDetails>, CatalogError> {
        let response: SearchResponseDto = self.fetch(SEARCH_PATH, &params).await?;
        Ok(self.resolve(response.games).await)
    }

    async fn refresh_mechanics(&self) {
        match self.fetch::<MechanicsResponseDto>(MECHANICS_PATH, &[]).await {
            Ok(response) => {
                self.mechanics
                    .merge(response.mechanics.into_iter().map(|tag| (tag.id, tag.name)))
                    .await;
            }
            Err(error) => warn!(%error, "mechanics lookup refresh failed"),
        }
    }

    async fn refresh_categories(&self) {
        match self.fetch::<CategoriesResponseDto>(CATEGORIES_PATH, &[]).await {
            Ok(response) => {
                self.categories
                    .merge(response.categories.into_iter().map(|tag| (tag.id, tag.name)))
                    .await;
            }
            Err(error) => warn!(%error, "categories lookup refresh failed"),
        }
    }

    /// Name every tag, refreshing each table at most once per response.
    async fn resolve(&self, games: Vec<GameDto>) -> Vec<GameDetails> {
        if self
            .mechanics
            .is_missing_any(games.iter().flat_map(GameDto::mechanic_ids))
            .await
        {
            self.refresh_mechanics().await;
        }
        if self
            .categories
            .is_missing_any(games.iter().flat_map(GameDto::category_ids))
            .await
        {
            self.refresh_categories().await;
        }
        let mechanics = self.mechanics.snapshot().await;
        let categories = self.categories.snapshot().await;
        games
            .into_iter()
            .map(|game| {
                game.into_domain(
                    |id| mechanics.get(id).cloned().unwrap_or_default(),
                    |id| categories.get(id).cloned().unwrap_or_default(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl CatalogGateway for AtlasCatalog {
    async fn games_by_rank(&self, limit: u32) -> Result<Vec<GameDetails>, CatalogError> {
        self.search(rank_query(limit)).await
    }

    async fn games_starting_with(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<GameDetails>, CatalogError> {
        let games = self.search(prefix_query(name, limit)).await?;
        Ok(keep_prefixed(games, name, limit))
    }

    async fn games_containing(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<GameDetails>, CatalogError> {
        self.search(contains_query(name, limit)).await
    }

    async fn game_with_exact_name(
        &self,
        name: &str,
    ) -> Result<Option<GameDetails>, CatalogError> {
        Ok(self.search(exact_query(name)).await?.into_iter().next())
    }

    async fn game_details(&self, id: &GameId) -> Result<GameDetails, CatalogError> {
        self.search(details_query(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::not_found(GAME_NOT_FOUND))
    }
}

fn rank_query(limit: u32) -> QueryParams {
    vec![("limit", limit.to_string()), ("order_by", "rank".to_owned())]
}

fn prefix_query(name: &str, limit: u32) -> QueryParams {
    vec![("name", name.to_owned()), ("limit", limit.to_string())]
}

fn contains_query(name: &str, limit: u32) -> QueryParams {
    vec![
        ("name", name.to_owned()),
        ("fuzzy_match", "true".to_owned()),
        ("limit", limit.to_string()),
    ]
}

fn exact_query(name: &str) -> QueryParams {
    vec![
        ("name", name.to_owned()),
        ("exact", "true".to_owned()),
        ("limit", "1".to_owned()),
    ]
}

fn details_query(id: &GameId) -> QueryParams {
    vec![("ids", id.as_str().to_owned())]
}

/// The API matches names loosely; enforce a literal, case-insensitive prefix.
fn keep_prefixed(games: Vec<GameDetails>, prefix: &str, limit: u32) -> Vec<GameDetails> {
    let prefix = prefix.to_lowercase();
    games
        .into_iter()
        .filter(|game| game.name.to_lowercase().starts_with(&prefix))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect()
}

fn build_url(
    base: &Url,
    path: &str,
    client_id: &str,
    params: &[(&'static str, String)],
) -> Result<Url, CatalogError> {
    let mut url = base
        .join(path)
        .map_err(|err| CatalogError::upstream(format!("invalid catalog path {path}: {err}")))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("client_id", client_id);
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}

fn map_status_error(status: StatusCode, body: &[u8]) -> CatalogError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let message = serde_json::from_slice::<ThrottledDto>(body)
            .ok()
            .and_then(|dto| dto.message)
            .unwrap_or_else(|| THROTTLED_FALLBACK.to_owned());
        return CatalogError::rate_limited(message);
    }
    CatalogError::upstream(format!("status {}", status.as_u16()))
}
