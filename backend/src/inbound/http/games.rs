//! Catalog search endpoints of the JSON API.
//!
//! These do not touch persistence; they require a valid bearer token only so
//! anonymous clients cannot spend the catalog quota.

use actix_web::{get, web};
use serde::Deserialize;

use crate::domain::{GameDetails, GameId, NameMatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;

/// Query string of a catalog search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub limit: Option<u32>,
    /// `contains` (default), `prefix`, or `exact`.
    #[serde(default, rename = "match")]
    pub mode: NameMatch,
}

/// Search by name, or list the top ranked games when no name is given.
#[get("/games")]
pub async fn search_games(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<GameDetails>>> {
    let SearchQuery { name, limit, mode } = query.into_inner();
    let games = match name {
        Some(name) => state.catalog.search_by_name(&name, mode, limit).await?,
        None => state.catalog.games_by_rank(limit).await?,
    };
    Ok(web::Json(games))
}

#[get("/games/{game_id}")]
pub async fn game_details(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<GameDetails>> {
    let id = GameId::new(path.into_inner());
    Ok(web::Json(state.catalog.game_details(&id).await?))
}
