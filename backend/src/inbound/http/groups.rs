//! Group and group-game endpoints of the JSON API.
//!
//! Every route under `/groups/{group_name}` checks ownership before acting,
//! so a foreign or unknown group answers 401 rather than 404.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Game, GameId, Group};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;

/// Body of group creation and edits.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupRequest {
    pub name: String,
    pub description: String,
}

/// Body naming the catalog game to add.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AddGameRequest {
    pub id: String,
}

#[get("/groups")]
pub async fn list_groups(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<web::Json<Vec<Group>>> {
    Ok(web::Json(state.groups.groups(&user.token).await?))
}

#[post("/groups")]
pub async fn create_group(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    payload: web::Json<GroupRequest>,
) -> ApiResult<HttpResponse> {
    let group = state
        .groups
        .create_group(&user.token, &payload.name, &payload.description)
        .await?;
    Ok(HttpResponse::Created().json(group))
}

#[get("/groups/{group_name}")]
pub async fn get_group(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Group>> {
    let name = path.into_inner();
    state.groups.authorize_group(&user.token, &name).await?;
    Ok(web::Json(state.groups.group(&user.token, &name).await?))
}

#[put("/groups/{group_name}")]
pub async fn edit_group(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<GroupRequest>,
) -> ApiResult<web::Json<Group>> {
    let name = path.into_inner();
    state.groups.authorize_group(&user.token, &name).await?;
    let group = state
        .groups
        .edit_group(&user.token, &name, &payload.name, &payload.description)
        .await?;
    Ok(web::Json(group))
}

#[delete("/groups/{group_name}")]
pub async fn delete_group(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Group>> {
    let name = path.into_inner();
    state.groups.authorize_group(&user.token, &name).await?;
    Ok(web::Json(state.groups.delete_group(&user.token, &name).await?))
}

/// Add a catalog game to the group. Only the game id is supplied.
#[post("/groups/{group_name}/games")]
pub async fn add_game(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<AddGameRequest>,
) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    state.groups.authorize_group(&user.token, &name).await?;
    let game_id = GameId::new(payload.into_inner().id);
    let game: Game = state
        .groups
        .add_game(&user.token, &name, &game_id)
        .await?;
    Ok(HttpResponse::Created().json(game))
}

#[delete("/groups/{group_name}/games/{game_id}")]
pub async fn remove_game(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Game>> {
    let (name, game_id) = path.into_inner();
    state.groups.authorize_group(&user.token, &name).await?;
    let game = state
        .groups
        .remove_game(&user.token, &name, &GameId::new(game_id))
        .await?;
    Ok(web::Json(game))
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
