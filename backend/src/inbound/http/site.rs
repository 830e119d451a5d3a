//! Website surface.
//!
//! Pages answer with a JSON view model tagged by `view` for a renderer to
//! consume. Mutations redirect with `303 See Other`. A logged-in browser is
//! tracked by the session cookie and also receives the bearer cookie so the
//! page scripts can call the JSON API directly.

use actix_web::cookie::Cookie;
use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use url::Url;

use crate::domain::{GameDetails, GameId, Group};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{SiteUser, auth_cookie, clear_auth_cookie};
use crate::inbound::http::games::SearchQuery;
use crate::inbound::http::groups::{AddGameRequest, GroupRequest};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{CredentialsRequest, UserView};

/// View model handed to the page renderer.
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum Page {
    /// Landing page with the login and signup forms.
    Index,
    /// The user's groups.
    Groups {
        user: UserView,
        groups: Vec<Group>,
    },
    /// One group and its games.
    Group {
        group: Group,
    },
    /// Catalog results offered for adding to `group_name`.
    Games {
        #[serde(rename = "groupName")]
        group_name: String,
        games: Vec<GameDetails>,
    },
}

/// Register the website routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/login", web::post().to(login))
        .route("/logout", web::post().to(logout))
        .route("/logout", web::delete().to(logout))
        .route("/users", web::put().to(sign_up))
        .route("/users", web::delete().to(delete_account))
        .route("/groups", web::get().to(groups_page))
        .route("/groups", web::post().to(create_group))
        .route("/groups/{group_name}", web::get().to(group_page))
        .route("/groups/{group_name}", web::put().to(edit_group))
        .route("/groups/{group_name}", web::delete().to(delete_group))
        .route("/groups/{group_name}/games", web::get().to(search_games))
        .route("/groups/{group_name}/games", web::post().to(add_game))
        .route(
            "/groups/{group_name}/games/{game_id}",
            web::delete().to(remove_game),
        )
        .route("/groups/{group_name}/game/{game_id}", web::get().to(game_page));
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location.to_owned()))
        .finish()
}

fn see_other_with_cookie(location: &str, cookie: Cookie<'static>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location.to_owned()))
        .cookie(cookie)
        .finish()
}

/// Percent-encoded path of a group page.
fn group_location(name: &str) -> String {
    let Ok(mut url) = Url::parse("http://site/groups") else {
        return format!("/groups/{name}");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(name);
    }
    url.path().to_owned()
}

async fn index() -> web::Json<Page> {
    web::Json(Page::Index)
}

async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .login(&payload.name, &payload.password)
        .await?;
    session.persist_user(&user.token)?;
    Ok(see_other_with_cookie("/groups", auth_cookie(&user.token)))
}

async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    see_other_with_cookie("/", clear_auth_cookie())
}

async fn sign_up(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .create_user(&payload.name, &payload.password)
        .await?;
    session.persist_user(&user.token)?;
    Ok(see_other_with_cookie("/groups", auth_cookie(&user.token)))
}

async fn delete_account(
    state: web::Data<HttpState>,
    session: SessionContext,
    SiteUser(user): SiteUser,
) -> ApiResult<HttpResponse> {
    state.users.delete_user_by_token(&user.token).await?;
    session.clear();
    Ok(see_other_with_cookie("/", clear_auth_cookie()))
}

async fn groups_page(
    state: web::Data<HttpState>,
    SiteUser(user): SiteUser,
) -> ApiResult<web::Json<Page>> {
    let groups = state.groups.groups(&user.token).await?;
    Ok(web::Json(Page::Groups {
        user: user.into(),
        groups,
    }))
}

async fn create_group(
    state: web::Data<HttpState>,
    SiteUser(user): SiteUser,
    payload: web::Json<GroupRequest>,
) -> ApiResult<HttpResponse> {
    state
        .groups
        .create_group(&user.token, &payload.name, &payload.description)
        .await?;
    Ok(see_other("/groups"))
}

async fn group_page(
    state: web::Data<HttpState>,
    SiteUser(user): SiteUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Page>> {
    let name = path.into_inner();
    state.groups.authorize_group(&user.token, &name).await?;
    let group = state.groups.group(&user.token, &name).await?;
    Ok(web::Json(Page::Group { group }))
}

async fn edit_group(
    state: web::Data<HttpState>,
    SiteUser(user): SiteUser,
    path: web::Path<String>,
    payload: web::Json<GroupRequest>,
) -> ApiResult<web::Json<Page>> {
    let name = path.into_inner();
    state.groups.authorize_group(&user.token, &name).await?;
    let group = state
        .groups
        .edit_group(&user.token, &name, &payload.name, &payload.description)
        .await?;
    Ok(web::Json(Page::Group { group }))
}

async fn delete_group(
    state: web::Data<HttpState>,
    SiteUser(user): SiteUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Page>> {
    let name = path.into_inner();
    state.groups.authorize_group(&user.token, &name).await?;
    let group = state.groups.delete_group(&user.token, &name).await?;
    Ok(web::Json(Page::Group { group }))
}

async fn search_games(
    state: web::Data<HttpState>,
    SiteUser(user): SiteUser,
    path: web::Path<String>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Page>> {
    let group_name = path.into_inner();
    state.groups.authorize_group(&user.token, &group_name).await?;
    let SearchQuery { name, limit, .. } = query.into_inner();
    let games = state
        .catalog
        .games_from_name(name.as_deref().unwrap_or_default(), limit)
        .await?;
    Ok(web::Json(Page::Games { group_name, games }))
}

async fn add_game(
    state: web::Data<HttpState>,
    SiteUser(user): SiteUser,
    path: web::Path<String>,
    payload: web::Json<AddGameRequest>,
) -> ApiResult<HttpResponse> {
    let group_name = path.into_inner();
    state.groups.authorize_group(&user.token, &group_name).await?;
    state
        .groups
        .add_game(&user.token, &group_name, &GameId::new(payload.into_inner().id))
        .await?;
    Ok(see_other(&group_location(&group_name)))
}

async fn remove_game(
    state: web::Data<HttpState>,
    SiteUser(user): SiteUser,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (group_name, game_id) = path.into_inner();
    state.groups.authorize_group(&user.token, &group_name).await?;
    state
        .groups
        .remove_game(&user.token, &group_name, &GameId::new(game_id))
        .await?;
    Ok(see_other(&group_location(&group_name)))
}

async fn game_page(
    state: web::Data<HttpState>,
    SiteUser(user): SiteUser,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Page>> {
    let (group_name, game_id) = path.into_inner();
    state.groups.authorize_group(&user.token, &group_name).await?;
    let game = state.catalog.game_details(&GameId::new(game_id)).await?;
    Ok(web::Json(Page::Games {
        group_name,
        games: vec![game],
    }))
}

#[cfg(test)]
#[path = "site_tests.rs"]
mod tests;
