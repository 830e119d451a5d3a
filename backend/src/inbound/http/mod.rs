//! HTTP inbound adapter: the JSON API under `/api` and the website routes.

use actix_web::web;

use crate::domain::Error;

pub mod auth;
pub mod error;
pub mod games;
pub mod groups;
pub mod session;
pub mod site;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// Register every route: the JSON API under `/api` and the website at the
/// root. Malformed bodies and query strings answer with the usual
/// `{"message"}` 400 instead of Actix's plain-text default.
///
/// The website routes need a session middleware around the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(err.to_string()).into()
    }))
    .service(web::scope("/api").configure(configure_api))
    .configure(site::configure);
}

/// Register the JSON API handlers. Mount under `/api`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::create_user)
        .service(users::current_user)
        .service(users::delete_user)
        .service(users::version)
        .service(groups::list_groups)
        .service(groups::create_group)
        .service(groups::get_group)
        .service(groups::edit_group)
        .service(groups::delete_group)
        .service(groups::add_game)
        .service(groups::remove_game)
        .service(games::search_games)
        .service(games::game_details);
}
