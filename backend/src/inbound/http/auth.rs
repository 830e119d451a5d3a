//! Request authentication for API and website handlers.
//!
//! Bearer tokens are read from the `Authorization` header first, then from
//! the [`AUTH_COOKIE`] cookie. Website requests additionally consult the
//! session before either.

use std::sync::Arc;

use actix_session::SessionExt;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, User, UserToken};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Cookie carrying `Bearer <token>` for browser clients.
pub const AUTH_COOKIE: &str = "BOrgaUserAuthorization";

const BEARER_PREFIXES: [&str; 2] = ["Bearer ", "Bearer%20"];

fn strip_bearer(raw: &str) -> Option<UserToken> {
    let raw = raw.trim();
    BEARER_PREFIXES
        .iter()
        .find_map(|prefix| raw.strip_prefix(prefix))
        .map(|token| UserToken::new(token.trim()))
        .filter(|token| !token.is_blank())
}

/// Bearer token presented by the request, header before cookie.
pub fn bearer_token(req: &HttpRequest) -> Option<UserToken> {
    let from_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(strip_bearer);
    from_header.or_else(|| {
        req.cookie(AUTH_COOKIE)
            .and_then(|cookie| strip_bearer(cookie.value()))
    })
}

/// Cookie handing `token` to a browser after login or signup.
pub fn auth_cookie(token: &UserToken) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, format!("Bearer {token}"))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

/// Expired cookie that removes [`AUTH_COOKIE`] from the browser.
pub fn clear_auth_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(AUTH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

fn http_state(req: &HttpRequest) -> Result<Arc<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .map(|data| data.clone().into_inner())
        .ok_or_else(|| Error::internal("HttpState missing from app data"))
}

/// User resolved from a bearer token. Used by the JSON API.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = http_state(req);
        Box::pin(async move {
            let user = state?.users.authenticate(token.as_ref()).await?;
            Ok(Self(user))
        })
    }
}

/// User resolved from the session, falling back to bearer credentials.
/// Used by the website.
#[derive(Debug, Clone)]
pub struct SiteUser(pub User);

impl FromRequest for SiteUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = SessionContext::new(req.get_session());
        let token = session.user_token().or_else(|| bearer_token(req));
        let state = http_state(req);
        Box::pin(async move {
            let user = state?.users.authenticate(token.as_ref()).await?;
            Ok(Self(user))
        })
    }
}
