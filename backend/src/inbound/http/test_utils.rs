//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::web;
use std::sync::Arc;

use crate::domain::UserToken;
use crate::domain::ports::FixtureCatalogGateway;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryPersistence;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by a response.
///
/// # Panics
/// Panics when the response did not set a session cookie.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Handler state over in-memory persistence and the fixture catalog.
pub fn memory_state() -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(MemoryPersistence::new()),
        Arc::new(FixtureCatalogGateway::default()),
    ))
}

/// Register `name` with password `pw` and return the bearer token.
///
/// # Panics
/// Panics when signup fails.
pub async fn signed_up(state: &web::Data<HttpState>, name: &str) -> UserToken {
    state
        .users
        .create_user(name, "pw")
        .await
        .expect("signup succeeds")
        .token
}
