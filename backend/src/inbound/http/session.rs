//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so website handlers only persist, read, or clear
//! the logged-in user's token.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserToken};

pub(crate) const USER_TOKEN_KEY: &str = "user_token";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the logged-in user's token in the session cookie.
    pub fn persist_user(&self, token: &UserToken) -> Result<(), Error> {
        self.0
            .insert(USER_TOKEN_KEY, token.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The token stored in the session, if any.
    ///
    /// An unreadable value is treated as "not logged in".
    pub fn user_token(&self) -> Option<UserToken> {
        match self.0.get::<String>(USER_TOKEN_KEY) {
            Ok(token) => token.map(UserToken::new).filter(|token| !token.is_blank()),
            Err(error) => {
                warn!(%error, "unreadable user token in session cookie");
                None
            }
        }
    }

    /// Forget the logged-in user.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
