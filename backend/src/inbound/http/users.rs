//! Account endpoints of the JSON API.
//!
//! ```text
//! PUT /api/users {"name":"alice","password":"s3cret"}
//! GET /api/users
//! DELETE /api/users
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{User, UserToken};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;

/// Name and password supplied on signup or login.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsRequest {
    pub name: String,
    pub password: String,
}

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserView {
    pub token: UserToken,
    pub name: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            token: user.token,
            name: user.name,
        }
    }
}

/// Acknowledgement body for operations without a resource to return.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a user and return its bearer token.
#[put("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let CredentialsRequest { name, password } = payload.into_inner();
    let user = state.users.create_user(&name, &password).await?;
    Ok(HttpResponse::Created().json(UserView::from(user)))
}

/// The authenticated user.
#[get("/users")]
pub async fn current_user(AuthenticatedUser(user): AuthenticatedUser) -> web::Json<UserView> {
    web::Json(user.into())
}

/// Delete the authenticated user and everything they own.
#[delete("/users")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<web::Json<MessageResponse>> {
    state.users.delete_user_by_token(&user.token).await?;
    Ok(web::Json(MessageResponse {
        message: format!("User {} deleted.", user.name),
    }))
}

/// Build name and version of the running server.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub name: &'static str,
    pub version: &'static str,
}

/// Package name and version, unauthenticated.
#[get("/version")]
pub async fn version() -> web::Json<VersionResponse> {
    web::Json(VersionResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
