//! Domain model, ports, and services.
//!
//! Purpose: hold the BOrga entities and use cases independent of any
//! transport or storage. Adapters depend on this module, never the reverse.
//!
//! Public surface:
//! - entities: [`User`], [`Group`], [`Game`], [`GameDetails`]
//! - errors: [`Error`] classified by [`ErrorCode`]
//! - services: [`UserService`], [`GroupService`], [`CatalogService`]

pub mod catalog_service;
pub mod error;
pub mod game;
pub mod group;
pub mod group_service;
pub mod password;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::catalog_service::{CatalogService, DEFAULT_SEARCH_LIMIT, NameMatch};
pub use self::error::{Error, ErrorCode};
pub use self::game::{Game, GameDetails, GameId, GameTag};
pub use self::group::{Group, GroupId};
pub use self::group_service::GroupService;
pub use self::password::{hash_password, verify_password};
pub use self::trace_id::TraceId;
pub use self::user::{User, UserToken};
pub use self::user_service::UserService;

/// HTTP header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
