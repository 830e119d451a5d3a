//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` so they depend on the service
//! layer only and stay testable over in-memory gateways.

use std::sync::Arc;

use crate::domain::ports::{CatalogGateway, PersistenceGateway};
use crate::domain::{CatalogService, GroupService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Signup, login, and token resolution.
    pub users: Arc<UserService>,
    /// Group and game management.
    pub groups: Arc<GroupService>,
    /// Catalog search passthrough.
    pub catalog: Arc<CatalogService>,
}

impl HttpState {
    /// Wire the services over the two driven ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use borga::domain::ports::FixtureCatalogGateway;
    /// use borga::inbound::http::state::HttpState;
    /// use borga::outbound::memory::MemoryPersistence;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(MemoryPersistence::new()),
    ///     Arc::new(FixtureCatalogGateway::default()),
    /// );
    /// let _users = state.users.clone();
    /// ```
    pub fn new(
        persistence: Arc<dyn PersistenceGateway>,
        catalog: Arc<dyn CatalogGateway>,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(persistence.clone())),
            groups: Arc::new(GroupService::new(persistence, catalog.clone())),
            catalog: Arc::new(CatalogService::new(catalog)),
        }
    }
}
