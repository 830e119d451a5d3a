//! Domain ports.
//!
//! Outbound adapters implement these traits; the service layer depends on
//! them only through `Arc<dyn ...>` handles.

mod catalog_gateway;
mod persistence_gateway;

pub use catalog_gateway::{CatalogError, CatalogGateway, FixtureCatalogGateway};
pub use persistence_gateway::{
    MAX_PARAM_CHARS, PersistenceError, PersistenceGateway, messages, require_params, require_user,
};

#[cfg(test)]
pub use catalog_gateway::MockCatalogGateway;
#[cfg(test)]
pub use persistence_gateway::MockPersistenceGateway;
