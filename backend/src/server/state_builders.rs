//! Builders for the adapters behind HTTP state.

use std::io;
use std::sync::Arc;

use actix_web::web;
use tracing::info;

use borga::domain::ports::{CatalogGateway, FixtureCatalogGateway, PersistenceGateway};
use borga::inbound::http::state::HttpState;
use borga::outbound::atlas::AtlasCatalog;
use borga::outbound::elastic::ElasticPersistence;
use borga::outbound::memory::MemoryPersistence;

use super::config::{AppSettings, CatalogKind, StoreKind};

/// Select and construct the persistence adapter.
///
/// # Errors
/// Fails on an unknown store kind, an invalid URL, or when the HTTP client
/// cannot be built.
pub fn build_persistence(settings: &AppSettings) -> io::Result<Arc<dyn PersistenceGateway>> {
    match settings.store()? {
        StoreKind::Memory => {
            info!(store = "memory", "persistence selected");
            Ok(Arc::new(MemoryPersistence::new()))
        }
        StoreKind::Elastic => {
            let url = settings.elasticsearch_url()?;
            info!(store = "elastic", url = %url, "persistence selected");
            let store = ElasticPersistence::new(url, settings.http_timeout())
                .map_err(|error| io::Error::other(format!("document store client: {error}")))?;
            Ok(Arc::new(store))
        }
    }
}

/// Select and construct the catalog adapter.
///
/// # Errors
/// Fails when the Atlas catalog is selected without a client id, on an
/// invalid base URL, or when the HTTP client cannot be built.
pub fn build_catalog(settings: &AppSettings) -> io::Result<Arc<dyn CatalogGateway>> {
    match settings.catalog()? {
        CatalogKind::Fixture => {
            info!(catalog = "fixture", "catalog selected");
            Ok(Arc::new(FixtureCatalogGateway::default()))
        }
        CatalogKind::Atlas => {
            let base = settings.atlas_base_url()?;
            let client_id = settings.atlas_client_id()?;
            info!(catalog = "atlas", url = %base, "catalog selected");
            let catalog = AtlasCatalog::new(base, client_id, settings.http_timeout())
                .map_err(|error| io::Error::other(format!("atlas client: {error}")))?;
            Ok(Arc::new(catalog))
        }
    }
}

/// Build the shared handler state from settings.
pub fn build_http_state(settings: &AppSettings) -> io::Result<web::Data<HttpState>> {
    let persistence = build_persistence(settings)?;
    let catalog = build_catalog(settings)?;
    Ok(web::Data::new(HttpState::new(persistence, catalog)))
}
