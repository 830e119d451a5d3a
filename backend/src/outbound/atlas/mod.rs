//! Board Game Atlas catalog adapter.
//!
//! Provides the HTTP implementation of the `CatalogGateway` port plus the
//! cached mechanic/category name tables it depends on.

mod dto;
mod http_source;
mod lookup;

pub use http_source::AtlasCatalog;
