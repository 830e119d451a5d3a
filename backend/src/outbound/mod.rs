//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local persistence for tests and single-node runs
//! - **elastic**: Elasticsearch-compatible document store persistence
//! - **atlas**: Board Game Atlas catalog client
//!
//! Adapters translate between domain types and wire representations. They
//! contain no business logic.

pub mod atlas;
pub mod elastic;
pub mod memory;
