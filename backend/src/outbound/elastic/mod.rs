//! Elasticsearch-compatible document store adapter.
//!
//! Users, groups, and games live in the `users`, `groups`, and `games`
//! indices. Lookups are equality filters; "not found" is an empty hit list.

mod dto;
mod http_gateway;

pub use http_gateway::ElasticPersistence;
