//! BOrga backend library: domain, adapters, and HTTP surface.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use middleware::Trace;
