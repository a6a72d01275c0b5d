//! Doctor appointment booking backend.
//!
//! Layout follows a hexagonal split: [`domain`] holds the clinic model and
//! services behind ports, [`inbound`] adapts HTTP onto the driving ports,
//! and [`outbound`] implements the repositories (PostgreSQL via Diesel, or
//! an in-memory store) and password hashing.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
