//! Eat What Now backend.
//!
//! Restaurant discovery API with a daily rotating feed. The crate follows a
//! hexagonal layout:
//!
//! - [`domain`]: entities, ports, services, and the scheduled jobs.
//! - [`inbound`]: actix-web handlers translating HTTP to driving ports.
//! - [`outbound`]: Diesel repositories, the Google Places client, and the
//!   credential adapters.
//! - [`server`]: configuration loading and wiring.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
