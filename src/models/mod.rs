//! Model layer
//!
//! Rust types for the custom resources the agent reads.
//!
//! Structure:
//! - `hub.rs` - Access control policies and API management resources
//! - `external_dns.rs` - ExternalDNS `DNSEndpoint`
//! - `resource_kind.rs` - Kind enum shared by listing and logging

pub mod external_dns;
pub mod hub;
mod resource_kind;

pub use resource_kind::ResourceKind;
