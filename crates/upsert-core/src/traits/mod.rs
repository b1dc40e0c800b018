//! Core traits for the upsert service
//!
//! - [`DnsProviderClient`]: Apply record mutations via a provider API
//! - [`DnsProviderFactory`]: Build provider clients from configuration

pub mod dns_provider;

pub use dns_provider::{ChangeDescriptor, DnsProviderClient, DnsProviderFactory};
