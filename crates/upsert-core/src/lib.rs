// # upsert-core
//
// Core library for the caller-address DNS upsert service.
//
// One inbound request carries the caller's apparent address; the service
// writes that address into the A record of a fixed hostname and tells the
// caller how it went.
//
// ## Architecture Overview
//
// - **RecordMutationBuilder**: Pure construction of the DNS change request
// - **DnsProviderClient**: Trait for applying the change via a provider API
// - **UpdateWorkflow**: Orchestrates trigger → mutation → provider call
// - **ResponseMapper**: Maps the outcome to the HTTP-shaped response
// - **ProviderRegistry**: Plugin-based registry for provider clients
//
// ## Design Principles
//
// 1. **Stateless**: Nothing survives an invocation
// 2. **Single-shot**: Exactly one provider call per accepted trigger, no retries
// 3. **Fail closed**: Every failure becomes a structured 500 response
// 4. **Library-First**: The daemon is a thin front end over this crate

pub mod config;
pub mod error;
pub mod mutation;
pub mod registry;
pub mod response;
pub mod traits;
pub mod trigger;
pub mod workflow;

// Re-export core types for convenience
pub use config::{AddressPolicy, ProviderConfig, UpdateTarget, UpdaterConfig, WorkflowConfig};
pub use error::{Error, FailureKind, Result};
pub use mutation::{ChangeAction, RecordMutationBuilder, RecordMutationRequest, RecordType};
pub use registry::ProviderRegistry;
pub use response::{MutationOutcome, Response, ResponseMapper};
pub use traits::{ChangeDescriptor, DnsProviderClient, DnsProviderFactory};
pub use trigger::Trigger;
pub use workflow::{UpdateWorkflow, WorkflowEvent, WorkflowState};
