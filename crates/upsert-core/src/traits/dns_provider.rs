// # DNS Provider Client Trait
//
// Defines the capability the workflow needs from a DNS provider: apply one
// record mutation and report what the provider did with it.
//
// ## Implementations
//
// - Route 53: `upsert-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use upsert_core::{DnsProviderClient, RecordMutationBuilder, UpdateTarget};
//
// async fn upsert(provider: &dyn DnsProviderClient) -> upsert_core::Result<()> {
//     let target = UpdateTarget::new("Z1N0R6CQ9D3SXO", "home.example.org");
//     let request = RecordMutationBuilder::build("203.0.113.7", &target);
//
//     let change = provider.mutate_record(&request).await?;
//     println!("submitted change {}", change.id);
//     Ok(())
// }
// ```

use crate::mutation::RecordMutationRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What the provider reports after accepting a mutation
///
/// Opaque to the workflow apart from logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeDescriptor {
    /// Provider-assigned change id
    pub id: String,
    /// Provider-reported change status (e.g. "PENDING", "INSYNC")
    pub status: String,
    /// When the provider accepted the change, if reported
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ChangeDescriptor {
    /// Create a descriptor without a submission time
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            submitted_at: None,
        }
    }

    /// Attach the submission time
    pub fn with_submitted_at(mut self, submitted_at: DateTime<Utc>) -> Self {
        self.submitted_at = Some(submitted_at);
        self
    }
}

/// Trait for DNS provider adapters
///
/// # Contract
///
/// - One call to [`mutate_record`](DnsProviderClient::mutate_record) is one
///   remote mutation attempt. Adapters do not retry, back off, or cache.
/// - Failures are classified into the core taxonomy:
///   [`Error::Transport`](crate::Error::Transport) when the provider could
///   not be reached, [`Error::Timeout`](crate::Error::Timeout) when the call
///   ran out of time, and
///   [`Error::ProviderRejected`](crate::Error::ProviderRejected) when the
///   provider refused the change. The rejection message should carry the
///   provider's own diagnostic text.
/// - Credentials never appear in logs or error messages.
#[async_trait]
pub trait DnsProviderClient: Send + Sync {
    /// Apply a record mutation
    ///
    /// # Returns
    ///
    /// - `Ok(ChangeDescriptor)`: The provider accepted the change
    /// - `Err(Error)`: The mutation was not applied (or its fate is unknown)
    async fn mutate_record(
        &self,
        request: &RecordMutationRequest,
    ) -> Result<ChangeDescriptor, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing provider clients from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProviderClient instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProviderClient>, crate::Error>;
}
