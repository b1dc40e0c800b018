//! Update workflow
//!
//! The UpdateWorkflow is responsible for:
//! - Pulling the caller address out of the trigger
//! - Building the record mutation for the configured target
//! - Submitting it to the DnsProviderClient exactly once
//! - Turning the outcome into a caller-visible response
//!
//! ## State machine
//!
//! ```text
//! ┌───────┐     ┌──────────┐     ┌──────────┐     ┌───────────┐
//! │ Start │────▶│ Building │────▶│ Mutating │────▶│ Succeeded │
//! └───────┘     └──────────┘     └──────────┘     └───────────┘
//!     │                               │
//!     │ invalid trigger               │ provider error
//!     ▼                               ▼
//! ┌──────────────────────────────────────────┐
//! │                  Failed                  │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Both terminal states are normal results of [`UpdateWorkflow::handle`].
//! Nothing is retried and nothing is remembered between invocations; two
//! concurrent invocations for the same hostname are serialized by the
//! provider's UPSERT semantics (last writer wins).

use crate::config::{AddressPolicy, UpdateTarget, WorkflowConfig};
use crate::error::{Error, FailureKind, Result};
use crate::mutation::RecordMutationBuilder;
use crate::response::{MutationOutcome, Response, ResponseMapper};
use crate::traits::DnsProviderClient;
use crate::trigger::Trigger;
use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

/// States an invocation passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Trigger received, address not yet checked
    Start,
    /// Building the record mutation
    Building,
    /// Provider call in flight
    Mutating,
    /// Provider accepted the change
    Succeeded,
    /// Invocation ended without an accepted change
    Failed,
}

/// Events emitted by the UpdateWorkflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// Trigger received
    TriggerReceived {
        caller_address: String,
    },

    /// Mutation built for the target
    MutationBuilt {
        record_name: String,
        record_value: String,
    },

    /// Mutation submitted to the provider
    MutationSubmitted {
        provider: &'static str,
        record_name: String,
    },

    /// Provider accepted the change
    Succeeded {
        record_name: String,
        change_id: String,
        status: String,
    },

    /// Invocation failed
    Failed {
        kind: FailureKind,
        error: String,
    },
}

impl WorkflowEvent {
    /// State the workflow entered when this event was emitted
    pub fn state(&self) -> WorkflowState {
        match self {
            WorkflowEvent::TriggerReceived { .. } => WorkflowState::Start,
            WorkflowEvent::MutationBuilt { .. } => WorkflowState::Building,
            WorkflowEvent::MutationSubmitted { .. } => WorkflowState::Mutating,
            WorkflowEvent::Succeeded { .. } => WorkflowState::Succeeded,
            WorkflowEvent::Failed { .. } => WorkflowState::Failed,
        }
    }
}

/// Caller-address DNS update workflow
///
/// ## Lifecycle
///
/// 1. Create with [`UpdateWorkflow::new()`]
/// 2. Call [`UpdateWorkflow::handle()`] once per inbound request
/// 3. Drain the returned event receiver for monitoring (optional)
///
/// ## Threading
///
/// `handle` takes `&self` and holds no mutable state, so one workflow can
/// serve concurrent requests behind an `Arc`.
pub struct UpdateWorkflow {
    /// Zone and hostname kept current
    target: UpdateTarget,

    /// DNS provider for applying the mutation
    provider: Box<dyn DnsProviderClient>,

    /// Caller address validation policy
    address_policy: AddressPolicy,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<WorkflowEvent>,
}

impl UpdateWorkflow {
    /// Create a new workflow
    ///
    /// # Parameters
    ///
    /// - `provider`: DNS provider implementation
    /// - `target`: Zone and hostname to keep current
    /// - `config`: Workflow settings
    ///
    /// # Returns
    ///
    /// A tuple of (workflow, event_receiver) where event_receiver yields workflow events
    pub fn new(
        provider: Box<dyn DnsProviderClient>,
        target: UpdateTarget,
        config: WorkflowConfig,
    ) -> Result<(Self, mpsc::Receiver<WorkflowEvent>)> {
        target.validate()?;
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let workflow = Self {
            target,
            provider,
            address_policy: config.address_policy,
            event_tx: tx,
        };

        Ok((workflow, rx))
    }

    /// The configured target
    pub fn target(&self) -> &UpdateTarget {
        &self.target
    }

    /// Handle one trigger and produce the caller-visible response
    ///
    /// Never fails: every error is folded into a 500 response.
    pub async fn handle(&self, trigger: &Trigger) -> Response {
        let outcome = self.execute(trigger).await;
        ResponseMapper::map(&outcome)
    }

    /// Run one invocation through the state machine
    ///
    /// Makes at most one provider call.
    pub async fn execute(&self, trigger: &Trigger) -> MutationOutcome {
        let caller_address = trigger.caller_address();

        debug!("Body from the request: {:?}", trigger.body);
        self.emit_event(WorkflowEvent::TriggerReceived {
            caller_address: caller_address.to_string(),
        });

        if let Err(e) = self.check_address(caller_address) {
            warn!("Rejecting trigger: {}", e);
            return self.fail(e);
        }

        let request = RecordMutationBuilder::build(caller_address, &self.target);
        debug!(
            "Built {} {} {} -> {} (ttl {})",
            request.action, request.record_type, request.record_name, request.record_value,
            request.ttl_seconds
        );
        self.emit_event(WorkflowEvent::MutationBuilt {
            record_name: request.record_name.clone(),
            record_value: request.record_value.clone(),
        });

        self.emit_event(WorkflowEvent::MutationSubmitted {
            provider: self.provider.provider_name(),
            record_name: request.record_name.clone(),
        });

        match self.provider.mutate_record(&request).await {
            Ok(change) => {
                info!(
                    "Updated {} -> {} via {} (change: {}, status: {})",
                    request.record_name,
                    request.record_value,
                    self.provider.provider_name(),
                    change.id,
                    change.status
                );
                self.emit_event(WorkflowEvent::Succeeded {
                    record_name: request.record_name,
                    change_id: change.id.clone(),
                    status: change.status.clone(),
                });
                MutationOutcome::Succeeded {
                    caller_address: request.record_value,
                    change,
                }
            }
            Err(e) => {
                error!(
                    "Failed to update {} via {}: {}",
                    request.record_name,
                    self.provider.provider_name(),
                    e
                );
                self.fail(e)
            }
        }
    }

    /// Apply the address policy
    fn check_address(&self, caller_address: &str) -> Result<()> {
        if caller_address.trim().is_empty() {
            return Err(Error::invalid_trigger("missing caller address"));
        }

        match self.address_policy {
            AddressPolicy::Trust => Ok(()),
            AddressPolicy::RequireIpv4 => caller_address
                .parse::<Ipv4Addr>()
                .map(|_| ())
                .map_err(|_| {
                    Error::invalid_trigger(format!("caller address is not IPv4: {}", caller_address))
                }),
        }
    }

    /// Enter the Failed state
    fn fail(&self, err: Error) -> MutationOutcome {
        self.emit_event(WorkflowEvent::Failed {
            kind: err.kind(),
            error: err.to_string(),
        });
        MutationOutcome::Failed(err)
    }

    /// Emit a workflow event
    fn emit_event(&self, event: WorkflowEvent) {
        // Never awaited: a full channel drops the event
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(
                    "Event channel full, dropping event. Consider increasing event_channel_capacity."
                );
            }
            // Receiver dropped: nobody is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::RecordMutationRequest;
    use crate::traits::ChangeDescriptor;
    use async_trait::async_trait;

    struct AcceptingProvider;

    #[async_trait]
    impl DnsProviderClient for AcceptingProvider {
        async fn mutate_record(&self, _request: &RecordMutationRequest) -> Result<ChangeDescriptor> {
            Ok(ChangeDescriptor::new("/change/C1", "PENDING"))
        }

        fn provider_name(&self) -> &'static str {
            "accepting"
        }
    }

    fn workflow(policy: AddressPolicy) -> (UpdateWorkflow, mpsc::Receiver<WorkflowEvent>) {
        let config = WorkflowConfig {
            address_policy: policy,
            ..WorkflowConfig::default()
        };
        UpdateWorkflow::new(
            Box::new(AcceptingProvider),
            UpdateTarget::new("Z1N0R6CQ9D3SXO", "home.example.org"),
            config,
        )
        .unwrap()
    }

    fn drain(rx: &mut mpsc::Receiver<WorkflowEvent>) -> Vec<WorkflowState> {
        let mut states = Vec::new();
        while let Ok(event) = rx.try_recv() {
            states.push(event.state());
        }
        states
    }

    #[tokio::test]
    async fn success_walks_every_state() {
        let (workflow, mut rx) = workflow(AddressPolicy::Trust);

        let outcome = workflow.execute(&Trigger::new("", "203.0.113.7")).await;
        assert!(outcome.is_success());
        assert_eq!(
            drain(&mut rx),
            vec![
                WorkflowState::Start,
                WorkflowState::Building,
                WorkflowState::Mutating,
                WorkflowState::Succeeded,
            ]
        );
    }

    #[tokio::test]
    async fn empty_address_fails_before_building() {
        let (workflow, mut rx) = workflow(AddressPolicy::Trust);

        let outcome = workflow.execute(&Trigger::new("body", "   ")).await;
        assert!(matches!(outcome, MutationOutcome::Failed(Error::InvalidTrigger(_))));
        assert_eq!(drain(&mut rx), vec![WorkflowState::Start, WorkflowState::Failed]);
    }

    #[tokio::test]
    async fn ipv4_policy_rejects_other_text() {
        let (workflow, _rx) = workflow(AddressPolicy::RequireIpv4);

        let response = workflow.handle(&Trigger::new("", "2001:db8::1")).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "Update Failedcaller address is not IPv4: 2001:db8::1");

        let response = workflow.handle(&Trigger::new("", "192.0.2.10")).await;
        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn trust_policy_passes_text_through() {
        let (workflow, _rx) = workflow(AddressPolicy::Trust);

        let response = workflow.handle(&Trigger::new("", "not-an-ip")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "This API endpoint was called from not-an-ip");
    }

    #[tokio::test]
    async fn full_channel_does_not_block() {
        let config = WorkflowConfig {
            event_channel_capacity: 1,
            ..WorkflowConfig::default()
        };
        let (workflow, _rx) = UpdateWorkflow::new(
            Box::new(AcceptingProvider),
            UpdateTarget::new("Z1N0R6CQ9D3SXO", "home.example.org"),
            config,
        )
        .unwrap();

        let response = workflow.handle(&Trigger::new("", "192.0.2.10")).await;
        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn padded_address_is_written_verbatim() {
        let (workflow, _rx) = workflow(AddressPolicy::Trust);

        let outcome = workflow.execute(&Trigger::new("", " 192.0.2.10")).await;
        match outcome {
            MutationOutcome::Succeeded { caller_address, .. } => {
                assert_eq!(caller_address, " 192.0.2.10")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_affect_invocations() {
        let (workflow, rx) = workflow(AddressPolicy::Trust);
        drop(rx);

        let response = workflow.handle(&Trigger::new("", "192.0.2.10")).await;
        assert_eq!(response.status_code, 200);
        assert!(workflow.event_tx.is_closed());
    }

    #[test]
    fn invalid_target_is_rejected() {
        let result = UpdateWorkflow::new(
            Box::new(AcceptingProvider),
            UpdateTarget::new("", "home.example.org"),
            WorkflowConfig::default(),
        );
        assert!(result.is_err());
    }
}
