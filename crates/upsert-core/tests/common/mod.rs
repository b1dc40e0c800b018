//! Test doubles and common utilities for workflow contract tests
//!
//! These doubles stand in for a real DNS provider: they record every call
//! and return canned outcomes.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use upsert_core::error::{Error, Result};
use upsert_core::{
    ChangeDescriptor, DnsProviderClient, RecordMutationRequest, UpdateTarget, UpdateWorkflow,
    WorkflowConfig, WorkflowEvent,
};

/// Canned provider behaviour
#[derive(Clone)]
pub enum Canned {
    /// Accept every mutation
    Accept,
    /// Reject every mutation with this message
    Reject(&'static str),
    /// Fail every call as unreachable with this message
    Unreachable(&'static str),
}

/// A DnsProviderClient that records calls and answers from a script
pub struct RecordingProvider {
    /// Call counter for mutate_record()
    call_count: Arc<AtomicUsize>,
    /// Requests received, in order
    requests: Arc<Mutex<Vec<RecordMutationRequest>>>,
    /// What to answer
    canned: Canned,
}

impl RecordingProvider {
    pub fn new(canned: Canned) -> Self {
        Self {
            call_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            canned,
        }
    }

    pub fn accepting() -> Self {
        Self::new(Canned::Accept)
    }

    pub fn rejecting(message: &'static str) -> Self {
        Self::new(Canned::Reject(message))
    }

    /// Get the number of times mutate_record() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the requests received so far
    pub fn requests(&self) -> Vec<RecordMutationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Create a new provider that shares counters with an existing one
    ///
    /// The workflow takes ownership of its provider; the test keeps the
    /// original to inspect.
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            call_count: Arc::clone(&other.call_count),
            requests: Arc::clone(&other.requests),
            canned: other.canned.clone(),
        }
    }
}

#[async_trait::async_trait]
impl DnsProviderClient for RecordingProvider {
    async fn mutate_record(&self, request: &RecordMutationRequest) -> Result<ChangeDescriptor> {
        let n = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        match &self.canned {
            Canned::Accept => Ok(ChangeDescriptor::new(format!("/change/C{}", n), "PENDING")),
            Canned::Reject(message) => Err(Error::provider_rejected(*message)),
            Canned::Unreachable(message) => Err(Error::transport(*message)),
        }
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// The target used throughout the contract tests
pub fn test_target() -> UpdateTarget {
    UpdateTarget::new("Z1N0R6CQ9D3SXO", "home.example.org")
}

/// Build a workflow around a provider that shares counters with `provider`
pub fn workflow_with(
    provider: &RecordingProvider,
) -> (UpdateWorkflow, mpsc::Receiver<WorkflowEvent>) {
    UpdateWorkflow::new(
        Box::new(RecordingProvider::sharing_counters_with(provider)),
        test_target(),
        WorkflowConfig::default(),
    )
    .expect("workflow construction succeeds")
}
