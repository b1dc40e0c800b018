//! DNS change requests
//!
//! [`RecordMutationBuilder`] turns a caller address and an [`UpdateTarget`]
//! into the single [`RecordMutationRequest`] sent to the provider. It performs
//! no I/O and does not check that the address is well formed; the provider is
//! the final authority on that.

use crate::config::UpdateTarget;
use serde::Serialize;
use std::fmt;

/// TTL applied to every upserted record
pub const RECORD_TTL_SECONDS: u32 = 60;

/// DNS record type written by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of change applied to the record set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create the record if absent, replace it if present
    Upsert,
}

impl ChangeAction {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-specified record change, immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordMutationRequest {
    /// Zone holding the record
    pub zone_id: String,
    /// Record name (the target hostname)
    pub record_name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record value (the caller address)
    pub record_value: String,
    /// Record TTL in seconds
    pub ttl_seconds: u32,
    /// Change action
    pub action: ChangeAction,
    /// Audit comment attached to the change
    pub comment: String,
}

/// Builds [`RecordMutationRequest`]s
pub struct RecordMutationBuilder;

impl RecordMutationBuilder {
    /// Build the UPSERT for `caller_address` against `target`
    pub fn build(caller_address: &str, target: &UpdateTarget) -> RecordMutationRequest {
        RecordMutationRequest {
            zone_id: target.zone_id.clone(),
            record_name: target.hostname.clone(),
            record_type: RecordType::A,
            record_value: caller_address.to_string(),
            ttl_seconds: RECORD_TTL_SECONDS,
            action: ChangeAction::Upsert,
            comment: format!(
                "Update to {} in hosted zone {} called from {}",
                target.hostname, target.zone_id, caller_address
            ),
        }
    }
}
