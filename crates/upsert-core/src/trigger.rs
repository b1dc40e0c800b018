//! Inbound invocation
//!
//! A [`Trigger`] is created by the front end for every request and is
//! read-only to the workflow.

use serde::{Deserialize, Serialize};

/// One inbound request as handed over by the front end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    /// Request body; logged, not interpreted
    #[serde(default)]
    pub body: String,

    /// Caller's apparent address, as resolved by the front end
    #[serde(default)]
    pub source_address: String,
}

impl Trigger {
    /// Create a trigger
    pub fn new(body: impl Into<String>, source_address: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            source_address: source_address.into(),
        }
    }

    /// The caller address exactly as supplied
    ///
    /// Not normalised: whatever the front end resolved is what gets written.
    pub fn caller_address(&self) -> &str {
        &self.source_address
    }

    /// Whether the trigger carries no usable caller address
    pub fn is_missing_address(&self) -> bool {
        self.source_address.trim().is_empty()
    }
}
