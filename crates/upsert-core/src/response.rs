//! Caller-visible responses
//!
//! [`ResponseMapper`] is the only place a [`MutationOutcome`] turns into an
//! HTTP-shaped [`Response`]. Success is a 200 naming the caller address;
//! every failure collapses into a 500 whose body is `"Update Failed"`
//! followed by the error text.

use crate::error::Error;
use crate::traits::ChangeDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of every failure body
pub const FAILURE_PREFIX: &str = "Update Failed";

/// Content type of every response
pub const CONTENT_TYPE: &str = "text/html";

/// Result of one workflow invocation
#[derive(Debug)]
pub enum MutationOutcome {
    /// The provider accepted the change
    Succeeded {
        /// Address that was written
        caller_address: String,
        /// What the provider reported
        change: ChangeDescriptor,
    },
    /// The invocation ended without an accepted change
    Failed(Error),
}

impl MutationOutcome {
    /// Whether the provider accepted the change
    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Succeeded { .. })
    }
}

/// HTTP-shaped response returned to the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// HTTP status code
    pub status_code: u16,
    /// Response body
    pub body: String,
    /// Response headers
    pub headers: BTreeMap<String, String>,
}

impl Response {
    fn html(status_code: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), CONTENT_TYPE.to_string());

        Self {
            status_code,
            body,
            headers,
        }
    }
}

/// Maps workflow outcomes to responses
pub struct ResponseMapper;

impl ResponseMapper {
    /// Map an outcome to the response sent to the caller
    pub fn map(outcome: &MutationOutcome) -> Response {
        match outcome {
            MutationOutcome::Succeeded { caller_address, .. } => Self::success(caller_address),
            MutationOutcome::Failed(err) => Self::failure(err),
        }
    }

    /// 200 response announcing the caller address
    pub fn success(caller_address: &str) -> Response {
        Response::html(
            200,
            format!("This API endpoint was called from {}", caller_address),
        )
    }

    /// 500 response carrying the error text
    pub fn failure(err: &Error) -> Response {
        Response::html(500, format!("{}{}", FAILURE_PREFIX, err))
    }
}
