// # Route 53 DNS Provider
//
// This crate provides the AWS Route 53 implementation of
// `upsert_core::DnsProviderClient`.
//
// ## Behaviour
//
// - One `ChangeResourceRecordSets` request per mutation, no lookups
// - No retry, backoff or caching; failures go straight back to the workflow
// - HTTP timeout of 30 seconds, reported as `Error::Timeout`
// - Route 53 error documents are turned into `Error::ProviderRejected`
//   with the service's own code and message
// - Dry-run mode signs and logs the request without sending it
//
// ## Security Requirements
//
// - Secret access key and session token NEVER appear in logs
// - Provider MUST fail fast if credentials are empty
//
// ## API Reference
//
// - Change record sets: POST `/2013-04-01/hostedzone/{Id}/rrset/`
// - Signing: AWS Signature Version 4, region `us-east-1`, service `route53`

pub mod sigv4;
pub mod xml;

use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use upsert_core::config::ProviderConfig;
use upsert_core::traits::{ChangeDescriptor, DnsProviderClient, DnsProviderFactory};
use upsert_core::{Error, RecordMutationRequest, Result};

pub use sigv4::AwsCredentials;

/// Global Route 53 API endpoint
pub const ROUTE53_ENDPOINT: &str = "https://route53.amazonaws.com";

/// API version segment of every request path
const API_VERSION: &str = "2013-04-01";

/// Content type of change batch bodies
const XML_CONTENT_TYPE: &str = "text/xml";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Route 53 DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Build and sign the request
/// - Log the intended change
/// - **NOT** send anything to Route 53
pub struct Route53Provider {
    /// Signing credentials
    credentials: AwsCredentials,

    /// API endpoint (scheme + host [+ port])
    endpoint: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Request timeout, reported in timeout errors
    timeout: Duration,

    /// Dry-run mode: if true, sign but do not send
    dry_run: bool,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("credentials", &self.credentials)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Route53Provider {
    /// Create a new Route 53 provider
    ///
    /// # Parameters
    ///
    /// - `credentials`: Credentials allowed to call `route53:ChangeResourceRecordSets`
    /// - `endpoint`: API endpoint override, `None` for the global endpoint
    /// - `dry_run`: If true, sign requests but do not send them
    pub fn new(
        credentials: AwsCredentials,
        endpoint: Option<String>,
        dry_run: bool,
    ) -> Result<Self> {
        Self::with_timeout(credentials, endpoint, dry_run, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a new Route 53 provider with a custom HTTP timeout
    pub fn with_timeout(
        credentials: AwsCredentials,
        endpoint: Option<String>,
        dry_run: bool,
        timeout: Duration,
    ) -> Result<Self> {
        if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
            return Err(Error::config("Route 53 credentials cannot be empty"));
        }

        let endpoint = endpoint
            .unwrap_or_else(|| ROUTE53_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        extract_host(&endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            endpoint,
            client,
            timeout,
            dry_run,
        })
    }

    /// Request path for a hosted zone's record sets
    fn rrset_path(zone_id: &str) -> String {
        format!("/{}/hostedzone/{}/rrset/", API_VERSION, zone_id)
    }

    /// Map a send failure onto the error taxonomy
    fn send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::timeout(self.timeout)
        } else {
            Error::transport(format!("HTTP request to Route 53 failed: {}", err))
        }
    }
}

#[async_trait]
impl DnsProviderClient for Route53Provider {
    /// Submit one UPSERT to Route 53
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /2013-04-01/hostedzone/Z1N0R6CQ9D3SXO/rrset/
    /// Authorization: AWS4-HMAC-SHA256 Credential=..., SignedHeaders=..., Signature=...
    /// Content-Type: text/xml
    ///
    /// <ChangeResourceRecordSetsRequest>...</ChangeResourceRecordSetsRequest>
    /// ```
    async fn mutate_record(&self, request: &RecordMutationRequest) -> Result<ChangeDescriptor> {
        tracing::info!(
            "Submitting Route 53 change: {} {} {} -> {} in zone {} [mode: {}]",
            request.action,
            request.record_type,
            request.record_name,
            request.record_value,
            request.zone_id,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        let path = Self::rrset_path(&request.zone_id);
        let url = format!("{}{}", self.endpoint, path);
        let body = xml::change_batch(request);
        let host = extract_host(&self.endpoint)?;

        let signed = sigv4::sign(
            &self.credentials,
            &sigv4::RequestToSign {
                method: "POST",
                host: &host,
                path: &path,
                content_type: XML_CONTENT_TYPE,
                payload: body.as_bytes(),
            },
            Utc::now(),
        );

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send POST request to {} with payload: {}", url, body);
            return Ok(ChangeDescriptor::new("dry-run", "DRY_RUN").with_submitted_at(Utc::now()));
        }

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", XML_CONTENT_TYPE)
            .header("X-Amz-Date", &signed.amz_date)
            .header("Authorization", &signed.authorization);
        if let Some(token) = &signed.security_token {
            builder = builder.header("X-Amz-Security-Token", token);
        }

        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.send_error(e))?;

        if !status.is_success() {
            let description = xml::describe_error(status.as_u16(), &text);
            tracing::warn!("Route 53 rejected change ({}): {}", status, description);
            return Err(Error::provider_rejected(description));
        }

        let change = xml::parse_change_info(&text)?;
        tracing::debug!("Route 53 change accepted: {} ({})", change.id, change.status);
        Ok(change)
    }

    fn provider_name(&self) -> &'static str {
        "route53"
    }
}

/// Extract the host (and port) from an endpoint URL
///
/// The endpoint is scheme and authority only; a path is rejected.
fn extract_host(endpoint: &str) -> Result<String> {
    let host = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .ok_or_else(|| {
            Error::config(format!("Route 53 endpoint must use HTTP or HTTPS: {}", endpoint))
        })?;

    if host.is_empty() {
        return Err(Error::config(format!("Route 53 endpoint has no host: {}", endpoint)));
    }

    // Only the API path is signed, so the endpoint cannot carry one of its own
    if host.contains('/') {
        return Err(Error::config(format!(
            "Route 53 endpoint must not contain a path: {}",
            endpoint
        )));
    }

    Ok(host.to_string())
}

/// Factory for creating Route 53 providers
pub struct Route53Factory;

impl DnsProviderFactory for Route53Factory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProviderClient>> {
        match config {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                session_token,
                endpoint,
            } => {
                if access_key_id.is_empty() || secret_access_key.is_empty() {
                    return Err(Error::config("Route 53 credentials are required"));
                }

                // Check for dry-run mode environment variable
                let dry_run = std::env::var("DDNS_MODE")
                    .unwrap_or_default()
                    .to_lowercase()
                    == "dry-run";

                if dry_run {
                    tracing::warn!("Route 53 provider running in DRY-RUN mode - no changes will be made");
                }

                let credentials = AwsCredentials::new(
                    access_key_id.clone(),
                    secret_access_key.clone(),
                    session_token.clone(),
                );

                Ok(Box::new(Route53Provider::new(
                    credentials,
                    endpoint.clone(),
                    dry_run,
                )?))
            }
            _ => Err(Error::config("Invalid config for Route 53 provider")),
        }
    }
}

/// Register the Route 53 provider with a registry
///
/// # Example
///
/// ```rust
/// use upsert_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// upsert_provider_route53::register(&registry);
/// assert!(registry.has_provider("route53"));
/// ```
pub fn register(registry: &upsert_core::ProviderRegistry) {
    registry.register_provider("route53", Box::new(Route53Factory));
}
