//! Environment configuration for upsertd

use anyhow::Result;
use std::net::SocketAddr;
use upsert_core::{AddressPolicy, ProviderConfig, UpdateTarget, UpdaterConfig, WorkflowConfig};

/// Default listen address
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Application configuration
pub struct Config {
    pub zone_id: String,
    pub hostname: String,
    pub provider_type: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub route53_endpoint: Option<String>,
    pub address_policy: String,
    pub trust_forwarded: String,
    pub listen_addr: String,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        Self {
            zone_id: get("DDNS_ZONE_ID").unwrap_or_default(),
            hostname: get("DDNS_HOSTNAME").unwrap_or_default(),
            provider_type: get("DDNS_PROVIDER_TYPE").unwrap_or_else(|| "route53".to_string()),
            access_key_id: get("AWS_ACCESS_KEY_ID").unwrap_or_default(),
            secret_access_key: get("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
            session_token: get("AWS_SESSION_TOKEN").filter(|s| !s.is_empty()),
            route53_endpoint: get("DDNS_ROUTE53_ENDPOINT").filter(|s| !s.is_empty()),
            address_policy: get("DDNS_ADDRESS_POLICY").unwrap_or_else(|| "trust".to_string()),
            trust_forwarded: get("DDNS_TRUST_FORWARDED").unwrap_or_else(|| "true".to_string()),
            listen_addr: get("DDNS_LISTEN_ADDR")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            log_level: get("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.zone_id.is_empty() {
            anyhow::bail!(
                "DDNS_ZONE_ID is required. \
                Set it via: export DDNS_ZONE_ID=Z1N0R6CQ9D3SXO"
            );
        }

        if self.hostname.is_empty() {
            anyhow::bail!(
                "DDNS_HOSTNAME is required. \
                Set it via: export DDNS_HOSTNAME=home.example.org"
            );
        }

        match self.provider_type.as_str() {
            "route53" => {
                if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
                    anyhow::bail!(
                        "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY are required \
                        when DDNS_PROVIDER_TYPE=route53"
                    );
                }
            }
            _ => anyhow::bail!(
                "DDNS_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: route53",
                self.provider_type
            ),
        }

        self.updater_config()?.validate()?;
        self.listen_addr()?;
        self.trust_forwarded()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Core configuration derived from the environment
    pub fn updater_config(&self) -> Result<UpdaterConfig> {
        let address_policy: AddressPolicy = self.address_policy.parse()?;

        let provider = ProviderConfig::Route53 {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
            endpoint: self.route53_endpoint.clone(),
        };

        Ok(UpdaterConfig {
            target: UpdateTarget::new(&self.zone_id, &self.hostname),
            provider,
            workflow: WorkflowConfig {
                address_policy,
                ..WorkflowConfig::default()
            },
        })
    }

    /// Parsed listen address
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().map_err(|e| {
            anyhow::anyhow!("DDNS_LISTEN_ADDR '{}' is not a socket address: {}", self.listen_addr, e)
        })
    }

    /// Whether to take the caller address from forwarding headers
    pub fn trust_forwarded(&self) -> Result<bool> {
        match self.trust_forwarded.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => anyhow::bail!("DDNS_TRUST_FORWARDED '{}' is not a boolean", other),
        }
    }
}
