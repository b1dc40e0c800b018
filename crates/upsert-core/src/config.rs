//! Configuration types for the upsert service
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Deserializer, Serialize};

/// Prefix Route 53 puts in front of hosted zone ids in API responses
const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Zone and hostname kept current
    pub target: UpdateTarget,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Optional workflow settings
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl UpdaterConfig {
    /// Create a configuration with default workflow settings
    pub fn new(target: UpdateTarget, provider: ProviderConfig) -> Self {
        Self {
            target,
            provider,
            workflow: WorkflowConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.target.validate()?;
        self.provider.validate()?;
        self.workflow.validate()?;
        Ok(())
    }
}

/// The zone and hostname whose address record is kept current
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTarget {
    /// Provider-assigned zone identifier (e.g. "Z1N0R6CQ9D3SXO")
    #[serde(deserialize_with = "deserialize_zone_id")]
    pub zone_id: String,

    /// Fully-qualified domain name being kept current
    pub hostname: String,
}

impl UpdateTarget {
    /// Create a new target.
    ///
    /// Zone ids in the `/hostedzone/ZID` form are reduced to `ZID`.
    pub fn new(zone_id: impl Into<String>, hostname: impl Into<String>) -> Self {
        let zone_id: String = zone_id.into();

        Self {
            zone_id: normalize_zone_id(&zone_id),
            hostname: hostname.into().trim().to_string(),
        }
    }

    /// Validate the target
    ///
    /// Both fields must be non-empty and the hostname must be a
    /// well-formed DNS name.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_id.is_empty() {
            return Err(crate::Error::config("Zone ID cannot be empty"));
        }

        if self.zone_id.contains('/') {
            return Err(crate::Error::config(format!(
                "Zone ID contains a path separator: '{}'",
                self.zone_id
            )));
        }

        validate_hostname(&self.hostname)
    }
}

/// Reduce `/hostedzone/ZID` to `ZID` and drop surrounding whitespace
fn normalize_zone_id(zone_id: &str) -> String {
    let zone_id = zone_id.trim();
    zone_id
        .strip_prefix(HOSTED_ZONE_PREFIX)
        .unwrap_or(zone_id)
        .trim()
        .to_string()
}

fn deserialize_zone_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let zone_id = String::deserialize(deserializer)?;
    Ok(normalize_zone_id(&zone_id))
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks. A single trailing dot (absolute name) is allowed.
pub fn validate_hostname(hostname: &str) -> Result<(), crate::Error> {
    if hostname.is_empty() {
        return Err(crate::Error::config("Hostname cannot be empty"));
    }

    let name = hostname.strip_suffix('.').unwrap_or(hostname);

    if name.len() > 253 {
        return Err(crate::Error::config(format!(
            "Hostname too long: {} chars (max 253). Got: {}",
            name.len(),
            hostname
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Hostname has empty label: '{}'",
                hostname
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Hostname label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Hostname label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Hostname label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// AWS Route 53
    Route53 {
        /// AWS access key id
        access_key_id: String,
        /// AWS secret access key
        secret_access_key: String,
        /// Session token for temporary credentials
        #[serde(default)]
        session_token: Option<String>,
        /// Override for the API endpoint (defaults to the global Route 53 endpoint)
        #[serde(default)]
        endpoint: Option<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                endpoint,
                ..
            } => {
                if access_key_id.is_empty() {
                    return Err(crate::Error::config("Route 53 access key id cannot be empty"));
                }
                if secret_access_key.is_empty() {
                    return Err(crate::Error::config(
                        "Route 53 secret access key cannot be empty",
                    ));
                }
                if let Some(url) = endpoint
                    && !url.starts_with("https://")
                    && !url.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "Route 53 endpoint must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Route53 { .. } => "route53",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// Credentials never reach the log
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Route53 {
                access_key_id,
                session_token,
                endpoint,
                ..
            } => f
                .debug_struct("Route53")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<REDACTED>")
                .field("session_token", &session_token.as_ref().map(|_| "<REDACTED>"))
                .field("endpoint", endpoint)
                .finish(),
            ProviderConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}

/// How much the workflow trusts the caller address supplied by the front end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressPolicy {
    /// Pass any non-empty address through verbatim; the provider is the
    /// final authority on validity
    #[default]
    Trust,
    /// Reject addresses that do not parse as IPv4
    RequireIpv4,
}

impl std::str::FromStr for AddressPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trust" => Ok(AddressPolicy::Trust),
            "require-ipv4" | "require_ipv4" | "ipv4" => Ok(AddressPolicy::RequireIpv4),
            other => Err(crate::Error::config(format!(
                "Unknown address policy '{}'. Valid: trust, require-ipv4",
                other
            ))),
        }
    }
}

/// Workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Caller address validation policy
    #[serde(default)]
    pub address_policy: AddressPolicy,

    /// Capacity of the workflow event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl WorkflowConfig {
    /// Validate the workflow configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            address_policy: AddressPolicy::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route53() -> ProviderConfig {
        ProviderConfig::Route53 {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            session_token: None,
            endpoint: None,
        }
    }

    #[test]
    fn target_strips_hosted_zone_prefix() {
        let target = UpdateTarget::new("/hostedzone/Z1N0R6CQ9D3SXO", "home.example.org");
        assert_eq!(target.zone_id, "Z1N0R6CQ9D3SXO");
        assert!(target.validate().is_ok());
    }

    #[test]
    fn target_requires_both_fields() {
        assert!(UpdateTarget::new("", "home.example.org").validate().is_err());
        assert!(UpdateTarget::new("Z1N0R6CQ9D3SXO", "").validate().is_err());
    }

    #[test]
    fn hostname_validation() {
        assert!(validate_hostname("home.example.org").is_ok());
        assert!(validate_hostname("home.example.org.").is_ok());
        assert!(validate_hostname("home..example.org").is_err());
        assert!(validate_hostname("-home.example.org").is_err());
        assert!(validate_hostname("home_1.example.org").is_err());
        assert!(validate_hostname(&format!("{}.org", "a".repeat(64))).is_err());
    }

    #[test]
    fn route53_requires_credentials() {
        assert!(route53().validate().is_ok());

        let missing = ProviderConfig::Route53 {
            access_key_id: String::new(),
            secret_access_key: "secret".to_string(),
            session_token: None,
            endpoint: None,
        };
        assert!(missing.validate().is_err());

        let bad_endpoint = ProviderConfig::Route53 {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: None,
            endpoint: Some("route53.amazonaws.com".to_string()),
        };
        assert!(bad_endpoint.validate().is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = ProviderConfig::Route53 {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "super-secret-value".to_string(),
            session_token: Some("session-secret".to_string()),
            endpoint: None,
        };

        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("AKIDEXAMPLE"));
        assert!(!debug_str.contains("super-secret-value"));
        assert!(!debug_str.contains("session-secret"));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let json = serde_json::json!({
            "target": { "zone_id": "Z1N0R6CQ9D3SXO", "hostname": "home.example.org" },
            "provider": {
                "type": "route53",
                "access_key_id": "AKIDEXAMPLE",
                "secret_access_key": "secret"
            }
        });

        let config: UpdaterConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.provider.type_name(), "route53");
        assert_eq!(config.workflow.address_policy, AddressPolicy::Trust);
        assert_eq!(config.workflow.event_channel_capacity, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserialized_zone_id_is_normalized() {
        let json = serde_json::json!({
            "target": { "zone_id": "/hostedzone/Z1N0R6CQ9D3SXO", "hostname": "home.example.org" },
            "provider": {
                "type": "route53",
                "access_key_id": "AKIDEXAMPLE",
                "secret_access_key": "secret"
            }
        });

        let config: UpdaterConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.target, UpdateTarget::new("Z1N0R6CQ9D3SXO", "home.example.org"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn address_policy_parses() {
        assert_eq!("trust".parse::<AddressPolicy>().unwrap(), AddressPolicy::Trust);
        assert_eq!(
            "Require-IPv4".parse::<AddressPolicy>().unwrap(),
            AddressPolicy::RequireIpv4
        );
        assert!("strict".parse::<AddressPolicy>().is_err());
    }
}
