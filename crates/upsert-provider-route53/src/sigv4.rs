//! AWS Signature Version 4 for Route 53 requests
//!
//! Route 53 is a global service signed in `us-east-1`. Requests are signed
//! with the `Authorization` header (not presigned URLs) and cover the
//! content type, host and timestamp headers, plus the session token when
//! temporary credentials are in use.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Signing algorithm identifier
const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Region Route 53 requests are signed for
pub const SIGNING_REGION: &str = "us-east-1";

/// Service name in the credential scope
pub const SIGNING_SERVICE: &str = "route53";

/// AWS credentials used to sign requests
#[derive(Clone)]
pub struct AwsCredentials {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    /// ⚠️ NEVER log this value
    pub secret_access_key: String,
    /// Session token for temporary credentials
    pub session_token: Option<String>,
}

impl AwsCredentials {
    /// Create a new credential set
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.filter(|t| !t.is_empty()),
        }
    }
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// Headers to attach to a signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Value of `x-amz-date`
    pub amz_date: String,
    /// Value of `Authorization`
    pub authorization: String,
    /// Value of `x-amz-security-token`, when signing with temporary credentials
    pub security_token: Option<String>,
}

/// One request to sign
pub struct RequestToSign<'a> {
    /// HTTP method
    pub method: &'a str,
    /// Host header value (with port if non-default)
    pub host: &'a str,
    /// Absolute request path
    pub path: &'a str,
    /// Content-Type header value
    pub content_type: &'a str,
    /// Request body
    pub payload: &'a [u8],
}

/// Sign a request at `now`
pub fn sign(
    credentials: &AwsCredentials,
    request: &RequestToSign<'_>,
    now: DateTime<Utc>,
) -> SignedHeaders {
    let date_str = now.format("%Y%m%d").to_string();
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

    let credential_scope = format!(
        "{}/{}/{}/aws4_request",
        date_str, SIGNING_REGION, SIGNING_SERVICE
    );

    // Canonical headers, already in sorted order
    let mut headers = vec![
        ("content-type", request.content_type.trim()),
        ("host", request.host.trim()),
        ("x-amz-date", amz_date.as_str()),
    ];
    if let Some(token) = credentials.session_token.as_deref() {
        headers.push(("x-amz-security-token", token.trim()));
    }

    let mut canonical_headers = String::new();
    for (name, value) in &headers {
        let _ = writeln!(canonical_headers, "{}:{}", name, value);
    }
    let signed_headers = headers
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method,
        uri_encode_path(request.path),
        "",
        canonical_headers,
        signed_headers,
        hex_sha256(request.payload)
    );

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        credential_scope,
        hex_sha256(canonical_request.as_bytes())
    );

    let signature = calculate_signature(
        &credentials.secret_access_key,
        &date_str,
        &string_to_sign,
    );

    SignedHeaders {
        authorization: format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, credentials.access_key_id, credential_scope, signed_headers, signature
        ),
        amz_date,
        security_token: credentials.session_token.clone(),
    }
}

/// URI-encode a path (preserving slashes)
fn uri_encode_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len() * 3);
    for c in path.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' | '/' => {
                result.push(c);
            }
            _ => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).as_bytes() {
                    let _ = write!(result, "%{:02X}", b);
                }
            }
        }
    }
    result
}

/// Calculate SHA-256 hash and return as hex string
pub fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Calculate HMAC-SHA256
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Derive the signing key and sign
fn calculate_signature(secret_key: &str, date: &str, string_to_sign: &str) -> String {
    let k_date = hmac_sha256(format!("AWS4{}", secret_key).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, SIGNING_REGION.as_bytes());
    let k_service = hmac_sha256(&k_region, SIGNING_SERVICE.as_bytes());
    let k_signing = hmac_sha256(&k_service, b"aws4_request");
    hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()))
}
