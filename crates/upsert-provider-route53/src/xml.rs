//! Route 53 XML bodies
//!
//! The API speaks a small, fixed XML vocabulary, so bodies are written with
//! `format!` and answers are read by tag name. Only the elements this crate
//! needs are handled.

use chrono::{DateTime, Utc};
use upsert_core::{ChangeDescriptor, Error, RecordMutationRequest, Result};

/// Namespace of the 2013-04-01 API
const XMLNS: &str = "https://route53.amazonaws.com/doc/2013-04-01/";

/// Render a `ChangeResourceRecordSetsRequest` carrying one change
pub fn change_batch(request: &RecordMutationRequest) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<ChangeResourceRecordSetsRequest xmlns="{xmlns}">"#,
            "<ChangeBatch>",
            "<Comment>{comment}</Comment>",
            "<Changes><Change>",
            "<Action>{action}</Action>",
            "<ResourceRecordSet>",
            "<Name>{name}</Name>",
            "<Type>{record_type}</Type>",
            "<TTL>{ttl}</TTL>",
            "<ResourceRecords><ResourceRecord><Value>{value}</Value></ResourceRecord></ResourceRecords>",
            "</ResourceRecordSet>",
            "</Change></Changes>",
            "</ChangeBatch>",
            "</ChangeResourceRecordSetsRequest>",
        ),
        xmlns = XMLNS,
        comment = escape(&request.comment),
        action = request.action.as_str(),
        name = escape(&request.record_name),
        record_type = request.record_type.as_str(),
        ttl = request.ttl_seconds,
        value = escape(&request.record_value),
    )
}

/// Parse the `ChangeInfo` of a successful response
pub fn parse_change_info(body: &str) -> Result<ChangeDescriptor> {
    let info = element_text(body, "ChangeInfo").ok_or_else(|| {
        Error::provider_rejected("Invalid response format: ChangeInfo is missing")
    })?;

    let id = element_text(info, "Id")
        .ok_or_else(|| Error::provider_rejected("Invalid response format: ChangeInfo.Id is missing"))?;
    let status = element_text(info, "Status").unwrap_or("UNKNOWN");

    let mut change = ChangeDescriptor::new(unescape(id), unescape(status));
    if let Some(submitted_at) = element_text(info, "SubmittedAt")
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
    {
        change = change.with_submitted_at(submitted_at.with_timezone(&Utc));
    }

    Ok(change)
}

/// Describe an error response
///
/// - `ErrorResponse` bodies become `"{Code}: {Message}"`
/// - `InvalidChangeBatch` bodies become `"InvalidChangeBatch: {first Message}"`
/// - Anything else becomes `"HTTP {status}: {body}"`
pub fn describe_error(status: u16, body: &str) -> String {
    if element_text(body, "InvalidChangeBatch").is_some() {
        let message = element_text(body, "Message").map(unescape).unwrap_or_default();
        return format!("InvalidChangeBatch: {}", message);
    }

    let code = element_text(body, "Code").map(unescape);
    let message = element_text(body, "Message").map(unescape);

    match (code, message) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (Some(code), None) => code,
        (None, Some(message)) => message,
        (None, None) => {
            let body = body.trim();
            if body.is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, body)
            }
        }
    }
}

/// Text between the first `<tag ...>` and its matching `</tag>`
fn element_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);

    let mut search_from = 0;
    while let Some(pos) = xml[search_from..].find(&open) {
        let start = search_from + pos;
        let after_name = start + open.len();
        let rest = &xml[after_name..];

        // Skip longer names sharing the prefix (<Message> vs <Messages>)
        match rest.chars().next() {
            Some('>') | Some(' ') | Some('\t') | Some('\n') | Some('\r') => {}
            _ => {
                search_from = after_name;
                continue;
            }
        }

        let content_start = after_name + rest.find('>')? + 1;
        let content_end = content_start + xml[content_start..].find(&close)?;
        return Some(&xml[content_start..content_end]);
    }

    None
}

/// Escape XML text content
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Undo [`escape`]
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use upsert_core::{RecordMutationBuilder, UpdateTarget};

    #[test]
    fn change_batch_carries_one_upsert() {
        let target = UpdateTarget::new("Z1N0R6CQ9D3SXO", "home.example.org");
        let request = RecordMutationBuilder::build("203.0.113.7", &target);

        let body = change_batch(&request);
        assert!(body.contains("<Action>UPSERT</Action>"));
        assert!(body.contains("<Name>home.example.org</Name>"));
        assert!(body.contains("<Type>A</Type>"));
        assert!(body.contains("<TTL>60</TTL>"));
        assert!(body.contains("<Value>203.0.113.7</Value>"));
        assert!(body.contains(
            "<Comment>Update to home.example.org in hosted zone Z1N0R6CQ9D3SXO called from 203.0.113.7</Comment>"
        ));
        assert_eq!(body.matches("<Change>").count(), 1);
    }

    #[test]
    fn change_batch_escapes_text() {
        let target = UpdateTarget::new("Z1N0R6CQ9D3SXO", "home.example.org");
        let request = RecordMutationBuilder::build("<script>&", &target);

        let body = change_batch(&request);
        assert!(body.contains("<Value>&lt;script&gt;&amp;</Value>"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn parses_change_info() {
        let body = r#"<?xml version="1.0"?>
<ChangeResourceRecordSetsResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
   <ChangeInfo>
      <Id>/change/C2682N5HXP0BZ4</Id>
      <Status>PENDING</Status>
      <SubmittedAt>2017-03-10T01:36:41.958Z</SubmittedAt>
      <Comment>Update to home.example.org</Comment>
   </ChangeInfo>
</ChangeResourceRecordSetsResponse>"#;

        let change = parse_change_info(body).unwrap();
        assert_eq!(change.id, "/change/C2682N5HXP0BZ4");
        assert_eq!(change.status, "PENDING");
        assert_eq!(
            change.submitted_at.map(|t| t.to_rfc3339()),
            Some("2017-03-10T01:36:41.958+00:00".to_string())
        );
    }

    #[test]
    fn missing_change_info_is_rejected() {
        assert!(parse_change_info("<Other/>").is_err());
    }

    #[test]
    fn describes_error_response() {
        let body = r#"<?xml version="1.0"?>
<ErrorResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <Error>
    <Type>Sender</Type>
    <Code>NoSuchHostedZone</Code>
    <Message>No hosted zone found with ID: Z1N0R6CQ9D3SXO</Message>
  </Error>
  <RequestId>a3d4f3e2-0000-0000-0000-000000000000</RequestId>
</ErrorResponse>"#;

        assert_eq!(
            describe_error(404, body),
            "NoSuchHostedZone: No hosted zone found with ID: Z1N0R6CQ9D3SXO"
        );
    }

    #[test]
    fn describes_invalid_change_batch() {
        let body = r#"<InvalidChangeBatch xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <Messages>
    <Message>ARRDATAIllegalIPv4Address (Value is not a valid IPv4 address) encountered with 'nope'</Message>
  </Messages>
</InvalidChangeBatch>"#;

        assert_eq!(
            describe_error(400, body),
            "InvalidChangeBatch: ARRDATAIllegalIPv4Address (Value is not a valid IPv4 address) encountered with 'nope'"
        );
    }

    #[test]
    fn describes_opaque_body() {
        assert_eq!(describe_error(502, "Bad Gateway"), "HTTP 502: Bad Gateway");
        assert_eq!(describe_error(503, "  "), "HTTP 503");
    }

    #[test]
    fn element_text_skips_prefixed_names() {
        assert_eq!(element_text("<Messages><Message>x</Message></Messages>", "Message"), Some("x"));
        assert_eq!(element_text("<Code>a &amp; b</Code>", "Code").map(unescape), Some("a & b".to_string()));
    }
}
