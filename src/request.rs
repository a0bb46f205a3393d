//! Canonical request construction.
//!
//! Every outbound call is reduced to a deterministic canonical string that
//! the server-side verifier rebuilds byte-for-byte. The canonical request has
//! a fixed six-line grammar:
//!
//! ```text
//! <HTTP-METHOD>
//! <URI-PATH>
//! <CANONICAL-QUERY-STRING>
//! <header1>:<value1>
//! ...
//!
//! <signed-header-names joined by ;>
//! <lowercase-hex-SHA256(payload)>
//! ```
//!
//! All functions here are pure: the timestamp header is supplied by the
//! caller so that construction stays testable.

use std::collections::BTreeMap;

use http::{HeaderMap, Method};

use crate::config::Session;
use crate::constants::*;
use crate::{Error, Result};

/// Ordered mapping from lower-cased header name to trimmed value.
///
/// `BTreeMap` keeps keys sorted ascending by byte comparison, which is
/// exactly the canonical header order. Built fresh per request.
pub type CanonicalHeaders = BTreeMap<String, String>;

/// Methods accepted by the dispatcher. Closed set.
const VALID_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Reject methods outside the fixed verb set.
pub fn validate_method(method: &Method) -> Result<()> {
    if VALID_METHODS.contains(method) {
        return Ok(());
    }
    Err(Error::request_invalid(format!(
        "Unknown HTTP method: '{method}'. Valid methods are: GET, POST, PUT, PATCH, DELETE."
    )))
}

/// Convert query parameters into a canonical URL-encoded query string.
///
/// Pairs are sorted ascending by key, form-encoded and joined with `&`.
/// An empty map yields an empty string.
pub fn canonical_query(params: &[(String, String)]) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, v) in sorted {
        serializer.append_pair(&k, &v);
    }
    serializer.finish()
}

/// Canonicalize headers: lower-case every name, trim surrounding whitespace
/// from values, order ascending by name.
///
/// Idempotent; if two names collide after lower-casing, last write wins.
pub fn canonicalize_headers<'a>(
    headers: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> CanonicalHeaders {
    headers
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v.trim().to_string()))
        .collect()
}

/// Prepare the full header set for one signing attempt.
///
/// User headers are normalized, then the seven fixed headers are injected,
/// overwriting any caller-supplied values of the same name. `content-length`
/// is omitted when the payload is empty.
pub(crate) fn prepare_headers(
    session: &Session,
    host: &str,
    user_headers: &HeaderMap,
    payload: &[u8],
    timestamp: &str,
) -> Result<CanonicalHeaders> {
    let mut headers = CanonicalHeaders::new();
    for (name, value) in user_headers {
        let value = value.to_str()?;
        headers.insert(name.as_str().to_lowercase(), value.trim().to_string());
    }

    headers.insert(HEADER_ACCEPT.into(), APPLICATION_JSON.into());
    headers.insert(HEADER_CONTENT_TYPE.into(), APPLICATION_JSON.into());
    headers.insert(X_AMZ_PAY_REGION.into(), session.region().as_str().into());
    headers.insert(X_AMZ_PAY_DATE.into(), timestamp.into());
    headers.insert(X_AMZ_PAY_HOST.into(), host.into());
    if !payload.is_empty() {
        headers.insert(HEADER_CONTENT_LENGTH.into(), payload.len().to_string());
    }
    headers.insert(X_AMZ_PAY_SDK_TYPE.into(), SDK_TYPE.into());
    headers.insert(X_AMZ_PAY_SDK_VERSION.into(), SDK_VERSION.into());

    Ok(headers)
}

/// The signed-header-names line: canonical keys joined by `;`.
pub fn signed_header_names(headers: &CanonicalHeaders) -> String {
    headers.keys().cloned().collect::<Vec<_>>().join(";")
}

/// Build the canonical request string from its already-canonical parts.
///
/// `hashed_payload` is the lowercase hex SHA-256 of the raw request body;
/// an empty body hashes to the digest of the empty string, never skipped.
pub fn canonical_request_string(
    method: &Method,
    path: &str,
    query: &str,
    headers: &CanonicalHeaders,
    hashed_payload: &str,
) -> String {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut s = String::with_capacity(256);

    s.push_str(method.as_str());
    s.push('\n');
    s.push_str(path);
    s.push('\n');
    s.push_str(query);
    s.push('\n');
    for (k, v) in headers {
        s.push_str(k);
        s.push(':');
        s.push_str(v);
        s.push('\n');
    }
    s.push('\n');
    s.push_str(&signed_header_names(headers));
    s.push('\n');
    s.push_str(hashed_payload);

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(Method::GET)]
    #[test_case(Method::POST)]
    #[test_case(Method::PUT)]
    #[test_case(Method::PATCH)]
    #[test_case(Method::DELETE)]
    fn test_valid_methods(method: Method) {
        assert!(validate_method(&method).is_ok());
    }

    #[test]
    fn test_unknown_method() {
        let err = validate_method(&Method::HEAD).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
        assert_eq!(
            err.to_string(),
            "Unknown HTTP method: 'HEAD'. Valid methods are: GET, POST, PUT, PATCH, DELETE."
        );
    }

    #[test]
    fn test_canonical_query_sorts_by_key() {
        let params = vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ];
        assert_eq!(canonical_query(&params), "a=1&b=2");
    }

    #[test]
    fn test_canonical_query_empty() {
        assert_eq!(canonical_query(&[]), "");
    }

    #[test]
    fn test_canonical_query_form_encoding() {
        let params = vec![("key".to_string(), "value with spaces".to_string())];
        assert_eq!(canonical_query(&params), "key=value+with+spaces");
    }

    #[test]
    fn test_canonicalize_headers() {
        let headers = canonicalize_headers([
            ("Content-Type", "application/json"),
            ("Accept", " application/json "),
            ("X-Amz-Pay-Region", "jp"),
        ]);
        let entries: Vec<_> = headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("accept", "application/json"),
                ("content-type", "application/json"),
                ("x-amz-pay-region", "jp"),
            ]
        );
    }

    #[test]
    fn test_canonicalize_headers_idempotent() {
        let once = canonicalize_headers([("Content-Type", " application/json ")]);
        let twice =
            canonicalize_headers(once.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonical_request_string() {
        let headers = canonicalize_headers([
            ("content-type", "application/json"),
            ("accept", "application/json"),
            ("x-amz-pay-region", "jp"),
        ]);
        let got = canonical_request_string(
            &Method::POST,
            "/api",
            "param1=value1&param2=value2",
            &headers,
            "hashed_payload",
        );
        assert_eq!(
            got,
            "POST\n\
             /api\n\
             param1=value1&param2=value2\n\
             accept:application/json\n\
             content-type:application/json\n\
             x-amz-pay-region:jp\n\
             \n\
             accept;content-type;x-amz-pay-region\n\
             hashed_payload"
        );
    }

    #[test]
    fn test_canonical_request_string_empty_query_and_headers() {
        let got = canonical_request_string(
            &Method::POST,
            "/api",
            "",
            &CanonicalHeaders::new(),
            "hashed_payload",
        );
        assert_eq!(got, "POST\n/api\n\n\n\nhashed_payload");
    }
}
