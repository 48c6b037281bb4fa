//! Edge authenticator: the per-request HTTP Basic Authentication decision.
//!
//! Runs on every request at every edge location, so the decision is a pure
//! function of its single input: no remote calls, no session state, no
//! suspension point. The configured credentials arrive through the origin's
//! custom headers -- the sole credential transport from provisioning time
//! into the running function.
//!
//! Comparison strategy: encode-then-compare. The expected
//! `Basic base64(user:pass)` string is computed from the configured
//! credentials and matched for exact equality against the presented
//! `authorization` value. Malformed base64 in the presented header simply
//! fails equality, so the input domain is total: every possible request maps
//! to forward or 401, never an internal error.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use cachefront_types::edge::{
    EdgeDecision, EdgeEvent, EdgeRequest, EdgeResponse, HeaderEntry, Headers,
};
use thiserror::Error;

/// Lower-cased custom header names as they appear in the request context.
pub const USERNAME_HEADER: &str = "x-basic-auth-username";
pub const PASSWORD_HEADER: &str = "x-basic-auth-password";

/// Display-cased names used when declaring the headers on the origin.
pub const USERNAME_HEADER_NAME: &str = "X-Basic-Auth-Username";
pub const PASSWORD_HEADER_NAME: &str = "X-Basic-Auth-Password";

/// Errors at the event-envelope boundary. The decision itself never fails.
#[derive(Debug, Error)]
pub enum EdgeEventError {
    #[error("event contains no records")]
    NoRecords,
}

/// The `authorization` value an RFC 7617 client sends for this pair.
pub fn basic_authorization(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}

/// Decode an RFC 7617 `authorization` value back into its credential pair.
///
/// The counterpart comparison strategy: functionally equivalent to
/// [`basic_authorization`] + equality for every well-formed input. The
/// decision path does not use it (see module docs); it exists for tooling
/// and to pin the round-trip property in tests.
pub fn decode_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Decide pass-through or rejection for one request.
///
/// Forward the original request, unmodified, only when the presented
/// `authorization` header exactly equals the expected encoding of the
/// configured credentials. Everything else -- missing header, wrong value,
/// malformed encoding -- is the rejection path. A request whose origin
/// carries no configured credentials is rejected too: provisioning never
/// attaches this function to such a distribution, so that input is only
/// reachable through misconfiguration, and failing closed never admits
/// unauthenticated traffic.
pub fn authenticate(request: EdgeRequest) -> EdgeDecision {
    let Some((username, password)) = configured_credentials(&request) else {
        return EdgeDecision::Reject(unauthorized());
    };

    let expected = basic_authorization(&username, &password);
    let matches = header_value(&request.headers, "authorization") == Some(expected.as_str());
    if matches {
        EdgeDecision::Forward(request)
    } else {
        EdgeDecision::Reject(unauthorized())
    }
}

/// Unwrap the event envelope and run [`authenticate`] on its request.
pub fn handle_event(event: EdgeEvent) -> Result<EdgeDecision, EdgeEventError> {
    let record = event.records.into_iter().next().ok_or(EdgeEventError::NoRecords)?;
    Ok(authenticate(record.cf.request))
}

fn configured_credentials(request: &EdgeRequest) -> Option<(String, String)> {
    let custom = &request.origin.as_ref()?.s3.as_ref()?.custom_headers;
    let username = header_value(custom, USERNAME_HEADER)?;
    let password = header_value(custom, PASSWORD_HEADER)?;
    Some((username.to_string(), password.to_string()))
}

/// First value under a lower-cased header name, if any.
fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers.get(name)?.first().map(|entry| entry.value.as_str())
}

fn unauthorized() -> EdgeResponse {
    let mut headers = Headers::new();
    headers.insert(
        "www-authenticate".to_string(),
        vec![HeaderEntry::new("WWW-Authenticate", "Basic")],
    );
    EdgeResponse {
        status: "401".to_string(),
        status_description: "Unauthorized".to_string(),
        headers,
    }
}
