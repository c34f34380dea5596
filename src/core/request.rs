use std::time::SystemTime;

use base64::Engine;
use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue, AUTHORIZATION, COOKIE};
use hyper::{HeaderMap, Method, Uri};

use crate::utils::generate_id;

/// An outbound call being prepared for one backend instance.
///
/// Authentication commands mutate this before the forwarding engine sends it;
/// it is owned by the single in-flight call and never shared.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// HTTP method
    pub method: Method,

    /// Request URI
    pub uri: Uri,

    /// HTTP headers
    pub headers: HeaderMap,

    /// Request body
    pub body: Bytes,

    /// Request timestamp
    pub timestamp: SystemTime,

    /// Request ID for tracing
    pub request_id: String,
}

impl OutboundRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            timestamp: SystemTime::now(),
            request_id: generate_id(),
        }
    }

    /// Get a header value as a string
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }

    /// Set a header, replacing any previous value
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let (Ok(name), Ok(value)) = (
            name.parse::<HeaderName>(),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
    }

    /// Attach a bearer token in the Authorization header
    pub fn set_bearer(&mut self, token: &str) {
        self.set_header(AUTHORIZATION.as_str(), &format!("Bearer {token}"));
    }

    /// Attach HTTP Basic credentials in the Authorization header
    pub fn set_basic_auth(&mut self, username: &str, password: &str) {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        self.set_header(AUTHORIZATION.as_str(), &format!("Basic {encoded}"));
    }

    /// Read one cookie from the Cookie header
    pub fn cookie(&self, name: &str) -> Option<String> {
        let cookies = self.header(COOKIE.as_str())?;
        cookies.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    /// Remove one cookie from the Cookie header, dropping the header when it
    /// becomes empty
    pub fn remove_cookie(&mut self, name: &str) {
        let Some(cookies) = self.header(COOKIE.as_str()) else {
            return;
        };

        let remaining = cookies
            .split(';')
            .map(str::trim)
            .filter(|pair| {
                pair.split_once('=')
                    .map(|(key, _)| key != name)
                    .unwrap_or(true)
            })
            .collect::<Vec<_>>()
            .join("; ");

        if remaining.is_empty() {
            self.headers.remove(COOKIE);
        } else {
            self.set_header(COOKIE.as_str(), &remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> OutboundRequest {
        OutboundRequest::new(
            Method::GET,
            Uri::from_static("http://example.com/svc/api/v1/accounts"),
            HeaderMap::new(),
            Bytes::new(),
        )
    }

    #[test]
    fn test_new_assigns_request_id() {
        let a = request();
        let b = request();
        assert!(!a.request_id.is_empty());
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_set_bearer() {
        let mut req = request();
        req.set_bearer("token123");
        assert_eq!(req.header("authorization").as_deref(), Some("Bearer token123"));
    }

    #[test]
    fn test_set_basic_auth() {
        let mut req = request();
        req.set_basic_auth("USER1", "ticket");
        // base64("USER1:ticket")
        assert_eq!(
            req.header("authorization").as_deref(),
            Some("Basic VVNFUjE6dGlja2V0")
        );
    }

    #[test]
    fn test_cookie_round_trip() {
        let mut req = request();
        req.set_header("cookie", "a=1; gwSessionToken=abc; b=2");

        assert_eq!(req.cookie("gwSessionToken").as_deref(), Some("abc"));
        assert_eq!(req.cookie("missing"), None);

        req.remove_cookie("gwSessionToken");
        assert_eq!(req.cookie("gwSessionToken"), None);
        assert_eq!(req.header("cookie").as_deref(), Some("a=1; b=2"));
    }

    #[test]
    fn test_remove_last_cookie_drops_header() {
        let mut req = request();
        req.set_header("cookie", "gwSessionToken=abc");
        req.remove_cookie("gwSessionToken");
        assert_eq!(req.header("cookie"), None);
    }
}
