//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `Client::build_request` produces an
//! `HttpRequest` without touching the network and `Client::handle_response`
//! interprets an `HttpResponse`; the round trip in between belongs to a
//! `Transport`. Tests plug in canned transports, production code uses
//! `UreqTransport`.
//!
//! All fields use owned types (`String`, `Vec`) so values can be queued,
//! recorded or moved across threads without lifetime concerns.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// HTTP method for a request.
///
/// The common verbs have their own variants; any other verb string is kept
/// verbatim in `Other`, so the verb space stays open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Other(String),
}

impl HttpMethod {
    /// Upper-case wire representation of the method.
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other(verb) => verb,
        }
    }
}

impl From<&str> for HttpMethod {
    /// Verb names are matched case-insensitively; unknown verbs are
    /// upper-cased into `Other`.
    fn from(verb: &str) -> Self {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            other => HttpMethod::Other(other.to_string()),
        }
    }
}

impl From<String> for HttpMethod {
    fn from(verb: String) -> Self {
        HttpMethod::from(verb.as_str())
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `Client::build_request`. The response key used to interpret the
/// answer is not part of the request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Returned by a `Transport` after executing an `HttpRequest`; `body` holds
/// the raw content exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Executes `HttpRequest` values against the network.
///
/// Implementations must return non-2xx responses as data; only failures to
/// complete the round trip (connectivity, timeouts) are errors. Those errors
/// reach the caller of `Client::dispatch` unchanged.
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Error = T::Error;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    type Error = T::Error;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_verbs_parse_case_insensitively() {
        assert_eq!(HttpMethod::from("get"), HttpMethod::Get);
        assert_eq!(HttpMethod::from("Patch"), HttpMethod::Patch);
        assert_eq!(HttpMethod::from("OPTIONS"), HttpMethod::Options);
    }

    #[test]
    fn unknown_verbs_are_kept_upper_cased() {
        let method = HttpMethod::from("purge");
        assert_eq!(method, HttpMethod::Other("PURGE".to_string()));
        assert_eq!(method.to_string(), "PURGE");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: "http://localhost/".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("accept"), None);
    }
}
