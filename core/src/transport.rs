//! Blocking `Transport` backed by `ureq`.

use crate::http::{HttpRequest, HttpResponse, Transport};

/// Executes requests with a fresh `ureq` agent per call.
///
/// Status codes are returned as data rather than errors so the client can
/// classify them, non-standard verbs are allowed, and the request timeout is
/// applied to the whole round trip. Bodies are read without a size cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    type Error = ureq::Error;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .timeout_global(Some(request.timeout))
            .build()
            .new_agent();

        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = match request.body {
            Some(body) => agent.run(builder.body(body)?)?,
            None => agent.run(builder.body(())?)?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
