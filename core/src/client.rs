//! Resource client: request building, dispatch and response handling.
//!
//! # Design
//! `Client` holds only immutable configuration plus a transport, so one
//! instance can serve any number of threads. Every call is split the same
//! way: `build_request` turns a verb, path segments and options into an
//! `HttpRequest` without I/O, the transport executes it, and
//! `handle_response` decodes and classifies the answer. `dispatch` simply
//! chains the three, which keeps both halves testable on their own.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::config::{ClientBuilder, ClientConfig};
use crate::endpoint::Endpoint;
use crate::error::{EndpointError, Error, ResponseError, ResponseErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::logger::{Logger, NoopLogger};
use crate::resource::{verb_methods, Resource};
use crate::response::ResponsePolicy;
use crate::types::{Query, RequestOptions};

/// Fluent REST client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct Client<T> {
    endpoint: Endpoint,
    policy: ResponsePolicy,
    close_slash: bool,
    timeout: Duration,
    logger: Arc<dyn Logger>,
    transport: T,
}

impl Client<()> {
    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }
}

impl<T: Transport> Client<T> {
    /// Client with default classification and slash policies.
    pub fn new(endpoint: &str, transport: T) -> Result<Self, EndpointError> {
        Self::from_config(ClientConfig::new(endpoint), transport)
    }

    pub fn from_config(config: ClientConfig, transport: T) -> Result<Self, EndpointError> {
        Self::with_logger(config, transport, Arc::new(NoopLogger))
    }

    pub fn with_logger(
        config: ClientConfig,
        transport: T,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, EndpointError> {
        let endpoint = Endpoint::parse(&config.endpoint)?;
        logger.debug(format_args!(
            "Client built for endpoint {} and path {}",
            endpoint.origin(),
            endpoint.base_path()
        ));
        Ok(Self {
            endpoint,
            policy: ResponsePolicy {
                ok_statuses: config.ok_statuses,
                to_none_statuses: config.to_none_statuses,
                empty_to_none: config.empty_to_none,
            },
            close_slash: config.close_slash,
            timeout: config.timeout,
            logger,
            transport,
        })
    }

    /// Scheme, host and port of the configured endpoint.
    pub fn endpoint(&self) -> &str {
        self.endpoint.origin()
    }

    /// Path component of the configured endpoint.
    pub fn base_path(&self) -> &str {
        self.endpoint.base_path()
    }

    pub fn ok_statuses(&self) -> &BTreeSet<u16> {
        &self.policy.ok_statuses
    }

    pub fn to_none_statuses(&self) -> &BTreeSet<u16> {
        &self.policy.to_none_statuses
    }

    pub fn empty_to_none(&self) -> bool {
        self.policy.empty_to_none
    }

    pub fn close_slash(&self) -> bool {
        self.close_slash
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a resource chain at `segments`.
    pub fn resource(&self, segments: &[&str]) -> Resource<'_, T> {
        Resource::new(self, segments.iter().map(|s| s.to_string()).collect())
    }

    /// Dispatch any verb at the top level.
    pub fn call(
        &self,
        method: impl Into<HttpMethod>,
        segments: &[&str],
        options: RequestOptions,
    ) -> Result<Option<Value>, Error<T::Error>> {
        let segments = segments.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        self.dispatch(method.into(), &segments, options)
    }

    verb_methods!();

    /// Join path segments into a relative resource (`one/two/three`).
    pub fn build_resource(&self, segments: &[String]) -> String {
        let resource = segments.join("/");
        self.logger
            .debug(format_args!("Resource {resource} built from {segments:?}"));
        resource
    }

    /// Full URL for a relative resource.
    pub fn url_for(&self, resource: &str, query: Option<&Query>) -> String {
        let url = self.endpoint.url_for(resource, query, self.close_slash);
        self.logger
            .debug(format_args!("Url {url} built for resource {resource}"));
        url
    }

    /// Build the request for `method` on `segments` without executing it.
    ///
    /// `key`/`response_key` are not part of the request; read them back with
    /// `RequestOptions::effective_response_key`.
    pub fn build_request(
        &self,
        method: HttpMethod,
        segments: &[String],
        options: &RequestOptions,
    ) -> Result<HttpRequest, serde_json::Error> {
        let resource = self.build_resource(segments);
        let url = self.url_for(&resource, options.query.as_ref());

        let mut headers = options.headers.clone();
        let body = match &options.data {
            Some(data) => {
                let has_content_type = headers
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
                if !has_content_type {
                    headers.push(("content-type".to_string(), "application/json".to_string()));
                }
                Some(serde_json::to_string(data)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: options.timeout.unwrap_or(self.timeout),
        })
    }

    /// Decode and classify a response.
    pub fn handle_response(
        &self,
        response: &HttpResponse,
        response_key: Option<&str>,
    ) -> Result<Option<Value>, ResponseError> {
        let body: Value = match serde_json::from_slice(&response.body) {
            Ok(body) => body,
            Err(err) => {
                self.logger.exception(
                    format_args!("Failed to decode response with status {}", response.status),
                    &err,
                );
                return Err(ResponseError::new(
                    response.status,
                    response.body.clone(),
                    ResponseErrorKind::Decode {
                        message: err.to_string(),
                    },
                ));
            }
        };

        self.policy
            .classify(response.status, body, response_key)
            .map_err(|kind| ResponseError::new(response.status, response.body.clone(), kind))
    }

    /// Build, execute and classify one request.
    pub fn dispatch(
        &self,
        method: HttpMethod,
        segments: &[String],
        options: RequestOptions,
    ) -> Result<Option<Value>, Error<T::Error>> {
        let request = self
            .build_request(method, segments, &options)
            .map_err(Error::Encode)?;
        self.logger
            .info(format_args!("{}: {}", request.method, request.url));

        let response = self
            .transport
            .execute(request)
            .map_err(Error::Transport)?;
        Ok(self.handle_response(&response, options.effective_response_key())?)
    }
}
