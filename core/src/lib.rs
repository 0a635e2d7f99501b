//! Clients for talking to other services: a fluent REST resource client and a
//! message-broker queue client.
//!
//! # Overview
//! `Client` maps chained resource calls onto HTTP requests against one
//! endpoint and normalizes the answers:
//!
//! ```no_run
//! use service_client::{Client, RequestOptions, UreqTransport};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("http://localhost:5000/api/", UreqTransport::new())?;
//! let user = client
//!     .resource(&["users"])
//!     .get(&["42"], RequestOptions::new().key("result"))?;
//! # let _ = user;
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - Requests are built as plain data (`HttpRequest`) and executed by a
//!   `Transport`, so the building and classification halves are testable
//!   without a network.
//! - Responses are classified by `ResponsePolicy`: ok statuses unwrap the
//!   response key, none statuses become `None`, anything else is an error.
//! - Logging goes through an injected `Logger`; nothing is global.
//! - `QueueClient` covers the broker side of a deployment: declare
//!   exchanges and queues, publish messages.

pub mod broker;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod logger;
pub mod resource;
pub mod response;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use broker::{
    BrokerConnection, BrokerError, ConnectionProvider, Destination, ExchangeKind, ExchangeOptions,
    MemoryBroker, Message, QueueClient,
};
pub use client::Client;
pub use config::{ClientBuilder, ClientConfig};
pub use endpoint::Endpoint;
pub use error::{EndpointError, Error, ResponseError, ResponseErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use resource::Resource;
pub use response::ResponsePolicy;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{Query, RequestOptions};
