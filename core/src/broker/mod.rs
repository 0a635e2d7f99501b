//! Message-broker client.
//!
//! # Overview
//! `QueueClient` declares exchanges and queues and publishes messages through
//! connections acquired from a `ConnectionProvider`. A connection is held
//! only for the duration of one operation and released when dropped; pooling
//! is the provider's business.
//!
//! # Design
//! Exchanges declared through a client are remembered so that
//! `publish_to_exchange` can refuse to publish to an exchange this client
//! never declared. Queues need no registry: publishing to a queue declares it
//! first.

mod memory;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::logger::{Logger, NoopLogger};

pub use memory::{MemoryBroker, MemoryBrokerError, MemoryConnection};

/// Routing algorithm of an exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    #[default]
    Direct,
    Fanout,
    Topic,
    Headers,
}

impl ExchangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeKind::Direct => "direct",
            ExchangeKind::Fanout => "fanout",
            ExchangeKind::Topic => "topic",
            ExchangeKind::Headers => "headers",
        }
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown exchange kind `{0}`")]
pub struct ParseExchangeKindError(String);

impl FromStr for ExchangeKind {
    type Err = ParseExchangeKindError;

    /// `match` is accepted as an alias of `headers`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(ExchangeKind::Direct),
            "fanout" => Ok(ExchangeKind::Fanout),
            "topic" => Ok(ExchangeKind::Topic),
            "headers" | "match" => Ok(ExchangeKind::Headers),
            other => Err(ParseExchangeKindError(other.to_string())),
        }
    }
}

/// Extra exchange flags passed through to the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeOptions {
    pub durable: bool,
    pub auto_delete: bool,
}

impl Default for ExchangeOptions {
    fn default() -> Self {
        Self {
            durable: true,
            auto_delete: false,
        }
    }
}

/// A declared exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSpec {
    pub name: String,
    pub kind: ExchangeKind,
    pub options: ExchangeOptions,
}

/// A JSON payload plus string properties (content type, priority, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub body: Value,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Message {
    pub fn new(body: impl Into<Value>) -> Self {
        Self {
            body: body.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Where a message is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination<'a> {
    Exchange { name: &'a str, routing_key: &'a str },
    /// Straight to a queue through the default exchange.
    Queue(&'a str),
}

/// Operations available on an acquired broker connection.
pub trait BrokerConnection {
    type Error: std::error::Error + Send + Sync + 'static;

    fn declare_exchange(&mut self, exchange: &ExchangeSpec) -> Result<(), Self::Error>;

    fn delete_exchange(&mut self, name: &str) -> Result<(), Self::Error>;

    fn declare_queue(&mut self, name: &str) -> Result<(), Self::Error>;

    fn bind(&mut self, queue: &str, exchange: &str, routing_key: &str) -> Result<(), Self::Error>;

    fn publish(&mut self, destination: Destination<'_>, message: Message) -> Result<(), Self::Error>;

    /// Drop every pending message; returns how many were dropped.
    fn purge_queue(&mut self, name: &str) -> Result<usize, Self::Error>;

    fn delete_queue(&mut self, name: &str) -> Result<(), Self::Error>;
}

/// Hands out scoped connections.
pub trait ConnectionProvider: Send + Sync {
    type Connection: BrokerConnection;

    fn acquire(
        &self,
    ) -> Result<Self::Connection, <Self::Connection as BrokerConnection>::Error>;
}

type ConnectionError<P> =
    <<P as ConnectionProvider>::Connection as BrokerConnection>::Error;

#[derive(Debug, Error)]
pub enum BrokerError<E: std::error::Error + 'static> {
    #[error("exchange `{0}` was not declared by this client")]
    UnknownExchange(String),

    #[error(transparent)]
    Connection(E),
}

type BrokerResult<T, P> = Result<T, BrokerError<ConnectionError<P>>>;

/// Declares and publishes through a `ConnectionProvider`.
#[derive(Debug)]
pub struct QueueClient<P> {
    provider: P,
    exchanges: Mutex<HashMap<String, ExchangeSpec>>,
    logger: Arc<dyn Logger>,
}

impl<P: ConnectionProvider> QueueClient<P> {
    pub fn new(provider: P) -> Self {
        Self::with_logger(provider, Arc::new(NoopLogger))
    }

    pub fn with_logger(provider: P, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider,
            exchanges: Mutex::new(HashMap::new()),
            logger,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Declare (or redeclare) an exchange and bind `queues` to it.
    ///
    /// Each entry of `queues` is `(queue_name, routing_key)`; the queue is
    /// declared before it is bound.
    pub fn declare_exchange(
        &self,
        name: &str,
        kind: ExchangeKind,
        queues: &[(&str, &str)],
        options: ExchangeOptions,
    ) -> BrokerResult<(), P> {
        let spec = ExchangeSpec {
            name: name.to_string(),
            kind,
            options,
        };
        let mut conn = self.acquire()?;
        conn.declare_exchange(&spec).map_err(BrokerError::Connection)?;
        self.logger
            .debug(format_args!("Exchange {name} declared as {kind}"));
        self.registry().insert(name.to_string(), spec);

        for (queue, routing_key) in queues {
            conn.declare_queue(queue).map_err(BrokerError::Connection)?;
            conn.bind(queue, name, routing_key)
                .map_err(BrokerError::Connection)?;
            self.logger.debug(format_args!(
                "Queue {queue} bound to {name} with routing key {routing_key}"
            ));
        }
        Ok(())
    }

    pub fn delete_exchange(&self, name: &str) -> BrokerResult<(), P> {
        self.registry().remove(name);
        let mut conn = self.acquire()?;
        conn.delete_exchange(name).map_err(BrokerError::Connection)
    }

    pub fn purge_queue(&self, name: &str) -> BrokerResult<usize, P> {
        let mut conn = self.acquire()?;
        conn.purge_queue(name).map_err(BrokerError::Connection)
    }

    pub fn delete_queue(&self, name: &str) -> BrokerResult<(), P> {
        let mut conn = self.acquire()?;
        conn.delete_queue(name).map_err(BrokerError::Connection)
    }

    /// Publishing handle for an exchange with a default routing key.
    pub fn exchange(&self, name: &str, routing_key: Option<&str>) -> Exchange<'_, P> {
        Exchange {
            client: self,
            name: name.to_string(),
            routing_key: routing_key.map(str::to_string),
        }
    }

    /// Publishing handle for a queue.
    pub fn queue(&self, name: &str) -> Queue<'_, P> {
        Queue {
            client: self,
            name: name.to_string(),
        }
    }

    pub fn publish_to_exchange(
        &self,
        name: &str,
        routing_key: &str,
        message: Message,
    ) -> BrokerResult<(), P> {
        if !self.registry().contains_key(name) {
            return Err(BrokerError::UnknownExchange(name.to_string()));
        }
        let mut conn = self.acquire()?;
        self.logger
            .info(format_args!("publish to exchange {name} with routing key {routing_key}"));
        conn.publish(Destination::Exchange { name, routing_key }, message)
            .map_err(BrokerError::Connection)
    }

    pub fn publish_to_queue(&self, name: &str, message: Message) -> BrokerResult<(), P> {
        let mut conn = self.acquire()?;
        conn.declare_queue(name).map_err(BrokerError::Connection)?;
        self.logger.info(format_args!("publish to queue {name}"));
        conn.publish(Destination::Queue(name), message)
            .map_err(BrokerError::Connection)
    }

    fn acquire(&self) -> BrokerResult<P::Connection, P> {
        self.provider.acquire().map_err(BrokerError::Connection)
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<String, ExchangeSpec>> {
        self.exchanges.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exchange publishing handle returned by `QueueClient::exchange`.
#[derive(Debug)]
pub struct Exchange<'a, P> {
    client: &'a QueueClient<P>,
    name: String,
    routing_key: Option<String>,
}

impl<P: ConnectionProvider> Exchange<'_, P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publish with `routing_key`, or the handle's default when `None`.
    pub fn publish(&self, message: Message, routing_key: Option<&str>) -> BrokerResult<(), P> {
        let routing_key = routing_key
            .or(self.routing_key.as_deref())
            .unwrap_or_default();
        self.client
            .publish_to_exchange(&self.name, routing_key, message)
    }
}

/// Queue publishing handle returned by `QueueClient::queue`.
#[derive(Debug)]
pub struct Queue<'a, P> {
    client: &'a QueueClient<P>,
    name: String,
}

impl<P: ConnectionProvider> Queue<'_, P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn publish(&self, message: Message) -> BrokerResult<(), P> {
        self.client.publish_to_queue(&self.name, message)
    }
}
