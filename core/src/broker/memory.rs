//! In-process broker used by tests and local development.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use super::{BrokerConnection, ConnectionProvider, Destination, ExchangeKind, ExchangeSpec, Message};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryBrokerError {
    #[error("exchange `{0}` does not exist")]
    UnknownExchange(String),

    #[error("queue `{0}` does not exist")]
    UnknownQueue(String),

    #[error("exchange `{name}` already declared as {existing}")]
    KindMismatch { name: String, existing: ExchangeKind },
}

#[derive(Debug, Default)]
struct State {
    exchanges: HashMap<String, ExchangeKind>,
    bindings: Vec<Binding>,
    queues: HashMap<String, VecDeque<Message>>,
}

#[derive(Debug, Clone)]
struct Binding {
    queue: String,
    exchange: String,
    routing_key: String,
}

/// Shared in-memory broker. Clones share the same state.
///
/// Headers exchanges are routed like fanout exchanges.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<State>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest message of `queue`.
    pub fn receive(&self, queue: &str) -> Option<Message> {
        self.lock().queues.get_mut(queue)?.pop_front()
    }

    /// Number of messages waiting in `queue`; zero for unknown queues.
    pub fn pending(&self, queue: &str) -> usize {
        self.lock().queues.get(queue).map_or(0, VecDeque::len)
    }

    pub fn has_exchange(&self, name: &str) -> bool {
        self.lock().exchanges.contains_key(name)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConnectionProvider for MemoryBroker {
    type Connection = MemoryConnection;

    fn acquire(&self) -> Result<MemoryConnection, MemoryBrokerError> {
        Ok(MemoryConnection {
            broker: self.clone(),
        })
    }
}

/// Connection handed out by `MemoryBroker::acquire`.
#[derive(Debug)]
pub struct MemoryConnection {
    broker: MemoryBroker,
}

impl BrokerConnection for MemoryConnection {
    type Error = MemoryBrokerError;

    fn declare_exchange(&mut self, exchange: &ExchangeSpec) -> Result<(), Self::Error> {
        let mut state = self.broker.lock();
        if let Some(existing) = state.exchanges.get(&exchange.name).copied() {
            if existing != exchange.kind {
                return Err(MemoryBrokerError::KindMismatch {
                    name: exchange.name.clone(),
                    existing,
                });
            }
        }
        state.exchanges.insert(exchange.name.clone(), exchange.kind);
        Ok(())
    }

    fn delete_exchange(&mut self, name: &str) -> Result<(), Self::Error> {
        let mut state = self.broker.lock();
        if state.exchanges.remove(name).is_none() {
            return Err(MemoryBrokerError::UnknownExchange(name.to_string()));
        }
        state.bindings.retain(|b| b.exchange != name);
        Ok(())
    }

    fn declare_queue(&mut self, name: &str) -> Result<(), Self::Error> {
        self.broker
            .lock()
            .queues
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    fn bind(&mut self, queue: &str, exchange: &str, routing_key: &str) -> Result<(), Self::Error> {
        let mut state = self.broker.lock();
        if !state.exchanges.contains_key(exchange) {
            return Err(MemoryBrokerError::UnknownExchange(exchange.to_string()));
        }
        if !state.queues.contains_key(queue) {
            return Err(MemoryBrokerError::UnknownQueue(queue.to_string()));
        }
        let exists = state.bindings.iter().any(|b| {
            b.queue == queue && b.exchange == exchange && b.routing_key == routing_key
        });
        if !exists {
            state.bindings.push(Binding {
                queue: queue.to_string(),
                exchange: exchange.to_string(),
                routing_key: routing_key.to_string(),
            });
        }
        Ok(())
    }

    fn publish(&mut self, destination: Destination<'_>, message: Message) -> Result<(), Self::Error> {
        let mut state = self.broker.lock();
        let targets: Vec<String> = match destination {
            Destination::Queue(name) => {
                if !state.queues.contains_key(name) {
                    return Err(MemoryBrokerError::UnknownQueue(name.to_string()));
                }
                vec![name.to_string()]
            }
            Destination::Exchange { name, routing_key } => {
                let kind = *state
                    .exchanges
                    .get(name)
                    .ok_or_else(|| MemoryBrokerError::UnknownExchange(name.to_string()))?;
                let mut targets: Vec<String> = state
                    .bindings
                    .iter()
                    .filter(|b| b.exchange == name && routes(kind, &b.routing_key, routing_key))
                    .map(|b| b.queue.clone())
                    .collect();
                targets.sort();
                targets.dedup();
                targets
            }
        };

        for queue in targets {
            if let Some(pending) = state.queues.get_mut(&queue) {
                pending.push_back(message.clone());
            }
        }
        Ok(())
    }

    fn purge_queue(&mut self, name: &str) -> Result<usize, Self::Error> {
        let mut state = self.broker.lock();
        let pending = state
            .queues
            .get_mut(name)
            .ok_or_else(|| MemoryBrokerError::UnknownQueue(name.to_string()))?;
        let purged = pending.len();
        pending.clear();
        Ok(purged)
    }

    fn delete_queue(&mut self, name: &str) -> Result<(), Self::Error> {
        let mut state = self.broker.lock();
        if state.queues.remove(name).is_none() {
            return Err(MemoryBrokerError::UnknownQueue(name.to_string()));
        }
        state.bindings.retain(|b| b.queue != name);
        Ok(())
    }
}

fn routes(kind: ExchangeKind, binding_key: &str, routing_key: &str) -> bool {
    match kind {
        ExchangeKind::Direct => binding_key == routing_key,
        ExchangeKind::Fanout | ExchangeKind::Headers => true,
        ExchangeKind::Topic => {
            let pattern: Vec<&str> = binding_key.split('.').collect();
            let words: Vec<&str> = routing_key.split('.').collect();
            topic_matches(&pattern, &words)
        }
    }
}

/// AMQP topic matching: `*` is exactly one word, `#` zero or more.
fn topic_matches(pattern: &[&str], words: &[&str]) -> bool {
    match pattern.split_first() {
        None => words.is_empty(),
        Some((&"#", rest)) => (0..=words.len()).any(|skip| topic_matches(rest, &words[skip..])),
        Some((&head, rest)) => match words.split_first() {
            Some((&word, tail)) => (head == "*" || head == word) && topic_matches(rest, tail),
            None => false,
        },
    }
}
