//! # Endpoint Manager
//!
//! Registers named endpoints for one federate and routes deliveries into
//! their queues. Endpoint records live in an [`InterfaceRegistry`]; each
//! queue sits behind its own mutex, so deliveries to different endpoints
//! never contend and access to any one queue is serialised.

use crate::adapters::operators::OperatorChain;
use crate::config::EndpointConfig;
use crate::domain::errors::EndpointError;
use crate::domain::message::Message;
use crate::domain::queue::EndpointQueue;
use crate::ports::operator::MessageOperator;
use cs_01_interface_registry::InterfaceRegistry;
use parking_lot::Mutex;
use shared_types::{FederateId, InterfaceHandle, Time};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

struct EndpointRecord {
    /// Registered key; empty for anonymous endpoints
    name: String,

    /// Declared payload type, informational only
    type_name: String,

    /// Messages awaiting retrieval, locked independently of the registry
    queue: Mutex<EndpointQueue>,

    /// Applied to each delivery before it is queued
    operator: Option<Arc<dyn MessageOperator>>,

    /// Target used by `send`
    default_destination: String,
}

/// Endpoints owned by one federate.
pub struct EndpointManager {
    fed_id: FederateId,
    config: EndpointConfig,
    endpoints: InterfaceRegistry<EndpointRecord>,
    /// Next handle to hand out; handles are local to this manager
    next_handle: AtomicI32,
}

impl EndpointManager {
    pub fn new(fed_id: FederateId, config: EndpointConfig) -> Self {
        Self {
            fed_id,
            config,
            endpoints: InterfaceRegistry::new("endpoint"),
            next_handle: AtomicI32::new(0),
        }
    }

    pub fn federate_id(&self) -> FederateId {
        self.fed_id
    }

    /// Register an endpoint. An empty name creates an anonymous endpoint
    /// reachable only through its handle.
    pub fn register_endpoint(
        &self,
        name: &str,
        type_name: &str,
    ) -> Result<InterfaceHandle, EndpointError> {
        let handle = InterfaceHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let record = EndpointRecord {
            name: name.to_string(),
            type_name: type_name.to_string(),
            queue: Mutex::new(EndpointQueue::new()),
            operator: None,
            default_destination: String::new(),
        };
        self.endpoints
            .insert(name, handle, self.fed_id, record)
            .map(|_| handle)
            .ok_or_else(|| EndpointError::DuplicateEndpoint(name.to_string()))
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn handle_of(&self, name: &str) -> Option<InterfaceHandle> {
        let index = self.endpoints.index_of_name(name)?;
        self.endpoints.handle_at(index)
    }

    pub fn name_of(&self, handle: InterfaceHandle) -> Option<String> {
        self.endpoints.with_handle(handle, |rec| rec.name.clone())
    }

    pub fn type_of(&self, name: &str) -> Option<String> {
        self.endpoints.with_name(name, |rec| rec.type_name.clone())
    }

    /// Install (or replace) the operator applied to deliveries for `name`.
    pub fn set_operator(
        &self,
        name: &str,
        operator: impl MessageOperator + 'static,
    ) -> Result<(), EndpointError> {
        let operator: Arc<dyn MessageOperator> = Arc::new(operator);
        self.modify(name, |rec| rec.operator = Some(operator))
    }

    /// Append an operator after any already installed on `name`.
    pub fn add_operator(
        &self,
        name: &str,
        operator: impl MessageOperator + 'static,
    ) -> Result<(), EndpointError> {
        let operator: Arc<dyn MessageOperator> = Arc::new(operator);
        self.modify(name, |rec| {
            let mut chain = OperatorChain::new();
            if let Some(existing) = rec.operator.take() {
                chain.push(existing);
            }
            chain.push(operator);
            rec.operator = Some(Arc::new(chain));
        })
    }

    pub fn set_default_destination(
        &self,
        name: &str,
        destination: &str,
    ) -> Result<(), EndpointError> {
        self.modify(name, |rec| rec.default_destination = destination.to_string())
    }

    pub fn default_destination(&self, name: &str) -> Result<String, EndpointError> {
        self.endpoints
            .with_name(name, |rec| rec.default_destination.clone())
            .ok_or_else(|| EndpointError::UnknownEndpoint(name.to_string()))
    }

    fn modify(
        &self,
        name: &str,
        f: impl FnOnce(&mut EndpointRecord),
    ) -> Result<(), EndpointError> {
        let index = self
            .endpoints
            .index_of_name(name)
            .ok_or_else(|| EndpointError::UnknownEndpoint(name.to_string()))?;
        self.endpoints
            .modify_index(index, f)
            .ok_or_else(|| EndpointError::UnknownEndpoint(name.to_string()))
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    /// Queue a message on its destination endpoint.
    ///
    /// Returns `Ok(false)` when the endpoint's operator dropped the message
    /// or the queue is full. The operator runs with no registry lock held,
    /// so it may itself deliver or register endpoints.
    pub fn deliver(&self, message: Message) -> Result<bool, EndpointError> {
        let destination = message.destination.clone();
        let index = self
            .endpoints
            .index_of_name(&destination)
            .ok_or_else(|| EndpointError::UnknownEndpoint(destination.clone()))?;
        let operator = self
            .endpoints
            .with_index(index, |rec| rec.operator.clone())
            .ok_or_else(|| EndpointError::UnknownEndpoint(destination.clone()))?;

        let message = match operator {
            Some(op) => match op.process(message) {
                Some(message) => message,
                None => {
                    debug!(endpoint = destination, "Operator dropped message");
                    return Ok(false);
                }
            },
            None => message,
        };

        let accepted = self
            .endpoints
            .with_index(index, |rec| {
                let mut queue = rec.queue.lock();
                if !self.config.accepts(queue.len()) {
                    warn!(
                        endpoint = rec.name,
                        depth = queue.len(),
                        source = message.source,
                        "Endpoint queue full; dropping message"
                    );
                    return false;
                }
                queue.add_message(message);
                true
            })
            .ok_or_else(|| EndpointError::UnknownEndpoint(destination.clone()))?;

        debug!(endpoint = destination, accepted, "Delivered message");
        Ok(accepted)
    }

    /// Send from `source` to its default destination.
    pub fn send(
        &self,
        source: &str,
        payload: impl Into<Vec<u8>>,
        time: Time,
    ) -> Result<bool, EndpointError> {
        let destination = self.default_destination(source)?;
        self.deliver(Message::new(source, destination, payload, time))
    }

    /// Pop the next message on `name` due by `max_time`.
    pub fn get_message(
        &self,
        name: &str,
        max_time: Time,
    ) -> Result<Option<Message>, EndpointError> {
        self.endpoints
            .with_name(name, |rec| rec.queue.lock().get_message(max_time))
            .ok_or_else(|| EndpointError::UnknownEndpoint(name.to_string()))
    }

    /// Pop the earliest due message across all endpoints.
    pub fn get_any_message(&self, max_time: Time) -> Option<Message> {
        let store = self.endpoints.read();
        let earliest = store
            .iter()
            .min_by_key(|rec| rec.queue.lock().first_message_time())?;
        let msg = earliest.queue.lock().get_message(max_time);
        msg
    }

    /// Messages on `name` due by `max_time`.
    pub fn pending_count(&self, name: &str, max_time: Time) -> Result<usize, EndpointError> {
        self.endpoints
            .with_name(name, |rec| rec.queue.lock().queue_size(max_time))
            .ok_or_else(|| EndpointError::UnknownEndpoint(name.to_string()))
    }

    /// Messages due by `max_time` across all endpoints.
    pub fn total_pending(&self, max_time: Time) -> usize {
        self.endpoints
            .read()
            .iter()
            .map(|rec| rec.queue.lock().queue_size(max_time))
            .sum()
    }

    /// Earliest queued time across all endpoints, or [`Time::MAX`].
    pub fn earliest_message_time(&self) -> Time {
        self.endpoints
            .read()
            .iter()
            .map(|rec| rec.queue.lock().first_message_time())
            .min()
            .unwrap_or(Time::MAX)
    }

    pub fn clear(&self, name: &str) -> Result<(), EndpointError> {
        self.endpoints
            .with_name(name, |rec| rec.queue.lock().clear())
            .ok_or_else(|| EndpointError::UnknownEndpoint(name.to_string()))
    }
}
