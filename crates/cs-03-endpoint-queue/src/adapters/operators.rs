//! # Message Operators
//!
//! Closures wrapped as [`MessageOperator`]s: rewrite the delivery time,
//! rewrite the payload, or drop messages failing a predicate. Operators
//! compose with [`OperatorChain`].

use crate::domain::message::Message;
use crate::ports::operator::MessageOperator;
use shared_types::Time;
use std::sync::Arc;

type TimeFn = dyn Fn(Time) -> Time + Send + Sync;
type DataFn = dyn Fn(&[u8]) -> Vec<u8> + Send + Sync;
type ConditionFn = dyn Fn(&Message) -> bool + Send + Sync;

/// Rewrites the delivery time; without a function, messages pass unchanged.
#[derive(Clone, Default)]
pub struct MessageTimeOperator {
    time_fn: Option<Arc<TimeFn>>,
}

impl MessageTimeOperator {
    pub fn new(f: impl Fn(Time) -> Time + Send + Sync + 'static) -> Self {
        Self {
            time_fn: Some(Arc::new(f)),
        }
    }

    pub fn set_time_function(&mut self, f: impl Fn(Time) -> Time + Send + Sync + 'static) {
        self.time_fn = Some(Arc::new(f));
    }
}

impl MessageOperator for MessageTimeOperator {
    fn process(&self, mut message: Message) -> Option<Message> {
        if let Some(f) = &self.time_fn {
            message.time = f(message.time);
        }
        Some(message)
    }
}

/// Rewrites the payload; routing fields and time are preserved.
#[derive(Clone, Default)]
pub struct MessageDataOperator {
    data_fn: Option<Arc<DataFn>>,
}

impl MessageDataOperator {
    pub fn new(f: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static) -> Self {
        Self {
            data_fn: Some(Arc::new(f)),
        }
    }

    pub fn set_data_function(&mut self, f: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static) {
        self.data_fn = Some(Arc::new(f));
    }
}

impl MessageOperator for MessageDataOperator {
    fn process(&self, mut message: Message) -> Option<Message> {
        if let Some(f) = &self.data_fn {
            message.payload = f(&message.payload);
        }
        Some(message)
    }
}

/// Keeps only messages for which the predicate holds.
#[derive(Clone)]
pub struct MessageConditionalOperator {
    condition: Arc<ConditionFn>,
}

impl MessageConditionalOperator {
    pub fn new(condition: impl Fn(&Message) -> bool + Send + Sync + 'static) -> Self {
        Self {
            condition: Arc::new(condition),
        }
    }
}

impl MessageOperator for MessageConditionalOperator {
    fn process(&self, message: Message) -> Option<Message> {
        (self.condition)(&message).then_some(message)
    }
}

/// Applies operators in order; stops as soon as one drops the message.
#[derive(Clone, Default)]
pub struct OperatorChain {
    operators: Vec<Arc<dyn MessageOperator>>,
}

impl OperatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, operator: impl MessageOperator + 'static) -> Self {
        self.operators.push(Arc::new(operator));
        self
    }

    pub fn push(&mut self, operator: Arc<dyn MessageOperator>) {
        self.operators.push(operator);
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl MessageOperator for OperatorChain {
    fn process(&self, message: Message) -> Option<Message> {
        self.operators
            .iter()
            .try_fold(message, |msg, op| op.process(msg))
    }
}
