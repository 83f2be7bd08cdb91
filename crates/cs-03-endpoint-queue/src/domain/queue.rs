//! # Endpoint Queue
//!
//! Per-endpoint buffer kept sorted ascending by `(time, original_source)`.
//! Insertion re-sorts the whole buffer; the sort is stable, so messages with
//! equal keys leave in arrival order.

use crate::domain::message::Message;
use shared_types::Time;
use std::cmp::Ordering;
use std::collections::VecDeque;

fn delivery_order(a: &Message, b: &Message) -> Ordering {
    a.time
        .cmp(&b.time)
        .then_with(|| a.original_source.cmp(&b.original_source))
}

#[derive(Debug, Clone, Default)]
pub struct EndpointQueue {
    /// Sorted by `(time, original_source)`; equal keys keep arrival order.
    messages: VecDeque<Message>,
}

impl EndpointQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push_back(message);
        self.messages.make_contiguous().sort_by(delivery_order);
    }

    /// Remove the front message if it is due by `max_time`. Never blocks.
    pub fn get_message(&mut self, max_time: Time) -> Option<Message> {
        if self.messages.front()?.time <= max_time {
            self.messages.pop_front()
        } else {
            None
        }
    }

    /// Messages due by `max_time`, without removing them.
    pub fn queue_size(&self, max_time: Time) -> usize {
        self.messages
            .iter()
            .take_while(|m| m.time <= max_time)
            .count()
    }

    /// Earliest queued time, or [`Time::MAX`] when empty.
    pub fn first_message_time(&self) -> Time {
        self.messages.front().map_or(Time::MAX, |m| m.time)
    }

    pub fn peek(&self) -> Option<&Message> {
        self.messages.front()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}
