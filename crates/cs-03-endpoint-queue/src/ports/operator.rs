//! Message operator port.

use crate::domain::message::Message;

/// Transformation applied to a message before it is queued.
///
/// Returning `None` drops the message.
pub trait MessageOperator: Send + Sync {
    fn process(&self, message: Message) -> Option<Message>;
}
