//! Append-only message log for one intake conversation.
//!
//! `Transcript` has no removal or in-place mutation API: the only way to change
//! it is to push a new `Message`, which receives the next monotonic id and the
//! current UTC timestamp. Insertion order is display order.

use chrono::Utc;

use crate::types::{LoanResult, Message, MessageKind};

#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user-authored message and returns a reference to it.
    pub fn push_user(&mut self, content: impl Into<String>) -> &Message {
        self.push(MessageKind::User, content.into(), None)
    }

    /// Appends a bot-authored message and returns a reference to it.
    pub fn push_bot(&mut self, content: impl Into<String>) -> &Message {
        self.push(MessageKind::Bot, content.into(), None)
    }

    /// Appends a decision card. Result entries carry no text content.
    pub fn push_result(&mut self, result: LoanResult) -> &Message {
        self.push(MessageKind::Result, String::new(), Some(result))
    }

    fn push(&mut self, kind: MessageKind, content: String, result: Option<LoanResult>) -> &Message {
        self.next_id += 1;
        self.messages.push(Message {
            id: self.next_id,
            kind,
            content,
            timestamp: Utc::now(),
            result,
        });
        // just pushed
        &self.messages[self.messages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Read-only view of every message in display order.
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
