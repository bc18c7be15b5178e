/// Open-conversation history
///
/// Exactly one conversation's messages are held at a time; selecting another
/// conversation replaces the whole list. Live events racing the history
/// fetch are made deterministic by de-duplicating on message id and ordering
/// on (sent_at, id).
use crate::chat::types::ChatMessage;
use std::collections::HashSet;

#[derive(Default)]
pub struct MessageStore {
    conversation_id: Option<String>,
    messages: Vec<ChatMessage>,
    scroll_to_bottom: bool,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a conversation and replace the history wholesale.
    pub fn open(&mut self, conversation_id: impl Into<String>, history: Vec<ChatMessage>) {
        self.conversation_id = Some(conversation_id.into());
        self.messages = history;
        normalize(&mut self.messages);
        self.scroll_to_bottom = true;
    }

    pub fn close(&mut self) {
        self.conversation_id = None;
        self.messages.clear();
        self.scroll_to_bottom = false;
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn is_open(&self, conversation_id: &str) -> bool {
        self.conversation_id.as_deref() == Some(conversation_id)
    }

    /// Fold a fetched history into the open list. Returns false without
    /// touching anything when the store has moved to another conversation
    /// while the fetch was in flight (stale response, discarded).
    pub fn merge_history(&mut self, conversation_id: &str, history: Vec<ChatMessage>) -> bool {
        if !self.is_open(conversation_id) {
            return false;
        }
        self.messages.extend(history);
        normalize(&mut self.messages);
        self.scroll_to_bottom = true;
        true
    }

    /// Append one message. A duplicate id (live event racing the send
    /// response) is dropped; an out-of-order arrival re-normalizes the list.
    pub fn append(&mut self, message: ChatMessage) {
        if self.messages.iter().any(|m| m.id == message.id) {
            return;
        }
        let in_order = self
            .messages
            .last()
            .map(|last| (last.sent_at, last.id.as_str()) <= (message.sent_at, message.id.as_str()))
            .unwrap_or(true);
        self.messages.push(message);
        if !in_order {
            normalize(&mut self.messages);
        }
        self.scroll_to_bottom = true;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// One-shot render hint set by history loads and appends.
    pub fn take_scroll_hint(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_bottom)
    }
}

fn normalize(messages: &mut Vec<ChatMessage>) {
    let mut seen = HashSet::new();
    messages.retain(|m| seen.insert(m.id.clone()));
    messages.sort_by(|a, b| (a.sent_at, a.id.as_str()).cmp(&(b.sent_at, b.id.as_str())));
}
