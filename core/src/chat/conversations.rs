/// Conversation list state: unread counts, previews, typing map
///
/// Mutations arrive from REST responses and live gateway events, always on
/// the owning client's lock; the store itself is plain data.
use crate::chat::types::{ChatMessage, Conversation};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

struct TypingState {
    user_name: String,
    at: Instant,
}

#[derive(Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    unread_total: u64,
    typing: HashMap<String, TypingState>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list wholesale (server-determined order). The aggregate
    /// badge is recomputed from the new counters; a later endpoint fetch may
    /// overwrite it with the server's value.
    pub fn replace(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
        self.recompute_unread_total();
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// New threads land at the top; an id already present is left alone.
    pub fn prepend(&mut self, conversation: Conversation) {
        if self.contains(&conversation.id) {
            debug!("Conversation {} already listed, not prepending", conversation.id);
            return;
        }
        self.conversations.insert(0, conversation);
        self.recompute_unread_total();
    }

    pub fn unread_total(&self) -> u64 {
        self.unread_total
    }

    /// Seed the badge from the dedicated endpoint.
    pub fn set_unread_total(&mut self, total: u64) {
        self.unread_total = total;
    }

    /// Unread goes to exactly 0 regardless of its prior value.
    pub fn mark_read(&mut self, id: &str) {
        if let Some(conv) = self.conversations.iter_mut().find(|c| c.id == id) {
            conv.unread_count = 0;
        }
        self.recompute_unread_total();
    }

    /// Live message for a conversation that is not the open one: unread +1
    /// and preview/timestamp overwrite. Returns false when the conversation
    /// is unknown so the caller can refresh the list.
    pub fn apply_background_message(&mut self, conversation_id: &str, message: &ChatMessage) -> bool {
        let Some(conv) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        else {
            return false;
        };
        conv.unread_count += 1;
        conv.last_message_preview = Some(message.content.clone());
        conv.last_message_at = Some(message.sent_at);
        self.recompute_unread_total();
        true
    }

    /// Preview/timestamp update without touching unread (own sends).
    pub fn apply_preview(&mut self, conversation_id: &str, message: &ChatMessage) {
        if let Some(conv) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            conv.last_message_preview = Some(message.content.clone());
            conv.last_message_at = Some(message.sent_at);
        }
    }

    pub fn set_typing(&mut self, conversation_id: &str, user_name: &str, is_typing: bool) {
        if is_typing {
            self.typing.insert(
                conversation_id.to_string(),
                TypingState {
                    user_name: user_name.to_string(),
                    at: Instant::now(),
                },
            );
        } else {
            self.typing.remove(conversation_id);
        }
    }

    /// Who is typing in a conversation. Entries older than `stale_after` are
    /// ignored, so a dropped "stopped" frame cannot pin the indicator.
    pub fn typing_in(&self, conversation_id: &str, stale_after: Duration) -> Option<&str> {
        self.typing
            .get(conversation_id)
            .filter(|t| t.at.elapsed() < stale_after)
            .map(|t| t.user_name.as_str())
    }

    fn recompute_unread_total(&mut self) {
        self.unread_total = self.conversations.iter().map(|c| c.unread_count).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::types::ChatType;
    use chrono::Utc;

    fn conversation(id: &str, unread: u64) -> Conversation {
        Conversation {
            id: id.to_string(),
            chat_type: ChatType::Direct,
            participants: Vec::new(),
            display_name: Some(format!("thread {}", id)),
            last_message_preview: None,
            last_message_at: None,
            unread_count: unread,
        }
    }

    fn message(id: &str, content: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            sender_id: "u2".to_string(),
            sender_name: "Kofi".to_string(),
            sender_role: "pharmacist".to_string(),
            content: content.to_string(),
            sent_at: Utc::now(),
            read_by: Vec::new(),
        }
    }

    #[test]
    fn background_message_bumps_unread_and_preview() {
        let mut store = ConversationStore::new();
        store.replace(vec![conversation("c1", 0), conversation("c2", 2)]);

        assert!(store.apply_background_message("c2", &message("m1", "lab results ready")));

        let c2 = store.get("c2").unwrap();
        assert_eq!(c2.unread_count, 3);
        assert_eq!(c2.last_message_preview.as_deref(), Some("lab results ready"));
        assert_eq!(store.unread_total(), 3);
    }

    #[test]
    fn background_message_for_unknown_conversation_reports_miss() {
        let mut store = ConversationStore::new();
        store.replace(vec![conversation("c1", 0)]);
        assert!(!store.apply_background_message("c9", &message("m1", "hello")));
        assert_eq!(store.unread_total(), 0);
    }

    #[test]
    fn mark_read_zeroes_any_prior_count() {
        let mut store = ConversationStore::new();
        store.replace(vec![conversation("c1", 7), conversation("c2", 1)]);

        store.mark_read("c1");

        assert_eq!(store.get("c1").unwrap().unread_count, 0);
        assert_eq!(store.unread_total(), 1);
    }

    #[test]
    fn prepend_skips_existing_ids() {
        let mut store = ConversationStore::new();
        store.replace(vec![conversation("c1", 0)]);

        store.prepend(conversation("c1", 5));
        assert_eq!(store.conversations().len(), 1);

        store.prepend(conversation("c2", 0));
        assert_eq!(store.conversations()[0].id, "c2");
    }

    #[test]
    fn typing_clears_on_stop_and_goes_stale() {
        let mut store = ConversationStore::new();
        store.set_typing("c1", "Dr. Mensah", true);
        assert_eq!(
            store.typing_in("c1", Duration::from_secs(10)),
            Some("Dr. Mensah")
        );

        // stale window elapsed
        assert_eq!(store.typing_in("c1", Duration::ZERO), None);

        store.set_typing("c1", "Dr. Mensah", false);
        assert_eq!(store.typing_in("c1", Duration::from_secs(10)), None);
    }
}
