/// Render state for chat views
///
/// Pure functions of store state. A renderer (terminal UI, desktop shell)
/// takes a snapshot and draws it; nothing here owns state of its own.
use crate::chat::channel::ChannelState;
use crate::chat::conversations::ConversationStore;
use crate::chat::types::ChatMessage;
use std::time::Duration;

/// One line in the conversation list pane.
#[derive(Debug, Clone)]
pub struct ConversationRow {
    pub id: String,
    pub name: String,
    pub preview: Option<String>,
    pub unread: u64,
    /// Display name of whoever is typing there right now
    pub typing: Option<String>,
}

/// Everything a renderer needs for one frame of the chat page.
#[derive(Debug, Clone)]
pub struct ChatViewState {
    pub rows: Vec<ConversationRow>,
    pub unread_total: u64,
    pub channel: ChannelState,
    pub live: bool,
    pub selected: Option<String>,
    pub thread: Vec<ChatMessage>,
    pub scroll_to_bottom: bool,
    pub composer: String,
    pub filter: String,
    pub notice: Option<String>,
}

/// Rows for the list pane: resolved names, case-insensitive substring filter,
/// typing indicators attached. The filter lives only here — it is never
/// persisted or sent upstream.
pub fn conversation_rows(
    store: &ConversationStore,
    own_user_id: &str,
    filter: &str,
    typing_stale_after: Duration,
) -> Vec<ConversationRow> {
    let needle = filter.trim().to_lowercase();
    store
        .conversations()
        .iter()
        .filter_map(|conv| {
            let name = conv.resolved_name(own_user_id);
            if !needle.is_empty() && !name.to_lowercase().contains(&needle) {
                return None;
            }
            Some(ConversationRow {
                id: conv.id.clone(),
                name,
                preview: conv.last_message_preview.clone(),
                unread: conv.unread_count,
                typing: store
                    .typing_in(&conv.id, typing_stale_after)
                    .map(String::from),
            })
        })
        .collect()
}
