/// Chat client orchestrator
///
/// Owns the conversation store, the open-history store, the composer, and
/// the realtime channel, and applies every mutation the chat page can
/// express. REST responses and gateway frames are applied in the order they
/// resolve; nothing here retries on its own — a failed action surfaces a
/// transient notice and leaves the user's input intact.
use crate::api::chat::ChatApi;
use crate::api::Http;
use crate::chat::channel::{ChannelState, RealtimeChannel};
use crate::chat::conversations::ConversationStore;
use crate::chat::messages::MessageStore;
use crate::chat::types::{ChatEvent, UserSearchResult};
use crate::chat::view::{conversation_rows, ChatViewState};
use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct UiState {
    composer: String,
    filter: String,
    notice: Option<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    session: Session,
    api: ChatApi,
    channel: Arc<RealtimeChannel>,
    conversations: Arc<RwLock<ConversationStore>>,
    history: Arc<RwLock<MessageStore>>,
    ui: Arc<RwLock<UiState>>,
    state_rx: watch::Receiver<ChannelState>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    typing_stale_after: Duration,
}

impl ChatClient {
    pub fn new(config: &Config, session: Session) -> Result<Self> {
        let http = Http::new(config, &session)?;
        let api = ChatApi::new(http);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let channel = Arc::new(RealtimeChannel::new(config, &session, shutdown_rx));
        let state_rx = channel.state();
        Ok(Self {
            session,
            api,
            channel,
            conversations: Arc::new(RwLock::new(ConversationStore::new())),
            history: Arc::new(RwLock::new(MessageStore::new())),
            ui: Arc::new(RwLock::new(UiState::default())),
            state_rx,
            shutdown_tx: Arc::new(shutdown_tx),
            typing_stale_after: config.typing_stale_after,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the realtime channel and apply its events until shutdown.
    pub async fn run(&self) {
        let mut events = self.channel.subscribe();
        let channel = self.channel.clone();
        let channel_task = tokio::spawn(async move { channel.run().await });

        let mut shutdown = self.shutdown_tx.subscribe();
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => self.apply_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Chat events lagged by {}", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        let _ = channel_task.await;
        info!("Chat client stopped");
    }

    /// Signal the channel and event loop to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Initial page load: conversation list plus the aggregate badge.
    /// A failed list fetch leaves the list empty; no retry.
    pub async fn load(&self) {
        match self.api.conversations().await {
            Ok(list) => {
                debug!("Loaded {} conversations", list.len());
                self.conversations.write().await.replace(list);
            }
            Err(e) => error!("Failed to load conversations: {}", e),
        }
        self.refresh_unread_total().await;
    }

    /// Re-fetch the conversation list (used when an event references a
    /// conversation we have never seen).
    pub async fn refresh_conversations(&self) {
        match self.api.conversations().await {
            Ok(list) => self.conversations.write().await.replace(list),
            Err(e) => warn!("Conversation refresh failed: {}", e),
        }
    }

    /// Open a conversation: bind the history store first so live events land
    /// in it while the fetch is in flight, then merge the fetched history and
    /// send the read receipt.
    pub async fn select_conversation(&self, conversation_id: &str) {
        self.history
            .write()
            .await
            .open(conversation_id, Vec::new());

        match self.api.messages(conversation_id).await {
            Ok(history) => {
                let merged = self
                    .history
                    .write()
                    .await
                    .merge_history(conversation_id, history);
                if merged {
                    self.mark_read(conversation_id).await;
                }
            }
            Err(e) => {
                error!("Failed to load messages for {}: {}", conversation_id, e);
                self.notify("Failed to load messages").await;
            }
        }
    }

    /// Start a direct conversation with one participant, or resume the
    /// existing one. An existing thread is not re-inserted into the list.
    pub async fn start_conversation(&self, participant_id: &str) {
        match self.api.create_direct(participant_id).await {
            Ok(created) => {
                let id = created.conversation.id.clone();
                if !created.existing {
                    self.conversations.write().await.prepend(created.conversation);
                }
                self.select_conversation(&id).await;
            }
            Err(e) => {
                error!("Failed to start conversation: {}", e);
                self.notify("Failed to start conversation").await;
            }
        }
    }

    /// Send the composer content to the open conversation. Empty input and
    /// no-selection are rejected before any network call; a transport
    /// failure preserves the composer for manual retry.
    pub async fn send(&self) {
        let content = self.ui.read().await.composer.clone();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            self.notify("Message cannot be empty").await;
            return;
        }
        let Some(conversation_id) = self
            .history
            .read()
            .await
            .conversation_id()
            .map(String::from)
        else {
            self.notify("No conversation selected").await;
            return;
        };

        match self.api.send_message(&conversation_id, trimmed).await {
            Ok(message) => {
                self.conversations
                    .write()
                    .await
                    .apply_preview(&conversation_id, &message);
                self.history.write().await.append(message);
                let mut ui = self.ui.write().await;
                ui.composer.clear();
                ui.notice = None;
            }
            Err(e) => {
                error!("Failed to send message: {}", e);
                self.notify("Failed to send message").await;
            }
        }
    }

    pub async fn set_composer(&self, text: impl Into<String>) {
        self.ui.write().await.composer = text.into();
    }

    pub async fn set_filter(&self, text: impl Into<String>) {
        self.ui.write().await.filter = text.into();
    }

    pub async fn clear_notice(&self) {
        self.ui.write().await.notice = None;
    }

    /// Populate the start-new-conversation picker.
    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSearchResult>> {
        self.api.search_users(query).await
    }

    /// Current render state. Consumes the scroll hint.
    pub async fn snapshot(&self) -> ChatViewState {
        let conversations = self.conversations.read().await;
        let mut history = self.history.write().await;
        let ui = self.ui.read().await;
        let channel = *self.state_rx.borrow();
        ChatViewState {
            rows: conversation_rows(
                &conversations,
                &self.session.user_id,
                &ui.filter,
                self.typing_stale_after,
            ),
            unread_total: conversations.unread_total(),
            channel,
            live: channel == ChannelState::Connected,
            selected: history.conversation_id().map(String::from),
            thread: history.messages().to_vec(),
            scroll_to_bottom: history.take_scroll_hint(),
            composer: ui.composer.clone(),
            filter: ui.filter.clone(),
            notice: ui.notice.clone(),
        }
    }

    /// Apply one inbound gateway event.
    async fn apply_event(&self, event: ChatEvent) {
        match event {
            ChatEvent::Message {
                conversation_id,
                message,
            } => {
                let open = self.history.read().await.is_open(&conversation_id);
                if open {
                    self.history.write().await.append(message);
                    // read receipt, exactly once per event
                    self.mark_read(&conversation_id).await;
                } else {
                    let known = self
                        .conversations
                        .write()
                        .await
                        .apply_background_message(&conversation_id, &message);
                    if !known {
                        info!(
                            "Message for unlisted conversation {}, refreshing list",
                            conversation_id
                        );
                        self.refresh_conversations().await;
                    }
                }
            }
            ChatEvent::Typing {
                conversation_id,
                is_typing,
                user_name,
            } => {
                self.conversations
                    .write()
                    .await
                    .set_typing(&conversation_id, &user_name, is_typing);
            }
        }
    }

    /// Mark a conversation read on the server, then locally. A failure is
    /// logged only — this is not a critical path.
    async fn mark_read(&self, conversation_id: &str) {
        match self.api.mark_read(conversation_id).await {
            Ok(()) => {
                self.conversations.write().await.mark_read(conversation_id);
                self.refresh_unread_total().await;
            }
            Err(e) => warn!("Mark-read failed for {}: {}", conversation_id, e),
        }
    }

    /// Badge refresh from the dedicated endpoint; failures are silent.
    async fn refresh_unread_total(&self) {
        match self.api.unread_count().await {
            Ok(total) => self.conversations.write().await.set_unread_total(total),
            Err(e) => debug!("Unread-count refresh failed: {}", e),
        }
    }

    async fn notify(&self, text: &str) {
        self.ui.write().await.notice = Some(text.to_string());
    }
}
