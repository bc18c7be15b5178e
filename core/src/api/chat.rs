/// Chat namespace endpoints
use crate::api::http::Http;
use crate::chat::types::{ChatMessage, Conversation, UserSearchResult};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct ChatApi {
    http: Http,
}

#[derive(Debug, Deserialize)]
struct ConversationsResponse {
    conversations: Vec<Conversation>,
}

#[derive(Debug, Deserialize)]
struct UnreadCountResponse {
    unread_count: u64,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct CreateConversationRequest<'a> {
    chat_type: &'a str,
    participant_ids: Vec<&'a str>,
}

/// Create response: the server reports whether it resumed an existing thread.
#[derive(Debug, Deserialize)]
pub struct CreatedConversation {
    pub conversation: Conversation,
    #[serde(default)]
    pub existing: bool,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    content: &'a str,
    message_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct UserSearchResponse {
    users: Vec<UserSearchResult>,
}

impl ChatApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        let resp: ConversationsResponse = self.http.get_json("/api/chat/conversations").await?;
        Ok(resp.conversations)
    }

    pub async fn unread_count(&self) -> Result<u64> {
        let resp: UnreadCountResponse = self.http.get_json("/api/chat/unread-count").await?;
        Ok(resp.unread_count)
    }

    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>> {
        let path = format!(
            "/api/chat/conversations/{}/messages",
            urlencoding::encode(conversation_id)
        );
        let resp: MessagesResponse = self.http.get_json(&path).await?;
        Ok(resp.messages)
    }

    /// Start a direct thread with one participant, or resume the existing one.
    pub async fn create_direct(&self, participant_id: &str) -> Result<CreatedConversation> {
        let body = CreateConversationRequest {
            chat_type: "direct",
            participant_ids: vec![participant_id],
        };
        self.http.post_json("/api/chat/conversations", &body).await
    }

    pub async fn send_message(&self, conversation_id: &str, content: &str) -> Result<ChatMessage> {
        let path = format!(
            "/api/chat/conversations/{}/messages",
            urlencoding::encode(conversation_id)
        );
        let body = SendMessageRequest {
            content,
            message_type: "text",
        };
        let resp: SendMessageResponse = self.http.post_json(&path, &body).await?;
        Ok(resp.message)
    }

    pub async fn mark_read(&self, conversation_id: &str) -> Result<()> {
        let path = format!(
            "/api/chat/conversations/{}/read",
            urlencoding::encode(conversation_id)
        );
        self.http.post_ack(&path).await
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSearchResult>> {
        let path = format!("/api/chat/users/search?query={}", urlencoding::encode(query));
        let resp: UserSearchResponse = self.http.get_json(&path).await?;
        Ok(resp.users)
    }
}
