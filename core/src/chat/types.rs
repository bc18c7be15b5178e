/// Shared types for the chat subsystem
///
/// Everything here is a transient projection of server-owned records; the
/// client never invents ids or rewrites history.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    Direct,
    Group,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub chat_type: ChatType,
    pub participants: Vec<Participant>,
    /// Explicit name for group threads; direct threads derive one
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub last_message_preview: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread_count: u64,
}

impl Conversation {
    /// Name shown in the list: the override when set, otherwise the other
    /// participants' names.
    pub fn resolved_name(&self, own_user_id: &str) -> String {
        if let Some(name) = &self.display_name {
            if !name.is_empty() {
                return name.clone();
            }
        }
        let others: Vec<&str> = self
            .participants
            .iter()
            .filter(|p| p.id != own_user_id)
            .map(|p| p.name.as_str())
            .collect();
        if others.is_empty() {
            "Conversation".to_string()
        } else {
            others.join(", ")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_role: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub read_by: Vec<String>,
}

/// Row in the start-new-conversation picker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSearchResult {
    pub id: String,
    pub name: String,
    pub role: String,
    pub department: String,
}

/// Inbound frames from the chat gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Message {
        conversation_id: String,
        message: ChatMessage,
    },
    Typing {
        conversation_id: String,
        is_typing: bool,
        user_name: String,
    },
}

/// Outbound frames. The client only ever sends the keep-alive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str, name: &str) -> Participant {
        Participant {
            id: id.to_string(),
            name: name.to_string(),
            role: "nurse".to_string(),
        }
    }

    #[test]
    fn resolved_name_prefers_override() {
        let conv = Conversation {
            id: "c1".to_string(),
            chat_type: ChatType::Group,
            participants: vec![participant("u1", "Ama"), participant("u2", "Kofi")],
            display_name: Some("Ward 3".to_string()),
            last_message_preview: None,
            last_message_at: None,
            unread_count: 0,
        };
        assert_eq!(conv.resolved_name("u1"), "Ward 3");
    }

    #[test]
    fn resolved_name_drops_self() {
        let conv = Conversation {
            id: "c1".to_string(),
            chat_type: ChatType::Direct,
            participants: vec![participant("u1", "Ama"), participant("u2", "Kofi")],
            display_name: None,
            last_message_preview: None,
            last_message_at: None,
            unread_count: 0,
        };
        assert_eq!(conv.resolved_name("u1"), "Kofi");
    }

    #[test]
    fn events_decode_by_type_tag() {
        let frame = r#"{"type":"typing","conversation_id":"c9","is_typing":true,"user_name":"Dr. Mensah"}"#;
        let event: ChatEvent = serde_json::from_str(frame).unwrap();
        match event {
            ChatEvent::Typing {
                conversation_id,
                is_typing,
                user_name,
            } => {
                assert_eq!(conversation_id, "c9");
                assert!(is_typing);
                assert_eq!(user_name, "Dr. Mensah");
            }
            _ => panic!("expected typing event"),
        }
    }

    #[test]
    fn ping_serializes_with_type_tag() {
        let json = serde_json::to_string(&OutboundFrame::Ping).unwrap();
        assert_eq!(json, r#"{"type":"ping"}"#);
    }
}
