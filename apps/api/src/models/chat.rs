use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One counselor chat conversation, persisted as a single document keyed by
/// the collaborator's conversation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub user_id: String,
    /// Continuation token issued by the chat collaborator; echoed back on
    /// every follow-up message in the same session.
    pub conversation_id: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Counselor,
}

impl ChatSession {
    pub fn new(user_id: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        let conversation_id = conversation_id.into();
        let now = Utc::now();
        ChatSession {
            id: conversation_id.clone(),
            user_id: user_id.into(),
            conversation_id,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, text: impl Into<String>, sender: Sender) {
        self.messages.push(ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            created_at: Utc::now(),
        });
        self.updated_at = Utc::now();
    }
}
