use chrono::Utc;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::models::chat::{ ChatMessage, ChatRole };

pub const FALLBACK_REPLY: &str = "Sorry, something went wrong.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl From<Role> for ChatRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => ChatRole::User,
            Role::Assistant => ChatRole::Assistant,
        }
    }
}

/// One displayed entry. Never mutated once appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub lang: String,
    pub sent_at: i64,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            lang: lang.into(),
            sent_at: Utc::now().timestamp_millis(),
        }
    }

    pub fn user(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::new(Role::User, text, lang)
    }

    pub fn assistant(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text, lang)
    }

    pub fn to_wire(&self) -> ChatMessage {
        ChatMessage { role: self.role.into(), content: self.text.clone() }
    }
}
