//! Data types that cross port boundaries but are not domain entities.

use serde::{Deserialize, Serialize};

use misrecall_domain::UserId;

/// Who a chat post is visible to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "userId", rename_all = "camelCase")]
pub enum Audience {
    Everyone,
    Whisper(UserId),
}

/// A chat message posted on behalf of the module (shared misinformation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPost {
    /// Speaker alias shown in the chat log
    pub speaker: String,
    pub content_html: String,
    pub audience: Audience,
}

impl ChatPost {
    pub fn public(speaker: impl Into<String>, content_html: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            content_html: content_html.into(),
            audience: Audience::Everyone,
        }
    }

    pub fn whisper(
        speaker: impl Into<String>,
        content_html: impl Into<String>,
        recipient: UserId,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            content_html: content_html.into(),
            audience: Audience::Whisper(recipient),
        }
    }
}
