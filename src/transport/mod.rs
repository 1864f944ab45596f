mod telegram;
pub mod webhook;

pub use telegram::normalize_update;

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId};

use crate::error::BotResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: data.into(),
        }
    }
}

/// Buttons attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Menu {
    /// Persistent keyboard; a press arrives back as plain text.
    Reply(Vec<Vec<String>>),
    /// Buttons under the message; a press arrives back as callback data.
    Inline(Vec<Vec<InlineButton>>),
}

/// Outbound side of the bot. Bodies are HTML limited to `<b>`, `<i>` and `<code>`.
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, body: &str, menu: Option<Menu>) -> BotResult<()>;

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, body: &str) -> BotResult<()>;

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> BotResult<()>;
}
