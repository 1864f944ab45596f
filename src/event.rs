use teloxide::types::{ChatId, MessageId, UserId};

use crate::command::Command;

/// The user an event came from.
#[derive(Debug, Clone)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
}

/// Inbound events, already stripped of transport details.
#[derive(Debug, Clone)]
pub enum Event {
    Command {
        command: Command,
        sender: Sender,
        chat_id: ChatId,
    },
    Text {
        body: String,
        sender: Sender,
        chat_id: ChatId,
    },
    Photo {
        sender: Sender,
        chat_id: ChatId,
    },
    Callback {
        callback_id: String,
        data: String,
        sender: Sender,
        chat_id: ChatId,
        message_id: MessageId,
    },
}

impl Event {
    pub fn sender(&self) -> &Sender {
        match self {
            Event::Command { sender, .. }
            | Event::Text { sender, .. }
            | Event::Photo { sender, .. }
            | Event::Callback { sender, .. } => sender,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        match self {
            Event::Command { chat_id, .. }
            | Event::Text { chat_id, .. }
            | Event::Photo { chat_id, .. }
            | Event::Callback { chat_id, .. } => *chat_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::Command { .. } => "command",
            Event::Text { .. } => "text",
            Event::Photo { .. } => "photo",
            Event::Callback { .. } => "callback",
        }
    }
}
