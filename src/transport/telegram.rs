use async_trait::async_trait;
use teloxide::{
    adaptors::Throttle,
    payloads::{AnswerCallbackQuerySetters, EditMessageTextSetters, SendMessageSetters},
    prelude::Requester,
    types::{
        CallbackQuery, CallbackQueryId, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton,
        KeyboardMarkup, Message, MessageId, ParseMode, ReplyMarkup, Update, UpdateKind, User,
    },
    utils::command::BotCommands,
    Bot,
};

use crate::{
    command::Command,
    error::BotResult,
    event::{Event, Sender},
};

use super::{Menu, Presenter};

#[async_trait]
impl Presenter for Throttle<Bot> {
    async fn send_text(&self, chat_id: ChatId, body: &str, menu: Option<Menu>) -> BotResult<()> {
        let request = self.send_message(chat_id, body).parse_mode(ParseMode::Html);

        match menu {
            Some(menu) => request.reply_markup(into_reply_markup(menu)).await?,
            None => request.await?,
        };

        Ok(())
    }

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, body: &str) -> BotResult<()> {
        self.edit_message_text(chat_id, message_id, body)
            .parse_mode(ParseMode::Html)
            .await?;

        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> BotResult<()> {
        let request = self.answer_callback_query(CallbackQueryId(callback_id.to_string()));

        match text {
            Some(text) => request.text(text).await?,
            None => request.await?,
        };

        Ok(())
    }
}

fn into_reply_markup(menu: Menu) -> ReplyMarkup {
    match menu {
        Menu::Reply(rows) => {
            let rows = rows
                .into_iter()
                .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>());
            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard())
        }
        Menu::Inline(rows) => {
            let rows = rows.into_iter().map(|row| {
                row.into_iter()
                    .map(|button| InlineKeyboardButton::callback(button.text, button.data))
                    .collect::<Vec<_>>()
            });
            ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows))
        }
    }
}

fn sender_from(user: &User) -> Sender {
    Sender {
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
    }
}

fn normalize_message(msg: &Message, bot_username: &str) -> Option<Event> {
    let sender = sender_from(msg.from.as_ref()?);
    let chat_id = msg.chat.id;

    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            // unknown commands and commands addressed to another bot are dropped
            return match Command::parse(text, bot_username) {
                Ok(command) => Some(Event::Command { command, sender, chat_id }),
                Err(e) => {
                    debug!("Skipping command {:?} from user {}: {}", text, sender.id, e);
                    None
                }
            };
        }

        return Some(Event::Text {
            body: text.to_string(),
            sender,
            chat_id,
        });
    }

    msg.photo().map(|_| Event::Photo { sender, chat_id })
}

fn normalize_callback(q: &CallbackQuery) -> Option<Event> {
    let message = q.message.as_ref()?;

    Some(Event::Callback {
        callback_id: q.id.0.clone(),
        data: q.data.clone()?,
        sender: sender_from(&q.from),
        chat_id: message.chat().id,
        message_id: message.id(),
    })
}

/// Turns a raw update into one of the four event shapes the handlers understand.
///
/// `bot_username` is our own username, so `/start@other_bot` is not taken as ours.
pub fn normalize_update(update: &Update, bot_username: &str) -> Option<Event> {
    match &update.kind {
        UpdateKind::Message(msg) => normalize_message(msg, bot_username),
        UpdateKind::CallbackQuery(q) => normalize_callback(q),
        _ => None,
    }
}
