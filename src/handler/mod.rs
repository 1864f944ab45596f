mod admin;
mod callback;
mod command;
pub mod keyboard;
mod message;

use teloxide::types::ChatId;

use crate::{
    error::HandlerResult,
    event::{Event, Sender},
    service::conversation::ConversationState,
    state::AppState,
    transport::Presenter,
};

use keyboard::MenuAction;

/// Single entry point for every inbound event, whichever transport delivered it.
///
/// Failures stop here: they are logged, the user's flow is reset so it cannot stay stuck
/// on a step, and the user gets the generic failure message.
pub async fn handle_event(state: &AppState, presenter: &dyn Presenter, event: Event) {
    let sender = event.sender().clone();
    let chat_id = event.chat_id();
    let kind = event.kind();

    if let Err(e) = route_event(state, presenter, event).await {
        error!("Failed to handle {} from user {}: {}", kind, sender.id, e);

        state.service_registry.conversation.clear(sender.id);

        if let Err(e) = presenter.send_text(chat_id, &t!("errors.generic"), None).await {
            error!("Failed to notify user {} about a failure: {}", sender.id, e);
        }
    }
}

async fn route_event(state: &AppState, presenter: &dyn Presenter, event: Event) -> HandlerResult<()> {
    match event {
        Event::Command { command, sender, chat_id } => {
            command::handle_command(state, presenter, command, &sender, chat_id).await
        }
        Event::Text { body, sender, chat_id } => route_text(state, presenter, &body, &sender, chat_id).await,
        Event::Photo { sender, chat_id } => route_photo(state, presenter, &sender, chat_id).await,
        Event::Callback {
            callback_id,
            data,
            sender,
            chat_id,
            message_id,
        } => callback::handle_callback(state, presenter, &callback_id, &data, &sender, chat_id, message_id).await,
    }
}

/// Menu buttons win over whatever step the user is in.
async fn route_text(
    state: &AppState,
    presenter: &dyn Presenter,
    body: &str,
    sender: &Sender,
    chat_id: ChatId,
) -> HandlerResult<()> {
    if let Some(action) = MenuAction::from_text(body) {
        return route_menu(state, presenter, action, sender, chat_id).await;
    }

    match state.service_registry.conversation.get(sender.id) {
        Some(ConversationState::WaitingUsername { current_order }) => {
            message::handle_username(state, presenter, sender, chat_id, body, current_order).await
        }
        Some(ConversationState::AddNewCard | ConversationState::ChangeCard)
            if state.service_registry.auth.is_admin(sender.id) =>
        {
            admin::handle_card_input(state, presenter, sender, chat_id, body).await
        }
        Some(other) => {
            debug!("Ignoring text from user {} in step {}", sender.id, other.step());
            Ok(())
        }
        None => Ok(()),
    }
}

async fn route_menu(
    state: &AppState,
    presenter: &dyn Presenter,
    action: MenuAction,
    sender: &Sender,
    chat_id: ChatId,
) -> HandlerResult<()> {
    if action.is_admin_only() && !state.service_registry.auth.is_admin(sender.id) {
        debug!("User {} is not allowed to use {:?}", sender.id, action);
        return Ok(());
    }

    match action {
        MenuAction::BuyStars => message::show_packages(state, presenter, chat_id).await,
        MenuAction::Profile => message::show_profile(state, presenter, sender, chat_id).await,
        MenuAction::Support => message::show_support(state, presenter, chat_id).await,
        MenuAction::Statistics => admin::show_stats(state, presenter, chat_id).await,
        MenuAction::Orders => admin::list_orders(state, presenter, chat_id).await,
        MenuAction::Users => admin::list_users(state, presenter, chat_id).await,
    }
}

async fn route_photo(state: &AppState, presenter: &dyn Presenter, sender: &Sender, chat_id: ChatId) -> HandlerResult<()> {
    match state.service_registry.conversation.get(sender.id) {
        Some(ConversationState::WaitingPayment { .. }) => {
            message::handle_payment_proof(state, presenter, sender, chat_id).await
        }
        _ => Ok(()),
    }
}
