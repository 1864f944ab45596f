use teloxide::types::{ChatId, MessageId};

use crate::{
    error::HandlerResult,
    event::Sender,
    service::{catalog::PACKAGE_PREFIX, conversation::ConversationState},
    state::AppState,
    transport::Presenter,
};

use super::{
    admin,
    keyboard::{ADD_NEW_CARD, CHANGE_CARD},
};

/// The query is acknowledged after routing; a failed acknowledgement never undoes the step.
pub(super) async fn handle_callback(
    state: &AppState,
    presenter: &dyn Presenter,
    callback_id: &str,
    data: &str,
    sender: &Sender,
    chat_id: ChatId,
    message_id: MessageId,
) -> HandlerResult<()> {
    let is_admin = state.service_registry.auth.is_admin(sender.id);

    let result = match data {
        data if data.starts_with(PACKAGE_PREFIX) => {
            handle_package_selection(state, presenter, data, sender, chat_id, message_id).await
        }
        ADD_NEW_CARD if is_admin => {
            admin::start_card_input(state, presenter, sender, chat_id, ConversationState::AddNewCard).await
        }
        CHANGE_CARD if is_admin => {
            admin::start_card_input(state, presenter, sender, chat_id, ConversationState::ChangeCard).await
        }
        _ => {
            debug!("Ignoring callback {:?} from user {}", data, sender.id);
            Ok(())
        }
    };

    if let Err(e) = presenter.answer_callback(callback_id, None).await {
        warn!("Failed to answer callback {} from user {}: {}", callback_id, sender.id, e);
    }

    result
}

/// Starts (or restarts) the purchase flow with the chosen package.
async fn handle_package_selection(
    state: &AppState,
    presenter: &dyn Presenter,
    data: &str,
    sender: &Sender,
    chat_id: ChatId,
    message_id: MessageId,
) -> HandlerResult<()> {
    let Some(package) = state.service_registry.catalog.get(data) else {
        presenter.edit_text(chat_id, message_id, &t!("packages.unknown")).await?;
        return Ok(());
    };

    state
        .service_registry
        .conversation
        .set(sender.id, ConversationState::WaitingUsername { current_order: package });

    let mut text = t!(
        "packages.selected",
        amount = package.amount,
        price = package.price,
        points = package.points
    )
    .into_owned();
    text.push('\n');

    if package.discount > 0 {
        text.push_str(&t!("packages.selected_discount", discount = package.discount));
        text.push('\n');
    }

    text.push('\n');
    text.push_str(&t!("packages.ask_username"));

    presenter.edit_text(chat_id, message_id, &text).await?;

    Ok(())
}
