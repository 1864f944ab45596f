use teloxide::{types::ChatId, utils::html};

use crate::{
    command::Command,
    error::HandlerResult,
    event::Sender,
    service::user::ProfilePatch,
    state::AppState,
    transport::Presenter,
};

use super::{
    admin,
    keyboard::{get_admin_menu, get_user_menu},
};

pub(super) async fn handle_command(
    state: &AppState,
    presenter: &dyn Presenter,
    cmd: Command,
    sender: &Sender,
    chat_id: ChatId,
) -> HandlerResult<()> {
    match cmd {
        Command::Start => handle_start(state, presenter, sender, chat_id).await,
        Command::Help => handle_help(presenter, chat_id).await,
        Command::Cancel => handle_cancel(state, presenter, sender, chat_id).await,
        Command::Card if state.service_registry.auth.is_admin(sender.id) => {
            admin::show_card(state, presenter, chat_id).await
        }
        Command::Card => {
            debug!("User {} is not allowed to use /card", sender.id);
            Ok(())
        }
    }
}

async fn handle_start(
    state: &AppState,
    presenter: &dyn Presenter,
    sender: &Sender,
    chat_id: ChatId,
) -> HandlerResult<()> {
    let registry = &state.service_registry;

    registry
        .profile
        .merge(
            sender.id,
            ProfilePatch {
                username: Some(sender.username.clone().unwrap_or_default()),
                first_name: Some(sender.first_name.clone()),
                ..Default::default()
            },
        )
        .await?;

    let menu = if registry.auth.is_admin(sender.id) {
        get_admin_menu()
    } else {
        get_user_menu()
    };

    let welcome_text = t!("start.welcome", name = html::escape(&sender.first_name));

    presenter.send_text(chat_id, &welcome_text, Some(menu)).await?;

    Ok(())
}

async fn handle_help(presenter: &dyn Presenter, chat_id: ChatId) -> HandlerResult<()> {
    presenter.send_text(chat_id, &t!("help.text"), None).await?;
    Ok(())
}

async fn handle_cancel(
    state: &AppState,
    presenter: &dyn Presenter,
    sender: &Sender,
    chat_id: ChatId,
) -> HandlerResult<()> {
    let reply = match state.service_registry.conversation.take(sender.id) {
        Some(previous) => {
            debug!("User {} cancelled {}", sender.id, previous.step());
            t!("cancel.cancelled")
        }
        None => t!("cancel.nothing"),
    };

    presenter.send_text(chat_id, &reply, None).await?;

    Ok(())
}
