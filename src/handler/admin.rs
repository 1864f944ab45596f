use teloxide::{types::ChatId, utils::html};

use crate::{
    error::HandlerResult,
    event::Sender,
    service::{conversation::ConversationState, order::display_card, ServiceError},
    state::AppState,
    transport::Presenter,
};

use super::keyboard::get_card_menu;

const MAX_LISTED_ORDERS: usize = 20;
const MAX_LISTED_USERS: usize = 30;

pub(super) async fn show_stats(state: &AppState, presenter: &dyn Presenter, chat_id: ChatId) -> HandlerResult<()> {
    let stats = state.service_registry.admin.stats().await?;

    let text = t!(
        "admin.stats",
        users = stats.users,
        orders = stats.orders,
        stars = stats.total_stars,
        revenue = stats.total_revenue
    );

    presenter.send_text(chat_id, &text, None).await?;

    Ok(())
}

pub(super) async fn list_orders(state: &AppState, presenter: &dyn Presenter, chat_id: ChatId) -> HandlerResult<()> {
    let orders = state.service_registry.order.list_recent(MAX_LISTED_ORDERS).await?;

    if orders.is_empty() {
        presenter.send_text(chat_id, &t!("admin.orders.empty"), None).await?;
        return Ok(());
    }

    let mut text = t!("admin.orders.title", count = orders.len()).into_owned();
    for order in &orders {
        text.push_str("\n\n");
        text.push_str(&t!(
            "admin.orders.item",
            order_id = order.order_id,
            username = html::escape(&order.telegram_username),
            stars = order.stars_amount,
            price = order.price,
            status = t!(order.status.i18n_key()),
            created = order.created_at.format("%Y-%m-%d %H:%M")
        ));
    }

    presenter.send_text(chat_id, &text, None).await?;

    Ok(())
}

pub(super) async fn list_users(state: &AppState, presenter: &dyn Presenter, chat_id: ChatId) -> HandlerResult<()> {
    let users = state.service_registry.profile.list_all(MAX_LISTED_USERS).await?;

    if users.is_empty() {
        presenter.send_text(chat_id, &t!("admin.users.empty"), None).await?;
        return Ok(());
    }

    let mut text = t!("admin.users.title", count = users.len()).into_owned();
    for (user_id, profile) in &users {
        text.push('\n');
        text.push_str(&t!(
            "admin.users.item",
            user_id = user_id,
            name = html::escape(&profile.first_name),
            username = html::escape(&profile.username),
            orders = profile.orders_count
        ));
    }

    presenter.send_text(chat_id, &text, None).await?;

    Ok(())
}

pub(super) async fn show_card(state: &AppState, presenter: &dyn Presenter, chat_id: ChatId) -> HandlerResult<()> {
    let orders = &state.service_registry.order;

    let card = orders.get_payment_card().await?;
    let has_stored_card = orders.stored_payment_card().await?.is_some();

    presenter
        .send_text(
            chat_id,
            &t!("admin.card.current", card = display_card(&card)),
            Some(get_card_menu(has_stored_card)),
        )
        .await?;

    Ok(())
}

/// Enters `add_new_card` or `change_card`, replacing any purchase in progress.
pub(super) async fn start_card_input(
    state: &AppState,
    presenter: &dyn Presenter,
    sender: &Sender,
    chat_id: ChatId,
    step: ConversationState,
) -> HandlerResult<()> {
    let prompt = match step {
        ConversationState::ChangeCard => t!("admin.card.prompt_change"),
        _ => t!("admin.card.prompt_new"),
    };

    state.service_registry.conversation.set(sender.id, step);

    presenter.send_text(chat_id, &prompt, None).await?;

    Ok(())
}

pub(super) async fn handle_card_input(
    state: &AppState,
    presenter: &dyn Presenter,
    sender: &Sender,
    chat_id: ChatId,
    body: &str,
) -> HandlerResult<()> {
    let registry = &state.service_registry;

    match registry.order.set_payment_card(body).await {
        Ok(card) => {
            registry.conversation.clear(sender.id);
            info!("Payment card updated by admin {}", sender.id);

            presenter
                .send_text(chat_id, &t!("admin.card.updated", card = display_card(&card)), None)
                .await?;
        }
        Err(ServiceError::Validation(reason)) => {
            debug!("Rejected card input from admin {}: {}", sender.id, reason);
            presenter.send_text(chat_id, &t!("admin.card.invalid"), None).await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
