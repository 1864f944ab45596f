use teloxide::{types::ChatId, utils::html};

use crate::{
    error::HandlerResult,
    event::Sender,
    service::{
        catalog::StarsPackage,
        conversation::ConversationState,
        order::{display_card, NewOrder, DEFAULT_PAYMENT_CARD},
        security::{validate_user_input, DEFAULT_MAX_INPUT_LENGTH},
    },
    state::AppState,
    transport::Presenter,
};

use super::keyboard::get_packages_menu;

pub(super) async fn show_packages(state: &AppState, presenter: &dyn Presenter, chat_id: ChatId) -> HandlerResult<()> {
    let menu = get_packages_menu(&state.service_registry.catalog);

    presenter.send_text(chat_id, &t!("packages.title"), Some(menu)).await?;

    Ok(())
}

pub(super) async fn show_profile(
    state: &AppState,
    presenter: &dyn Presenter,
    sender: &Sender,
    chat_id: ChatId,
) -> HandlerResult<()> {
    let profile = state.service_registry.profile.get_or_create(sender.id).await?;

    let text = t!(
        "profile.text",
        level = t!(profile.level().i18n_key()),
        stars = profile.total_stars,
        spent = profile.total_spent,
        points = profile.points,
        orders = profile.orders_count,
        registered = profile.registration_date.format("%Y-%m-%d %H:%M")
    );

    presenter.send_text(chat_id, &text, None).await?;

    Ok(())
}

pub(super) async fn show_support(state: &AppState, presenter: &dyn Presenter, chat_id: ChatId) -> HandlerResult<()> {
    let text = t!("support.text", support = html::escape(&state.support_username));

    presenter.send_text(chat_id, &text, None).await?;

    Ok(())
}

/// Accepts the delivery handle and moves the flow on to payment.
pub(super) async fn handle_username(
    state: &AppState,
    presenter: &dyn Presenter,
    sender: &Sender,
    chat_id: ChatId,
    body: &str,
    current_order: StarsPackage,
) -> HandlerResult<()> {
    let trimmed = body.trim();
    let telegram_username = trimmed.replace('@', "");

    // the length limit applies to the handle as typed, '@' included
    if !validate_user_input(trimmed, DEFAULT_MAX_INPUT_LENGTH) || telegram_username.is_empty() {
        debug!("Rejected delivery handle from user {}", sender.id);
        presenter.send_text(chat_id, &t!("username.invalid"), None).await?;
        return Ok(());
    }

    state.service_registry.conversation.set(
        sender.id,
        ConversationState::WaitingPayment {
            current_order,
            telegram_username: telegram_username.clone(),
        },
    );

    // Buyers always see the default card, whatever the admin has stored.
    let text = t!(
        "payment.instructions",
        stars = current_order.amount,
        price = current_order.price,
        username = html::escape(&telegram_username),
        points = current_order.points,
        card = display_card(DEFAULT_PAYMENT_CARD)
    );

    presenter.send_text(chat_id, &text, None).await?;

    Ok(())
}

/// A photo in `waiting_payment` is the payment proof: the order is recorded and the flow ends.
pub(super) async fn handle_payment_proof(
    state: &AppState,
    presenter: &dyn Presenter,
    sender: &Sender,
    chat_id: ChatId,
) -> HandlerResult<()> {
    let registry = &state.service_registry;

    let Some(ConversationState::WaitingPayment {
        current_order,
        telegram_username,
    }) = registry.conversation.take(sender.id)
    else {
        return Ok(());
    };

    let order_id = registry
        .order
        .create(NewOrder {
            user_id: sender.id.0,
            username: sender.username.clone().unwrap_or_default(),
            first_name: sender.first_name.clone(),
            telegram_username,
            stars_amount: current_order.amount,
            price: current_order.price,
            points: current_order.points,
        })
        .await?;

    presenter
        .send_text(chat_id, &t!("payment.accepted", order_id = order_id), None)
        .await?;

    Ok(())
}
