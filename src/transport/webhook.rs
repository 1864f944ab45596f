use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use teloxide::{adaptors::Throttle, prelude::Requester, types::Update, Bot};
use url::Url;

use crate::{config::ServerConfig, error::BotResult, handler::handle_event, state::AppState};

use super::normalize_update;

#[derive(Clone)]
struct WebhookState {
    app: AppState,
    bot: Throttle<Bot>,
    bot_username: String,
    webhook_url: Url,
}

pub async fn register_webhook(bot: &Throttle<Bot>, url: &Url) -> BotResult<()> {
    bot.delete_webhook().await?;
    bot.set_webhook(url.clone()).await?;
    info!("Webhook registered at {}", url.host_str().unwrap_or_default());
    Ok(())
}

fn webhook_url(server: &ServerConfig) -> BotResult<Url> {
    let raw = server
        .webhook_url()
        .ok_or_else(|| anyhow::anyhow!("Webhook mode requires an external host"))?;

    Ok(Url::parse(&raw).map_err(|e| anyhow::anyhow!("Invalid webhook url: {}", e))?)
}

fn router(app: AppState, bot: Throttle<Bot>, bot_username: &str, server: &ServerConfig) -> BotResult<Router> {
    let state = WebhookState {
        app,
        bot,
        bot_username: bot_username.to_string(),
        webhook_url: webhook_url(server)?,
    };

    Ok(Router::new()
        .route("/", get(reset_webhook))
        .route(&format!("/{}", server.secret_path), post(receive_update))
        .with_state(state))
}

/// Runs the HTTP receiver until the listener fails.
pub async fn serve(app: AppState, bot: Throttle<Bot>, bot_username: &str, server: &ServerConfig) -> BotResult<()> {
    let router = router(app, bot.clone(), bot_username, server)?;

    if let Err(e) = register_webhook(&bot, &webhook_url(server)?).await {
        warn!("Failed to register webhook on startup: {}", e);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

    info!("Webhook server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| anyhow::anyhow!("Webhook server stopped: {}", e))?;

    Ok(())
}

async fn receive_update(State(state): State<WebhookState>, body: Bytes) -> StatusCode {
    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => match normalize_update(&update, &state.bot_username) {
            Some(event) => handle_event(&state.app, &state.bot, event).await,
            None => debug!("Skipping update {} with no supported payload", update.id.0),
        },
        Err(e) => warn!("Failed to parse webhook update: {}", e),
    }

    StatusCode::OK
}

/// Always 200, the body says whether re-registration worked.
async fn reset_webhook(State(state): State<WebhookState>) -> impl IntoResponse {
    match register_webhook(&state.bot, &state.webhook_url).await {
        Ok(()) => (StatusCode::OK, "Webhook set!"),
        Err(e) => {
            error!("Failed to reset webhook: {}", e);
            (StatusCode::OK, "Webhook not set")
        }
    }
}
