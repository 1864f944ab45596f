use bot::BotService;
use config::AppConfig;
use error::HandlerResult;
use state::AppState;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;
#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "uz");

mod bot;
mod command;
mod config;
mod error;
mod event;
mod handler;
mod service;
mod state;
mod storage;
mod transport;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> HandlerResult<()> {
    // a missing .env is fine, the environment may already be populated
    let _ = dotenvy::dotenv();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    let _ = pretty_env_logger::try_init_timed();

    info!("Starting bot...");

    rust_i18n::set_locale("uz");

    let config = AppConfig::from_env()?;

    info!("Initializing AppState...");
    let state = AppState::new(&config).await;
    info!(
        "AppState initialized, record store {}",
        if state.storage.is_available() { "available" } else { "unavailable" }
    );

    info!("Initializing BotService...");
    let bot_service = BotService::new(&config)?;
    info!("Bot instance created");

    bot_service.start(state).await
}
