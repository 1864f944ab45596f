use std::time::Duration;

use teloxide::adaptors::throttle::Limits;
use teloxide::adaptors::Throttle;
use teloxide::prelude::*;
use teloxide::types::{Me, Update};
use teloxide::Bot;

use crate::command;
use crate::config::{AppConfig, RunMode, ServerConfig};
use crate::error::{BotResult, HandlerResult};
use crate::handler::handle_event;
use crate::state::AppState;
use crate::transport::{normalize_update, webhook};

pub struct BotService {
    pub bot: Throttle<Bot>,
    server: ServerConfig,
    admin_chat_id: ChatId,
}

impl BotService {
    pub fn new(config: &AppConfig) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        let bot = Bot::with_client(config.telegram.0.clone(), client).throttle(Limits::default());

        Ok(Self {
            bot,
            server: config.server.clone(),
            admin_chat_id: ChatId::from(config.admin.telegram_user_id),
        })
    }

    pub async fn start(&self, state: AppState) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        let me = match self.bot.get_me().await {
            Ok(me) => {
                info!("Successfully connected to Telegram API as @{}", me.username());
                me
            }
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(anyhow::anyhow!("Failed to connect to Telegram API: {}", e).into());
            }
        };

        if let Err(e) = command::setup_user_commands(&self.bot).await {
            warn!("Failed to register user commands: {}", e);
        }
        if let Err(e) = command::setup_admin_commands(&self.bot, self.admin_chat_id).await {
            warn!("Failed to register admin commands: {}", e);
        }

        match self.server.mode {
            RunMode::Polling => {
                info!("Starting in polling mode");
                self.run_polling(state, me).await;
            }
            RunMode::Webhook => {
                info!("Starting in webhook mode");
                webhook::serve(state, self.bot.clone(), me.username(), &self.server).await?;
            }
        }

        Ok(())
    }

    /// Updates from one chat are handled in arrival order, one at a time.
    async fn run_polling(&self, state: AppState, me: Me) {
        let handler = dptree::entry().endpoint(dispatch_update);

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![state, me])
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

async fn dispatch_update(bot: Throttle<Bot>, me: Me, update: Update, state: AppState) -> HandlerResult<()> {
    match normalize_update(&update, me.username()) {
        Some(event) => handle_event(&state, &bot, event).await,
        None => debug!("Skipping update {} with no supported payload", update.id.0),
    }

    Ok(())
}
