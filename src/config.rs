use sha2::{Digest, Sha256};
use teloxide::types::UserId;

const DEFAULT_SUPPORT_USERNAME: &str = "@support";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0}")]
    Missing(&'static str),
    #[error("Invalid {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub admin: AdminConfig,
    pub support: SupportConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        build_config(|key| std::env::var(key).ok())
    }
}

#[derive(Clone, Debug)]
pub struct TelegramConfig(pub String);

#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub telegram_user_id: UserId,
}

#[derive(Clone, Debug)]
pub struct SupportConfig {
    pub username: String,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// `None` runs without a record store.
    pub redis_url: Option<String>,
    pub op_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Polling,
    Webhook,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub mode: RunMode,
    pub external_host: Option<String>,
    pub port: u16,
    pub secret_path: String,
}

impl ServerConfig {
    pub fn webhook_url(&self) -> Option<String> {
        self.external_host
            .as_ref()
            .map(|host| format!("https://{}/{}", host, self.secret_path))
    }
}

pub fn build_config<F>(secret: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Building AppConfig...");

    let token = secret("TELEGRAM_BOT_TOKEN")
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

    let admin_id = secret("ADMIN_TELEGRAM_USER_ID")
        .ok_or(ConfigError::Missing("ADMIN_TELEGRAM_USER_ID"))?
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::Invalid("ADMIN_TELEGRAM_USER_ID", e.to_string()))?;

    let op_timeout_secs = match secret("STORE_TIMEOUT_SECS") {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::Invalid("STORE_TIMEOUT_SECS", e.to_string()))?,
        None => DEFAULT_STORE_TIMEOUT_SECS,
    };

    let port = match secret("PORT") {
        Some(value) => value
            .trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid("PORT", e.to_string()))?,
        None => DEFAULT_PORT,
    };

    let external_host = secret("WEBHOOK_HOST")
        .or_else(|| secret("RENDER_EXTERNAL_HOSTNAME"))
        .filter(|v| !v.trim().is_empty());

    let mode = match secret("BOT_MODE").as_deref().map(str::trim) {
        Some("polling") => RunMode::Polling,
        Some("webhook") => RunMode::Webhook,
        Some(other) => return Err(ConfigError::Invalid("BOT_MODE", other.to_string())),
        None if external_host.is_some() => RunMode::Webhook,
        None => RunMode::Polling,
    };

    if mode == RunMode::Webhook && external_host.is_none() {
        return Err(ConfigError::Missing("WEBHOOK_HOST"));
    }

    let secret_path = secret("WEBHOOK_SECRET")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| format!("{:x}", Sha256::digest(token.as_bytes())));

    let config = AppConfig {
        telegram: TelegramConfig(token),
        admin: AdminConfig {
            telegram_user_id: UserId(admin_id),
        },
        support: SupportConfig {
            username: secret("SUPPORT_USERNAME").unwrap_or_else(|| DEFAULT_SUPPORT_USERNAME.to_string()),
        },
        storage: StorageConfig {
            redis_url: secret("REDIS_URL").filter(|v| !v.trim().is_empty()),
            op_timeout_secs,
        },
        server: ServerConfig {
            mode,
            external_host,
            port,
            secret_path,
        },
    };
    info!("AppConfig built");

    Ok(config)
}
