use teloxide::RequestError;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Telegram request error: {0}")]
    Request(#[from] RequestError),

    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for BotError {
    fn from(error: anyhow::Error) -> Self {
        BotError::Other(error)
    }
}

pub type HandlerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub type BotResult<T> = Result<T, BotError>;
