use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
