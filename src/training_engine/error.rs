use thiserror::Error;

/// Failures of the external card store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Tab '{tab}' not found in store '{store_id}'")]
    TabNotFound { store_id: String, tab: String },

    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("Card store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("No cards due for review")]
    NoCardsDue,

    #[error("Card set '{0}' not found")]
    CardSetNotFound(String),

    #[error("No cards in card set '{0}'")]
    EmptyCardSet(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("Session already complete")]
    SessionComplete,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Session state error: {0}")]
    Session(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
