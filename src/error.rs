use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),

    #[error("{service} service returned {status}: {message}")]
    UpstreamStatus {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("invalid encryption")]
    InvalidEncryption,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
