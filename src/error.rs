use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A record is missing a field the operation cannot proceed without.
    /// Carries the offending record for diagnostics.
    #[error("malformed record: {reason}")]
    Malformed {
        reason: String,
        record: Box<serde_json::Value>,
    },

    #[error("identifier already registered: {0}")]
    AlreadyRegistered(String),

    #[error("invalid argument: {0}")]
    Invalid(String),

    #[error("identity store error: {0}")]
    Store(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Upstream(err.to_string())
    }
}
