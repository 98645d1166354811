//! Error types shared by the API client, configuration and runtime.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GuildError>;

#[derive(Error, Debug)]
pub enum GuildError {
    /// Transport-level HTTP failure (connect, DNS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<ureq::Error> for GuildError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => GuildError::Status {
                status,
                url: response.get_url().to_string(),
            },
            ureq::Error::Transport(transport) => GuildError::Http(transport.to_string()),
        }
    }
}
