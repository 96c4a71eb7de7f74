use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service reported failure on {0}")]
    Service(&'static str),
    #[error("malformed response from {endpoint}: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;
