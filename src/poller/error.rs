use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("poller already running")]
    AlreadyRunning,
    #[error("invalid request parameters: {0}")]
    InvalidParameters(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("soap fault: {0}")]
    Fault(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for PollerError {
    fn from(err: reqwest::Error) -> Self {
        PollerError::Transport(err.to_string())
    }
}

impl From<quick_xml::Error> for PollerError {
    fn from(err: quick_xml::Error) -> Self {
        PollerError::MalformedResponse(err.to_string())
    }
}
