use thiserror::Error;

/// Fallback shown to users when the remote store gave no usable message.
pub const GENERIC_FAILURE: &str = "Something went wrong talking to GitHub. Please try again.";

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("a save is already in progress")]
    Busy,

    #[error("delete was not confirmed")]
    NotConfirmed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Message suitable for showing to the person at the keyboard.
    ///
    /// Remote messages are passed through verbatim; everything that escaped
    /// from the transport or a decoder collapses into [`GENERIC_FAILURE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Error::Remote { message, .. }
            | Error::Unauthorized(message)
            | Error::Conflict(message)
            | Error::BadRequest(message)
            | Error::Config(message) => message.clone(),
            Error::NotFound => "Not found".to_string(),
            Error::Busy | Error::NotConfirmed => self.to_string(),
            Error::Http(_) | Error::Malformed(_) | Error::Io(_) => GENERIC_FAILURE.to_string(),
        }
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Malformed(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Malformed(format!("invalid base64 content: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
