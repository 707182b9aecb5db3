/// Failures a delivery tool can surface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] yatools_messages::Error),

    #[error("send failed: {message}")]
    Send { message: String },

    /// Raised by [`ConversationSummarizer`](crate::ConversationSummarizer) implementations.
    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn send(message: impl Into<String>) -> Self {
        Self::Send {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
