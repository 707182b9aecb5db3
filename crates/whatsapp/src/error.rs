use yatools_common::FromMessage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("WhatsApp client '{client_id}' not found")]
    ClientNotFound { client_id: String },

    #[error("failed to register WhatsApp client '{client_id}': {source}")]
    Registration {
        client_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("secret store error: {message}")]
    Secret { message: String },

    #[error("WhatsApp API returned {status}: {body}")]
    Send { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn client_not_found(client_id: impl Into<String>) -> Self {
        Self::ClientNotFound {
            client_id: client_id.into(),
        }
    }

    #[must_use]
    pub fn secret(message: impl Into<String>) -> Self {
        Self::Secret {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn registration(client_id: impl Into<String>, source: Error) -> Self {
        Self::Registration {
            client_id: client_id.into(),
            source: Box::new(source),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

yatools_common::impl_context!();
