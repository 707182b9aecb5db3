//! Canonical outbound message records.
//!
//! - [`envelope`]: the persisted `Envelope` and its per-kind data shapes
//! - [`normalize`]: turns loosely-shaped tool content into envelope data
//! - [`store`]: the persistence seam (`MessageStore`) and in-process stores

pub mod envelope;
pub mod error;
pub mod normalize;
pub mod store;

pub use {
    envelope::{
        ButtonType, ClientRef, CommerceRef, Direction, Envelope, Footer, InteractiveData,
        MediaData, MessageData, MessageKind, MessagingSystem, PaymentLink, Role, TextData,
    },
    error::{Error, Result},
    normalize::{build_envelope, format_data, mime_type_for},
    store::{InMemoryMessageStore, MessageStore, PassthroughMessageStore, StoredMessage},
};
