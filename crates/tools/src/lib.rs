//! Outbound delivery tools.
//!
//! Every tool implements [`MessageTool`] and runs against a [`ToolContext`]
//! holding the recipient, the [`MessageStore`](yatools_messages::MessageStore)
//! and the [`MessageSender`]. A tool sends first, then persists one envelope
//! per delivered item, strictly in input order.

pub mod alert;
pub mod button;
pub mod context;
pub mod document;
pub mod error;
pub mod input;
pub mod media;
pub mod sender;
pub mod sleep;
pub mod text;

#[cfg(test)]
pub(crate) mod testing;

pub use {
    alert::{
        AlertChannel, AlertOutcome, AlertReport, AlertTool, ConversationSummarizer,
        DefaultSummarizer, EmailAlert, SmsAlert,
    },
    button::ButtonTool,
    context::{BatchOutcome, Delivery, ItemFailure, MessageTool, ToolContext},
    document::DocumentTool,
    error::{Error, Result},
    input::OneOrMany,
    media::{ImageTool, VideoTool},
    sender::{MessageSender, OutboundRequest, PlaceholderSender},
    sleep::{SleepTool, Sleeper, TokioSleeper},
    text::TextTool,
};
