//! Shared identifiers and the error-context helpers used across all yatools crates.

pub mod error;
pub mod types;

pub use {
    error::FromMessage,
    types::{Recipient, new_external_id},
};
