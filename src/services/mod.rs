pub mod canned;
pub mod chat;
pub mod prompt;
pub mod safety;
pub mod settings;

use thiserror::Error;

/// Errors that reach the caller of the chat flow. Provider outages are not
/// represented here; the selector absorbs those and degrades to canned text.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request cancelled")]
    Cancelled,
}
