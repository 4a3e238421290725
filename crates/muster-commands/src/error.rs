//! Command-layer error type.
//!
//! Every variant renders to a user-visible chat message at the dispatch
//! boundary; none of them ever crosses back into the store layer or escapes
//! the gateway as an HTTP error.

use thiserror::Error;

/// An error raised while handling one command.
#[derive(Debug, Error)]
pub enum CommandError {
  /// The arguments did not coerce or the command named something that does
  /// not exist. The message is the full user-facing text.
  #[error("{0}")]
  Validation(String),

  /// The actor is not allowed to perform this mutation.
  #[error("{0}")]
  Permission(String),

  /// The store rejected the operation. Store `Display` messages are written
  /// for humans, so they pass through unchanged.
  #[error("{0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CommandError {
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn permission(msg: impl Into<String>) -> Self {
    Self::Permission(msg.into())
  }
}

/// Wrap a store error for the dispatch boundary.
pub fn store_err<E>(e: E) -> CommandError
where
  E: std::error::Error + Send + Sync + 'static,
{
  CommandError::Store(Box::new(e))
}
