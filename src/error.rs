//! Error types for fitcoach

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Telegram error: {0}")]
  Telegram(#[from] teloxide::RequestError),

  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("User not found")]
  UserNotFound,

  #[error("Unknown timezone: {0}")]
  UnknownTimezone(String),

  #[error("Invalid input: {0}")]
  Invalid(String),

  #[error("Timed out")]
  Timeout,

  #[error("Internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn invalid(message: impl Into<String>) -> Self {
    Self::Invalid(message.into())
  }
}

impl From<tokio::time::error::Elapsed> for Error {
  fn from(_: tokio::time::error::Elapsed) -> Self {
    Self::Timeout
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
