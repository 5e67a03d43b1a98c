//! Error type for `roster-store-sqlite`.
//!
//! Domain failures (validation, not found, conflict) travel as
//! [`roster_core::Error`] inside [`Error::Core`]. SQLite constraint
//! violations that slip past the explicit checks are reported as conflicts.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] roster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[source] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    if let rusqlite::Error::SqliteFailure(failure, message) = &e
      && failure.code == ErrorCode::ConstraintViolation
    {
      let message = message.clone().unwrap_or_else(|| e.to_string());
      return Self::Core(roster_core::Error::Conflict(message));
    }
    Self::Sqlite(e)
  }
}

impl Error {
  pub(crate) fn not_found(entity: &'static str, id: uuid::Uuid) -> Self {
    Self::Core(roster_core::Error::not_found(entity, id))
  }

  pub(crate) fn conflict(message: impl Into<String>) -> Self {
    Self::Core(roster_core::Error::conflict(message))
  }

  /// The domain error carried by this error, if any.
  pub fn as_core(&self) -> Option<&roster_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
