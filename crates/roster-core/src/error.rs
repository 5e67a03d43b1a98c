//! Error types for `roster-core`.
//!
//! Every failure a command or query can report falls into one of three
//! classes: the input was malformed ([`Error::Validation`]), a referenced
//! record does not exist ([`Error::NotFound`]), or the change would break a
//! roster invariant ([`Error::Conflict`]). Storage backends wrap this type so
//! callers can recover the class from any backend error.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

// ─── Field-level validation ──────────────────────────────────────────────────

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

/// All field errors found while validating one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
    self.0.push(FieldError { field, message: message.into() });
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn fields(&self) -> &[FieldError] { &self.0 }

  /// `Ok(())` when nothing was pushed, otherwise [`Error::Validation`].
  pub fn into_result(self) -> Result<()> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(Error::Validation(self))
    }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for e in &self.0 {
      if !first {
        f.write_str("; ")?;
      }
      write!(f, "{}: {}", e.field, e.message)?;
      first = false;
    }
    Ok(())
  }
}

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: Uuid },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unknown {kind} discriminant: {value:?}")]
  UnknownDiscriminant { kind: &'static str, value: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn not_found(entity: &'static str, id: Uuid) -> Self {
    Self::NotFound { entity, id }
  }

  pub fn conflict(message: impl Into<String>) -> Self {
    Self::Conflict(message.into())
  }

  /// Shorthand for a validation failure on a single field.
  pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
    let mut errors = ValidationErrors::new();
    errors.push(field, message);
    Self::Validation(errors)
  }

  /// Find a `roster_core::Error` anywhere in the source chain of `err`.
  ///
  /// Backends wrap this type with `#[from]`, which makes it the `source()` of
  /// the backend error; walking the chain recovers the failure class without
  /// knowing the concrete backend.
  pub fn find_in<'a>(
    err: &'a (dyn std::error::Error + 'static),
  ) -> Option<&'a Error> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
      if let Some(core) = e.downcast_ref::<Error>() {
        return Some(core);
      }
      current = e.source();
    }
    None
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  enum Wrapper {
    #[error("core: {0}")]
    Core(#[from] Error),
  }

  #[test]
  fn empty_validation_is_ok() {
    assert!(ValidationErrors::new().into_result().is_ok());
  }

  #[test]
  fn validation_display_joins_fields() {
    let mut errors = ValidationErrors::new();
    errors.push("last_name", "must not be empty");
    errors.push("code", "must not be empty");
    assert_eq!(
      errors.to_string(),
      "last_name: must not be empty; code: must not be empty"
    );
  }

  #[test]
  fn find_in_walks_source_chain() {
    let id = Uuid::new_v4();
    let wrapped = Wrapper::from(Error::not_found("person", id));
    let found = Error::find_in(&wrapped).unwrap();
    assert!(matches!(found, Error::NotFound { entity: "person", id: i } if *i == id));
  }
}
