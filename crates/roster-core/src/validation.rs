//! Input validation for command payloads.
//!
//! Each `validate_*` function collects every field problem before failing,
//! so callers receive the complete list in one [`Error::Validation`].

use crate::{
  Result,
  error::ValidationErrors,
  person::{NewPerson, PersonPatch},
  position::{NewPositionUnit, PositionPatch},
  status::{NewStatusKind, StatusKindPatch},
};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_CODE_LEN: usize = 32;

fn required(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
  let value = value.trim();
  if value.is_empty() {
    errors.push(field, "must not be empty");
  } else if value.chars().count() > max {
    errors.push(field, format!("must be at most {max} characters"));
  }
}

fn optional(
  errors: &mut ValidationErrors,
  field: &'static str,
  value: Option<&str>,
  max: usize,
) {
  if let Some(v) = value
    && v.trim().chars().count() > max
  {
    errors.push(field, format!("must be at most {max} characters"));
  }
}

/// Trim a value and collapse blank strings to `None`.
pub fn normalize(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

pub fn validate_person(p: &PersonPatch) -> Result<()> {
  let mut errors = ValidationErrors::new();
  required(&mut errors, "national_id", &p.national_id, MAX_CODE_LEN);
  if p.national_id.trim().chars().any(char::is_whitespace) {
    errors.push("national_id", "must not contain whitespace");
  }
  required(&mut errors, "last_name", &p.last_name, MAX_NAME_LEN);
  required(&mut errors, "first_name", &p.first_name, MAX_NAME_LEN);
  optional(&mut errors, "middle_name", p.middle_name.as_deref(), MAX_NAME_LEN);
  optional(&mut errors, "rank", p.rank.as_deref(), MAX_NAME_LEN);
  optional(&mut errors, "callsign", p.callsign.as_deref(), MAX_NAME_LEN);
  optional(&mut errors, "weapon", p.weapon.as_deref(), MAX_NAME_LEN);
  errors.into_result()
}

pub fn validate_new_person(p: &NewPerson) -> Result<()> {
  validate_person(&PersonPatch::from(p.clone()))
}

pub fn validate_status_kind(code: &str, name: &str) -> Result<()> {
  let mut errors = ValidationErrors::new();
  required(&mut errors, "code", code, MAX_CODE_LEN);
  required(&mut errors, "name", name, MAX_NAME_LEN);
  errors.into_result()
}

pub fn validate_new_status_kind(s: &NewStatusKind) -> Result<()> {
  validate_status_kind(&s.code, &s.name)
}

pub fn validate_status_kind_patch(s: &StatusKindPatch) -> Result<()> {
  validate_status_kind(&s.code, &s.name)
}

pub fn validate_new_position(p: &NewPositionUnit) -> Result<()> {
  let mut errors = ValidationErrors::new();
  required(&mut errors, "code", &p.code, MAX_CODE_LEN);
  required(&mut errors, "short_name", &p.short_name, MAX_NAME_LEN);
  optional(&mut errors, "special_number", p.special_number.as_deref(), MAX_CODE_LEN);
  errors.into_result()
}

pub fn validate_position_patch(p: &PositionPatch) -> Result<()> {
  let mut errors = ValidationErrors::new();
  required(&mut errors, "short_name", &p.short_name, MAX_NAME_LEN);
  optional(&mut errors, "special_number", p.special_number.as_deref(), MAX_CODE_LEN);
  errors.into_result()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn valid_person_passes() {
    let p = NewPerson::new("1234567890", "Petrenko", "Ivan");
    assert!(validate_new_person(&p).is_ok());
  }

  #[test]
  fn collects_every_field_error() {
    let p = NewPerson::new("12 34", " ", "");
    let Err(Error::Validation(errors)) = validate_new_person(&p) else {
      panic!("expected validation failure");
    };
    let fields: Vec<_> = errors.fields().iter().map(|e| e.field).collect();
    assert_eq!(fields, vec!["national_id", "last_name", "first_name"]);
  }

  #[test]
  fn overlong_code_is_rejected() {
    let code = "x".repeat(MAX_CODE_LEN + 1);
    assert!(matches!(
      validate_status_kind(&code, "Present"),
      Err(Error::Validation(_))
    ));
  }

  #[test]
  fn normalize_drops_blank_values() {
    assert_eq!(normalize(Some("  ".into())), None);
    assert_eq!(normalize(Some(" Eagle ".into())), Some("Eagle".into()));
    assert_eq!(normalize(None), None);
  }
}
