//! The individual tracked by the roster.
//!
//! A person is never physically deleted. Personal and military details are
//! edited in place; status and position references are maintained by the
//! status-change and assignment commands, never written directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:           Uuid,
  /// National identification number; unique across the roster.
  pub national_id:         String,
  pub last_name:           String,
  pub first_name:          String,
  pub middle_name:         Option<String>,
  pub rank:                Option<String>,
  pub callsign:            Option<String>,
  pub weapon:              Option<String>,
  /// The status kind in effect now, derived from the status history.
  pub current_status_id:   Option<Uuid>,
  /// The position of the person's open assignment, if any.
  pub current_position_id: Option<Uuid>,
  pub created_at:          DateTime<Utc>,
  pub modified_at:         DateTime<Utc>,
}

impl Person {
  /// `"Last First Middle"`, skipping the middle name when absent.
  pub fn full_name(&self) -> String {
    let mut name = format!("{} {}", self.last_name, self.first_name);
    if let Some(middle) = self.middle_name.as_deref().filter(|m| !m.is_empty())
    {
      name.push(' ');
      name.push_str(middle);
    }
    name
  }
}

/// Input to [`crate::store::RosterStore::create_person`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPerson {
  pub national_id: String,
  pub last_name:   String,
  pub first_name:  String,
  #[serde(default)]
  pub middle_name: Option<String>,
  #[serde(default)]
  pub rank:        Option<String>,
  #[serde(default)]
  pub callsign:    Option<String>,
  #[serde(default)]
  pub weapon:      Option<String>,
}

impl NewPerson {
  pub fn new(
    national_id: impl Into<String>,
    last_name: impl Into<String>,
    first_name: impl Into<String>,
  ) -> Self {
    Self {
      national_id: national_id.into(),
      last_name: last_name.into(),
      first_name: first_name.into(),
      ..Self::default()
    }
  }
}

/// Replacement personal/military details for
/// [`crate::store::RosterStore::update_person`].
///
/// All fields are written; `None` clears an optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonPatch {
  pub national_id: String,
  pub last_name:   String,
  pub first_name:  String,
  #[serde(default)]
  pub middle_name: Option<String>,
  #[serde(default)]
  pub rank:        Option<String>,
  #[serde(default)]
  pub callsign:    Option<String>,
  #[serde(default)]
  pub weapon:      Option<String>,
}

impl From<NewPerson> for PersonPatch {
  fn from(p: NewPerson) -> Self {
    Self {
      national_id: p.national_id,
      last_name:   p.last_name,
      first_name:  p.first_name,
      middle_name: p.middle_name,
      rank:        p.rank,
      callsign:    p.callsign,
      weapon:      p.weapon,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn person(middle: Option<&str>) -> Person {
    let now = Utc::now();
    Person {
      person_id:           Uuid::new_v4(),
      national_id:         "1234567890".into(),
      last_name:           "Shevchenko".into(),
      first_name:          "Taras".into(),
      middle_name:         middle.map(str::to_owned),
      rank:                None,
      callsign:            None,
      weapon:              None,
      current_status_id:   None,
      current_position_id: None,
      created_at:          now,
      modified_at:         now,
    }
  }

  #[test]
  fn full_name_includes_middle_name() {
    assert_eq!(
      person(Some("Hryhorovych")).full_name(),
      "Shevchenko Taras Hryhorovych"
    );
  }

  #[test]
  fn full_name_skips_blank_middle_name() {
    assert_eq!(person(None).full_name(), "Shevchenko Taras");
    assert_eq!(person(Some("")).full_name(), "Shevchenko Taras");
  }
}
