//! Person rows: lookups, inserts, updates and search.
//!
//! Every function here runs synchronously on the store's SQLite thread and
//! takes a plain connection, so callers can pass an open transaction.

use chrono::{DateTime, Utc};
use roster_core::{
  person::{NewPerson, Person, PersonPatch},
  resolver,
  status::StatusChangeView,
  store::PersonQuery,
  validation::{normalize, validate_new_person, validate_person},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{self, PERSON_COLUMNS, RawPerson, encode_dt, encode_uuid},
  statuses,
};

/// Fetch a person with `current_status_id` resolved from the history as of
/// now.
pub fn fetch(conn: &Connection, id: Uuid) -> Result<Option<Person>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE person_id = ?1"),
      params![encode_uuid(id)],
      RawPerson::from_row,
    )
    .optional()?;
  let Some(mut person) = raw.map(RawPerson::into_person).transpose()? else {
    return Ok(None);
  };
  let history = statuses::history(conn, id)?;
  person.current_status_id =
    resolver::in_effect(&history, encode::now()).map(|v| v.change.status_kind_id);
  Ok(Some(person))
}

pub fn require(conn: &Connection, id: Uuid) -> Result<Person> {
  fetch(conn, id)?.ok_or_else(|| Error::not_found("person", id))
}

fn ensure_national_id_free(conn: &Connection, national_id: &str, owner: Uuid) -> Result<()> {
  let taken: Option<String> = conn
    .query_row(
      "SELECT person_id FROM persons WHERE national_id = ?1 AND person_id != ?2",
      params![national_id, encode_uuid(owner)],
      |r| r.get(0),
    )
    .optional()?;
  match taken {
    Some(_) => Err(Error::conflict(format!(
      "national id {national_id:?} is already registered"
    ))),
    None => Ok(()),
  }
}

pub fn insert(conn: &Connection, input: NewPerson, now: DateTime<Utc>) -> Result<Person> {
  validate_new_person(&input)?;

  let person = Person {
    person_id:           Uuid::new_v4(),
    national_id:         input.national_id.trim().to_owned(),
    last_name:           input.last_name.trim().to_owned(),
    first_name:          input.first_name.trim().to_owned(),
    middle_name:         normalize(input.middle_name),
    rank:                normalize(input.rank),
    callsign:            normalize(input.callsign),
    weapon:              normalize(input.weapon),
    current_status_id:   None,
    current_position_id: None,
    created_at:          now,
    modified_at:         now,
  };
  ensure_national_id_free(conn, &person.national_id, person.person_id)?;

  conn.execute(
    "INSERT INTO persons (
       person_id, national_id, last_name, first_name, middle_name,
       rank, callsign, weapon, created_at, modified_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    params![
      encode_uuid(person.person_id),
      person.national_id,
      person.last_name,
      person.first_name,
      person.middle_name,
      person.rank,
      person.callsign,
      person.weapon,
      encode_dt(now),
      encode_dt(now),
    ],
  )?;
  Ok(person)
}

pub fn update(
  conn: &Connection,
  id: Uuid,
  patch: PersonPatch,
  now: DateTime<Utc>,
) -> Result<Person> {
  validate_person(&patch)?;
  let mut person = require(conn, id)?;

  person.national_id = patch.national_id.trim().to_owned();
  person.last_name = patch.last_name.trim().to_owned();
  person.first_name = patch.first_name.trim().to_owned();
  person.middle_name = normalize(patch.middle_name);
  person.rank = normalize(patch.rank);
  person.callsign = normalize(patch.callsign);
  person.weapon = normalize(patch.weapon);
  person.modified_at = now;
  ensure_national_id_free(conn, &person.national_id, id)?;

  conn.execute(
    "UPDATE persons SET
       national_id = ?2, last_name = ?3, first_name = ?4, middle_name = ?5,
       rank = ?6, callsign = ?7, weapon = ?8, modified_at = ?9
     WHERE person_id = ?1",
    params![
      encode_uuid(id),
      person.national_id,
      person.last_name,
      person.first_name,
      person.middle_name,
      person.rank,
      person.callsign,
      person.weapon,
      encode_dt(now),
    ],
  )?;
  Ok(person)
}

pub fn set_current_position(
  conn: &Connection,
  id: Uuid,
  position_id: Option<Uuid>,
  now: DateTime<Utc>,
) -> Result<()> {
  conn.execute(
    "UPDATE persons SET current_position_id = ?2, modified_at = ?3 WHERE person_id = ?1",
    params![encode_uuid(id), position_id.map(encode_uuid), encode_dt(now)],
  )?;
  Ok(())
}

fn matches_text(person: &Person, needle: &str) -> bool {
  [
    Some(person.last_name.as_str()),
    Some(person.first_name.as_str()),
    person.middle_name.as_deref(),
    Some(person.national_id.as_str()),
    person.callsign.as_deref(),
  ]
  .into_iter()
  .flatten()
  .any(|field| field.to_lowercase().contains(needle))
}

/// Persons matching `query`, each paired with the status record in effect
/// at `at`.
///
/// The position filters run in SQL. The text filter runs here because
/// SQLite's `lower()` only folds ASCII and names are commonly Cyrillic. The
/// status filter matches the record resolved at `at`, so `offset` and `limit`
/// apply only after every filter.
pub fn search_at(
  conn: &Connection,
  query: &PersonQuery,
  at: DateTime<Utc>,
) -> Result<Vec<(Person, Option<StatusChangeView>)>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PERSON_COLUMNS} FROM persons
     WHERE (?1 IS NULL OR current_position_id = ?1)
       AND (?2 IS NULL OR (current_position_id IS NOT NULL) = ?2)
     ORDER BY last_name, first_name, person_id"
  ))?;
  let raws = stmt
    .query_map(
      params![query.position_id.map(encode_uuid), query.has_position],
      RawPerson::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let records = statuses::history_until(conn, at)?;
  let resolved = resolver::in_effect_by_person(&records, at);

  let needle = query
    .text
    .as_deref()
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_lowercase);

  let mut matched = Vec::new();
  for raw in raws {
    let person = raw.into_person()?;
    if !needle.as_deref().is_none_or(|n| matches_text(&person, n)) {
      continue;
    }
    let status = resolved.get(&person.person_id).copied();
    let status_id = status.map(|v| v.change.status_kind_id);
    if query.status_id.is_some_and(|wanted| status_id != Some(wanted)) {
      continue;
    }
    matched.push((person, status.cloned()));
  }

  Ok(
    matched
      .into_iter()
      .skip(query.offset.unwrap_or(0))
      .take(query.limit.unwrap_or(usize::MAX))
      .collect(),
  )
}

/// [`search_at`] as of now, with `current_status_id` filled in.
pub fn search(conn: &Connection, query: &PersonQuery) -> Result<Vec<Person>> {
  Ok(
    search_at(conn, query, encode::now())?
      .into_iter()
      .map(|(mut person, status)| {
        person.current_status_id = status.map(|v| v.change.status_kind_id);
        person
      })
      .collect(),
  )
}
