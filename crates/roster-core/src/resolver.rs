//! Point-in-time status resolution.
//!
//! Given a person's status history and a target instant, the status in effect
//! is the record with the greatest `effective_at` that is `<=` the target.
//! Records sharing that `effective_at` are ordered by insertion `sequence`;
//! the latest insertion wins. With no qualifying record the result is the
//! "not present" sentinel, never an error.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::status::{StatusChange, StatusChangeView, StatusOnDate};

/// A dated history record the resolver can rank.
pub trait Dated {
  fn effective_at(&self) -> DateTime<Utc>;
  fn sequence(&self) -> i64;
}

impl Dated for StatusChange {
  fn effective_at(&self) -> DateTime<Utc> { self.effective_at }

  fn sequence(&self) -> i64 { self.sequence }
}

impl Dated for StatusChangeView {
  fn effective_at(&self) -> DateTime<Utc> { self.change.effective_at }

  fn sequence(&self) -> i64 { self.change.sequence }
}

/// The record in effect at `at`, or `None` if nothing precedes it.
///
/// `records` may be in any order.
pub fn in_effect<'a, R: Dated>(
  records: impl IntoIterator<Item = &'a R>,
  at: DateTime<Utc>,
) -> Option<&'a R>
where
  R: 'a,
{
  records
    .into_iter()
    .filter(|r| r.effective_at() <= at)
    .max_by_key(|r| (r.effective_at(), r.sequence()))
}

/// Resolve the [`StatusOnDate`] for one person's joined history.
pub fn status_on(history: &[StatusChangeView], at: DateTime<Utc>) -> StatusOnDate {
  StatusOnDate::from(in_effect(history, at))
}

/// Resolve the record in effect at `at` for every person present in
/// `records`. Persons with no qualifying record are absent from the map.
pub fn in_effect_by_person<'a>(
  records: impl IntoIterator<Item = &'a StatusChangeView>,
  at: DateTime<Utc>,
) -> HashMap<Uuid, &'a StatusChangeView> {
  let mut latest: HashMap<Uuid, &StatusChangeView> = HashMap::new();
  for record in records {
    if record.effective_at() > at {
      continue;
    }
    let key = (record.effective_at(), record.sequence());
    latest
      .entry(record.change.person_id)
      .and_modify(|current| {
        if key > (current.effective_at(), current.sequence()) {
          *current = record;
        }
      })
      .or_insert(record);
  }
  latest
}

/// The instant a date-only query resolves at: the start of `date`, UTC.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
  date.and_time(chrono::NaiveTime::MIN).and_utc()
}
