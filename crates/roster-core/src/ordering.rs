//! Renumbering of the active status-kind order.
//!
//! The active kinds are kept as an ordered list of ids. Every edit produces
//! the complete renumbering `1..=n` of the resulting list, which the store
//! writes back in one transaction.

use uuid::Uuid;

/// New order value for one status kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renumber {
  pub id:    Uuid,
  pub order: u32,
}

fn renumber(ids: &[Uuid]) -> Vec<Renumber> {
  ids
    .iter()
    .zip(1u32..)
    .map(|(&id, order)| Renumber { id, order })
    .collect()
}

/// Place `id` at the 1-based `position` in `ids`, inserting it if absent or
/// moving it if present.
///
/// `None` appends. Positions outside `1..=len` are clamped to the nearest end.
pub fn place(ids: &[Uuid], id: Uuid, position: Option<u32>) -> Vec<Renumber> {
  let mut list: Vec<Uuid> = ids.iter().copied().filter(|&x| x != id).collect();
  let index = match position {
    Some(p) => (p.max(1) as usize - 1).min(list.len()),
    None => list.len(),
  };
  list.insert(index, id);
  renumber(&list)
}

/// Remove `id` from `ids` and renumber what remains.
pub fn remove(ids: &[Uuid], id: Uuid) -> Vec<Renumber> {
  let list: Vec<Uuid> = ids.iter().copied().filter(|&x| x != id).collect();
  renumber(&list)
}

/// `true` if `orders`, in any order, are exactly `1..=n`.
pub fn is_contiguous(orders: &[u32]) -> bool {
  let mut sorted = orders.to_vec();
  sorted.sort_unstable();
  sorted.iter().zip(1u32..).all(|(&a, b)| a == b)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(n: usize) -> Vec<Uuid> { (0..n).map(|_| Uuid::new_v4()).collect() }

  fn order_of(r: &[Renumber]) -> Vec<Uuid> {
    let mut sorted = r.to_vec();
    sorted.sort_by_key(|x| x.order);
    sorted.into_iter().map(|x| x.id).collect()
  }

  #[test]
  fn append_when_no_position() {
    let existing = ids(2);
    let new = Uuid::new_v4();
    let r = place(&existing, new, None);
    assert_eq!(order_of(&r), vec![existing[0], existing[1], new]);
    assert!(is_contiguous(&r.iter().map(|x| x.order).collect::<Vec<_>>()));
  }

  #[test]
  fn insert_at_front_shifts_the_rest() {
    let existing = ids(3);
    let new = Uuid::new_v4();
    let r = place(&existing, new, Some(1));
    assert_eq!(order_of(&r), vec![new, existing[0], existing[1], existing[2]]);
  }

  #[test]
  fn move_existing_down() {
    let existing = ids(4);
    let r = place(&existing, existing[0], Some(3));
    assert_eq!(
      order_of(&r),
      vec![existing[1], existing[2], existing[0], existing[3]]
    );
    assert_eq!(r.len(), 4);
  }

  #[test]
  fn out_of_range_positions_clamp() {
    let existing = ids(2);
    let new = Uuid::new_v4();
    assert_eq!(order_of(&place(&existing, new, Some(0)))[0], new);
    assert_eq!(order_of(&place(&existing, new, Some(99)))[2], new);
  }

  #[test]
  fn remove_closes_the_gap() {
    let existing = ids(3);
    let r = remove(&existing, existing[1]);
    assert_eq!(order_of(&r), vec![existing[0], existing[2]]);
    assert!(is_contiguous(&r.iter().map(|x| x.order).collect::<Vec<_>>()));
  }

  #[test]
  fn contiguity_check() {
    assert!(is_contiguous(&[]));
    assert!(is_contiguous(&[2, 1, 3]));
    assert!(!is_contiguous(&[1, 1, 2]));
    assert!(!is_contiguous(&[1, 3]));
  }
}
