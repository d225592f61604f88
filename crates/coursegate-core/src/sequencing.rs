//! Deterministic ordering of sibling entities.
//!
//! Modules within a course and lessons within a module are ordered the same
//! way: by declared `order` ascending with missing orders last, then by id.
//! The id tie-break makes the order total, so sorting is idempotent.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::ids::{LessonId, ModuleId};
use crate::model::{Lesson, Module};

/// Anything that can be placed among its siblings.
pub trait Sequenced {
    type Id: Ord + Copy;

    /// Declared position; `None` sorts after every declared value.
    fn order(&self) -> Option<i64>;

    fn id(&self) -> Self::Id;
}

/// Bare `{order, id}` pair, the shape callers outside the model hand in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sibling {
    #[serde(default)]
    pub order: Option<i64>,
    pub id: u64,
}

impl Sequenced for Sibling {
    type Id = u64;

    fn order(&self) -> Option<i64> {
        self.order
    }

    fn id(&self) -> u64 {
        self.id
    }
}

impl Sequenced for Module {
    type Id = ModuleId;

    fn order(&self) -> Option<i64> {
        self.order
    }

    fn id(&self) -> ModuleId {
        self.id
    }
}

impl Sequenced for Lesson {
    type Id = LessonId;

    fn order(&self) -> Option<i64> {
        self.order
    }

    fn id(&self) -> LessonId {
        self.id
    }
}

/// Compare two declared orders with `None` acting as +infinity.
pub fn compare_order(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_siblings<T: Sequenced>(a: &T, b: &T) -> Ordering {
    compare_order(a.order(), b.order()).then_with(|| a.id().cmp(&b.id()))
}

/// Resolve the sequence of ids for a set of siblings.
pub fn order_of<T: Sequenced>(siblings: &[T]) -> Vec<T::Id> {
    sorted(siblings).into_iter().map(Sequenced::id).collect()
}

/// Borrow siblings in resolved order without touching the input.
pub fn sorted<T: Sequenced>(siblings: &[T]) -> Vec<&T> {
    let mut refs: Vec<&T> = siblings.iter().collect();
    refs.sort_by(|a, b| compare_siblings(*a, *b));
    refs
}

/// Sort siblings in place.
pub fn sort_siblings<T: Sequenced>(siblings: &mut [T]) {
    siblings.sort_by(compare_siblings::<T>);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sib(order: Option<i64>, id: u64) -> Sibling {
        Sibling { order, id }
    }

    #[test]
    fn orders_ascending() {
        let list = vec![sib(Some(3), 1), sib(Some(1), 2), sib(Some(2), 3)];
        assert_eq!(order_of(&list), vec![2, 3, 1]);
    }

    #[test]
    fn shared_order_breaks_tie_by_id() {
        let list = vec![sib(Some(1), 10), sib(Some(1), 7)];
        assert_eq!(order_of(&list), vec![7, 10]);
    }

    #[test]
    fn missing_order_sorts_last() {
        let list = vec![sib(None, 1), sib(Some(100), 5), sib(None, 0), sib(Some(-2), 9)];
        assert_eq!(order_of(&list), vec![9, 5, 0, 1]);
    }

    #[test]
    fn resorting_is_idempotent() {
        let list = vec![
            sib(Some(2), 4),
            sib(None, 3),
            sib(Some(2), 1),
            sib(Some(0), 8),
            sib(None, 2),
        ];
        let mut once = list.clone();
        sort_siblings(&mut once);
        let mut twice = once.clone();
        sort_siblings(&mut twice);
        assert_eq!(once, twice);
        assert_eq!(order_of(&once), order_of(&list));
    }

    #[test]
    fn empty_input() {
        let list: Vec<Sibling> = vec![];
        assert!(order_of(&list).is_empty());
    }
}
