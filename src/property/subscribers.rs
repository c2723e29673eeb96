use std::rc::Rc;

use smallvec::SmallVec;

use crate::observer::{same_observer, SharedObserver};

/// Subscriber list of a [`SharedCell`](super::SharedCell).
///
/// Observers live in a flat array. Removal is unordered: the removed slot is
/// filled with the last element and the array shrinks by one. Iteration order
/// is therefore insertion order only until the first removal.
///
/// # Removal while iterating
///
/// A pulse walks the array by index while observer callbacks may re-enter the
/// cell and mutate this list. To keep every in-flight index valid, removals
/// made while at least one pass is [iterating](Self::begin_pass) only clear
/// the slot (a tombstone). The last pass to finish compacts the array with the
/// swap-with-last step, re-examining the same index after each swap.
///
/// Appends during a pass land past the range the pass captured, so they are
/// only seen by later passes.
pub(crate) struct Subscribers {
  slots: SmallVec<[Option<SharedObserver>; 2]>,
  passes: usize,
  tombstones: usize,
}

impl Default for Subscribers {
  fn default() -> Self { Self { slots: SmallVec::new(), passes: 0, tombstones: 0 } }
}

impl Subscribers {
  /// Append an observer. Duplicates are allowed and tracked independently.
  #[inline]
  pub fn add(&mut self, observer: SharedObserver) { self.slots.push(Some(observer)); }

  /// Number of live subscriptions.
  #[inline]
  pub fn len(&self) -> usize { self.slots.len() - self.tombstones }

  #[inline]
  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// The observer in slot `index`, if the slot exists and is live.
  #[inline]
  pub fn get(&self, index: usize) -> Option<SharedObserver> {
    self.slots.get(index).cloned().flatten()
  }

  /// Start a pass and return the slot count it should cover.
  pub fn begin_pass(&mut self) -> usize {
    self.passes += 1;
    self.slots.len()
  }

  /// Finish a pass; the last one out compacts tombstones away.
  pub fn end_pass(&mut self) {
    debug_assert!(self.passes > 0, "end_pass without begin_pass");
    self.passes = self.passes.saturating_sub(1);
    if self.passes == 0 && self.tombstones > 0 {
      self.compact();
    }
  }

  /// Remove slot `index` if it still holds `observer`.
  ///
  /// Used for self-unsubscription, where the slot may already have been
  /// cleared by a reentrant `unsubscribe` of the same observer.
  pub fn remove_at_if<O: ?Sized>(&mut self, index: usize, observer: &Rc<O>) -> bool {
    match self.slots.get(index) {
      Some(Some(current)) if same_observer(current, observer) => {
        self.remove_at(index);
        true
      }
      _ => false,
    }
  }

  /// Remove the first live slot holding `observer` (by identity).
  pub fn remove<O: ?Sized>(&mut self, observer: &Rc<O>) -> bool {
    let position = self
      .slots
      .iter()
      .position(|slot| slot.as_ref().is_some_and(|current| same_observer(current, observer)));
    match position {
      Some(index) => {
        self.remove_at(index);
        true
      }
      None => false,
    }
  }

  /// Take every live observer out, leaving the list empty with its storage
  /// released. Passes still running see an empty list and stop.
  pub fn take_all(&mut self) -> SmallVec<[SharedObserver; 2]> {
    let slots = std::mem::take(&mut self.slots);
    self.tombstones = 0;
    slots.into_iter().flatten().collect()
  }

  fn remove_at(&mut self, index: usize) {
    if self.passes > 0 {
      self.slots[index] = None;
      self.tombstones += 1;
    } else {
      self.slots.swap_remove(index);
    }
  }

  fn compact(&mut self) {
    let mut index = 0;
    while index < self.slots.len() {
      if self.slots[index].is_none() {
        // The former last element now sits at `index`; look at it again.
        self.slots.swap_remove(index);
      } else {
        index += 1;
      }
    }
    self.tombstones = 0;
  }
}
