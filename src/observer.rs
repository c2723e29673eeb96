//! Observer capability and cell identity
//!
//! An observer is anything a [`SharedCell`](crate::property::SharedCell) can
//! notify. It exposes two callbacks: `run` for value changes and
//! `property_died` for the one-time teardown of the property.

use std::{cell::Cell, fmt, rc::Rc};

// ============================================================================
// Observer Trait
// ============================================================================

/// The capability a subscriber must provide to a property.
///
/// Observers are held by shared reference ([`SharedObserver`]), so one
/// observer may be subscribed to several properties, or several times to the
/// same property. Both callbacks take `&self`; observers that keep state use
/// interior mutability.
///
/// Callbacks run synchronously on the thread that changed the property and
/// may call back into the same property (`set`, `subscribe`, `unsubscribe`).
pub trait Observer {
  /// React to a value change.
  ///
  /// Invoked once per pulse for each live subscription. Returning `true`
  /// removes this subscription from the property that invoked it; returning
  /// `false` keeps it. No ordering relative to other observers is promised.
  fn run(&self) -> bool;

  /// The property identified by `cell` has been destroyed.
  ///
  /// Invoked at most once per subscription. The token is an identity only:
  /// by the time this runs the property no longer holds any observers and
  /// rejects new subscriptions.
  fn property_died(&self, cell: CellId) { let _ = cell; }
}

/// Shared reference to a type-erased observer, as stored by a property.
pub type SharedObserver = Rc<dyn Observer>;

/// Any `Fn() -> bool` closure is an observer that ignores property death.
impl<F> Observer for F
where
  F: Fn() -> bool,
{
  #[inline]
  fn run(&self) -> bool { self() }
}

/// Reference equality between two observer handles.
///
/// Only the data address is compared, so the same observer reached through
/// different vtables (or a concrete `Rc<O>` versus `Rc<dyn Observer>`) still
/// compares equal.
#[inline]
pub(crate) fn same_observer<A, B>(a: &Rc<A>, b: &Rc<B>) -> bool
where
  A: ?Sized,
  B: ?Sized,
{
  std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

// ============================================================================
// CellId
// ============================================================================

/// Opaque identity of a property's shared cell.
///
/// Ids are unique among the cells of one thread and never reused, unlike the
/// cell's address. Cells are `!Send`, so ids never need to be compared across
/// threads.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u64);

impl CellId {
  pub(crate) fn next() -> Self {
    thread_local! {
      static NEXT: Cell<u64> = const { Cell::new(1) };
    }
    NEXT.with(|next| {
      let id = next.get();
      next.set(id + 1);
      CellId(id)
    })
  }

  /// The raw numeric value of this id.
  #[inline]
  pub fn get(self) -> u64 { self.0 }
}

impl fmt::Debug for CellId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "CellId({})", self.0) }
}

impl fmt::Display for CellId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Noop;

  impl Observer for Noop {
    fn run(&self) -> bool { false }
  }

  #[test]
  fn closure_is_an_observer() {
    let calls = Rc::new(Cell::new(0));
    let observer: SharedObserver = Rc::new({
      let calls = calls.clone();
      move || {
        calls.set(calls.get() + 1);
        calls.get() == 2
      }
    });

    assert!(!observer.run());
    assert!(observer.run());
    assert_eq!(calls.get(), 2);

    // The default death callback does nothing.
    observer.property_died(CellId::next());
  }

  #[test]
  fn identity_ignores_erasure() {
    let concrete = Rc::new(Noop);
    let erased: SharedObserver = concrete.clone();
    let other: SharedObserver = Rc::new(Noop);

    assert!(same_observer(&concrete, &erased));
    assert!(!same_observer(&erased, &other));
  }

  #[test]
  fn cell_ids_are_unique() {
    let a = CellId::next();
    let b = CellId::next();
    assert_ne!(a, b);
    assert!(b.get() > a.get());
    assert_eq!(format!("{a}"), format!("#{}", a.get()));
  }

  #[test]
  fn cell_id_counter_is_per_thread() {
    let before = CellId::next();
    std::thread::spawn(|| {
      CellId::next();
      CellId::next();
    })
    .join()
    .unwrap();

    assert_eq!(CellId::next().get(), before.get() + 1);
  }
}
