//! The user-facing [`Property`] handle.
//!
//! A `Property<T>` owns a share of a [`SharedCell<T>`] and is the only thing
//! that can kill it: when a handle onto a cell is released or dropped, the
//! cell dies and its observers get
//! [`property_died`](crate::observer::Observer::property_died).

mod shared_cell;
mod subscribers;

use std::{cell::Ref, fmt, rc::Rc};

pub use shared_cell::{CellState, SharedCell};
use tracing::warn;

use crate::{
  error::CellError,
  observer::{CellId, Observer, SharedObserver},
};

/// A reactive value.
///
/// Every [`set`](Self::set) synchronously runs each subscribed observer.
/// Dropping the handle kills the underlying cell exactly once.
///
/// Cloning creates another handle onto the same cell. Each handle tears the
/// cell down when it goes, so dropping any copy kills the property for all of
/// them; the survivors then hold a dead cell whose value is still readable.
/// `Rc<SharedCell<T>>`s obtained through [`cell`](Self::cell) never delay
/// the death.
///
/// # Example
///
/// ```rust
/// use std::{cell::Cell, rc::Rc};
///
/// use reactive_property::prelude::*;
///
/// let count = Property::new(0);
/// let runs = Rc::new(Cell::new(0));
/// count.subscribe(Rc::new({
///   let runs = runs.clone();
///   move || {
///     runs.set(runs.get() + 1);
///     false
///   }
/// }));
///
/// count.set(1);
/// count.set(2);
/// assert_eq!(*count.get(), 2);
/// assert_eq!(runs.get(), 2);
/// ```
pub struct Property<T> {
  cell: Option<Rc<SharedCell<T>>>,
}

impl<T> Property<T> {
  /// Create a property holding `value`, with no subscribers.
  pub fn new(value: T) -> Self {
    Self { cell: Some(Rc::new(SharedCell::new(value))) }
  }

  /// The shared cell, or `None` once this handle was released.
  #[inline]
  pub fn cell(&self) -> Option<&Rc<SharedCell<T>>> { self.cell.as_ref() }

  /// Identity of the underlying cell.
  #[inline]
  pub fn id(&self) -> Option<CellId> { self.cell.as_ref().map(|cell| cell.id()) }

  #[inline]
  pub fn is_released(&self) -> bool { self.cell.is_none() }

  /// Borrow the current value.
  ///
  /// # Panics
  ///
  /// If the handle was released. Use [`try_get`](Self::try_get) otherwise.
  pub fn get(&self) -> Ref<'_, T> {
    match self.try_get() {
      Ok(value) => value,
      Err(err) => panic!("cannot read property: {err}"),
    }
  }

  pub fn try_get(&self) -> Result<Ref<'_, T>, CellError> { Ok(self.live()?.get()) }

  /// Set the value and notify every subscriber.
  ///
  /// Ignored, with a warning, if the handle was released or the value is
  /// borrowed.
  pub fn set(&self, value: T) {
    if let Err(err) = self.try_set(value) {
      warn!(%err, "property set ignored");
    }
  }

  pub fn try_set(&self, value: T) -> Result<(), CellError> { self.live()?.try_set(value) }

  /// Mutate the value in place, then notify every subscriber.
  pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, CellError> {
    self.live()?.modify(f)
  }

  /// Subscribe `observer` to changes of this property.
  pub fn subscribe(&self, observer: SharedObserver) {
    match self.live() {
      Ok(cell) => cell.subscribe(observer),
      Err(err) => warn!(%err, "property subscribe ignored"),
    }
  }

  /// Remove one subscription of `observer`; `false` if there was none.
  pub fn unsubscribe<O>(&self, observer: &Rc<O>) -> bool
  where
    O: Observer + ?Sized,
  {
    self.cell.as_ref().is_some_and(|cell| cell.unsubscribe(observer))
  }

  /// Give up this handle and kill the cell. Releasing twice, or releasing a
  /// copy of an already dead property, is a no-op.
  pub fn release(&mut self) {
    if let Some(cell) = self.cell.take() {
      cell.die();
    }
  }

  fn live(&self) -> Result<&Rc<SharedCell<T>>, CellError> {
    self.cell.as_ref().ok_or(CellError::Released)
  }
}

impl<T> Drop for Property<T> {
  fn drop(&mut self) { self.release(); }
}

impl<T> Clone for Property<T> {
  fn clone(&self) -> Self { Self { cell: self.cell.clone() } }
}

impl<T: Default> Default for Property<T> {
  fn default() -> Self { Self::new(T::default()) }
}

impl<T> From<T> for Property<T> {
  fn from(value: T) -> Self { Self::new(value) }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.cell {
      Some(cell) => f.debug_tuple("Property").field(&**cell).finish(),
      None => f.write_str("Property(<released>)"),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::cell::{Cell, RefCell};

  use super::*;

  #[derive(Default)]
  struct Deaths(RefCell<Vec<CellId>>);

  impl Observer for Deaths {
    fn run(&self) -> bool { false }

    fn property_died(&self, cell: CellId) { self.0.borrow_mut().push(cell); }
  }

  #[test]
  fn drop_kills_the_cell() {
    let deaths = Rc::new(Deaths::default());
    let property = Property::new(1);
    property.subscribe(deaths.clone());
    let id = property.id();
    let cell = property.cell().cloned();

    drop(property);

    assert_eq!(*deaths.0.borrow(), vec![id.unwrap()]);
    let cell = cell.unwrap();
    assert!(cell.is_dead());
    assert_eq!(*cell.get(), 1);
  }

  #[test]
  fn dropping_any_copy_kills_the_cell() {
    let deaths = Rc::new(Deaths::default());
    let first = Property::new(String::from("a"));
    let second = first.clone();
    first.subscribe(deaths.clone());

    second.set("b".into());
    assert_eq!(*first.get(), "b");
    assert_eq!(first.id(), second.id());

    drop(first);
    assert_eq!(*deaths.0.borrow(), vec![second.id().unwrap()]);
    assert_eq!(second.try_set("c".into()), Err(CellError::Dead(second.id().unwrap())));
    assert_eq!(*second.get(), "b");

    // The survivor still tears down on drop, but there is nobody left to tell.
    drop(second);
    assert_eq!(deaths.0.borrow().len(), 1);
  }

  #[test]
  fn release_is_idempotent() {
    let deaths = Rc::new(Deaths::default());
    let mut property = Property::new(0u8);
    property.subscribe(deaths.clone());

    property.release();
    property.release();
    drop(property);

    assert_eq!(deaths.0.borrow().len(), 1);
  }

  #[test]
  fn released_handle_reports_errors() {
    let mut property = Property::new(0);
    property.release();

    assert!(property.is_released());
    assert_eq!(property.try_set(1), Err(CellError::Released));
    assert!(property.try_get().is_err());
    assert_eq!(property.modify(|v| *v += 1), Err(CellError::Released));
    assert!(!property.unsubscribe(&Rc::new(Deaths::default())));
    property.set(1);
    property.subscribe(Rc::new(|| false));
  }

  #[test]
  #[should_panic(expected = "cannot read property")]
  fn get_on_released_handle_panics() {
    let mut property = Property::new(0);
    property.release();
    let _ = property.get();
  }

  #[test]
  fn cell_outlives_handle_without_notifications() {
    let runs = Rc::new(Cell::new(0));
    let property = Property::new(1);
    property.subscribe(Rc::new({
      let runs = runs.clone();
      move || {
        runs.set(runs.get() + 1);
        false
      }
    }));
    let cell = property.cell().cloned().unwrap();
    drop(property);

    assert_eq!(cell.try_set(2), Err(CellError::Dead(cell.id())));
    assert_eq!(runs.get(), 0);
  }

  #[test]
  fn conversions_and_debug() {
    let property: Property<i32> = 3.into();
    assert_eq!(*property.get(), 3);
    assert_eq!(*Property::<i32>::default().get(), 0);
    assert!(format!("{property:?}").contains("value: 3"));

    let mut released = Property::new(0);
    released.release();
    assert_eq!(format!("{released:?}"), "Property(<released>)");
  }
}
