use std::{
  cell::{Cell, Ref, RefCell},
  fmt,
  rc::Rc,
};

use tracing::{debug, trace, warn};

use super::subscribers::Subscribers;
use crate::{
  error::CellError,
  observer::{CellId, Observer, SharedObserver},
};

/// Lifecycle of a [`SharedCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
  /// Accepting values and subscribers.
  Active,
  /// Torn down by a [`Property`](super::Property) handle. Terminal.
  Dead,
}

/// The reactive state behind a [`Property`](super::Property): the current
/// value and the observers subscribed to it.
///
/// Storage is reference counted (`Rc<SharedCell<T>>`), but the logical
/// lifetime is not: the cell dies as soon as any `Property` handle onto it is
/// released or dropped, however many `Rc`s are still around. A dead cell
/// keeps its value readable and rejects further writes and subscriptions.
///
/// # Reentrancy
///
/// Observers are called with no internal borrow held, so from inside
/// [`Observer::run`] or [`Observer::property_died`] they may freely `set`,
/// `subscribe` or `unsubscribe` on the same cell. A nested `set` runs its own
/// complete pulse before control returns to the outer one. The only thing an
/// observer must not do is keep a [`Ref`] from [`get`](Self::get) alive while
/// writing; the write is then refused with [`CellError::ValueBorrowed`].
///
/// # Policy for dead cells
///
/// `try_*` methods report [`CellError::Dead`]. Their plain counterparts log a
/// warning and do nothing. `unsubscribe` on a dead cell returns `false`.
pub struct SharedCell<T> {
  id: CellId,
  value: RefCell<T>,
  subscribers: RefCell<Subscribers>,
  state: Cell<CellState>,
}

impl<T> SharedCell<T> {
  pub(crate) fn new(value: T) -> Self {
    Self {
      id: CellId::next(),
      value: RefCell::new(value),
      subscribers: RefCell::new(Subscribers::default()),
      state: Cell::new(CellState::Active),
    }
  }

  /// Identity passed to observers in [`Observer::property_died`].
  #[inline]
  pub fn id(&self) -> CellId { self.id }

  #[inline]
  pub fn state(&self) -> CellState { self.state.get() }

  #[inline]
  pub fn is_dead(&self) -> bool { self.state.get() == CellState::Dead }

  /// Number of live subscriptions. Duplicates count once per subscription.
  pub fn subscriber_count(&self) -> usize { self.subscribers.borrow().len() }

  /// Check if there are no subscribers.
  pub fn is_empty(&self) -> bool { self.subscribers.borrow().is_empty() }

  // --------------------------------------------------------------------------
  // Value
  // --------------------------------------------------------------------------

  /// Borrow the current value. Also valid after the cell died.
  ///
  /// # Panics
  ///
  /// If called while a write is in progress, i.e. from inside a
  /// [`modify`](Self::modify) closure.
  #[inline]
  pub fn get(&self) -> Ref<'_, T> { self.value.borrow() }

  /// Read the current value through `f` without keeping a borrow around.
  pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R { f(&self.value.borrow()) }

  /// Overwrite the value and notify every subscriber.
  ///
  /// Ignored, with a warning, if the cell is dead or the value is borrowed.
  pub fn set(&self, value: T) {
    if let Err(err) = self.try_set(value) {
      warn!(cell = %self.id, %err, "set ignored");
    }
  }

  /// Overwrite the value and notify every subscriber.
  ///
  /// The new value is visible to every observer run by the resulting pulse.
  pub fn try_set(&self, value: T) -> Result<(), CellError> {
    self.modify(|slot| *slot = value)
  }

  /// Mutate the value in place through `f`, then notify every subscriber.
  ///
  /// `f` must not touch this cell; the value is exclusively borrowed while
  /// it runs.
  pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, CellError> {
    self.ensure_active()?;
    let out = {
      let mut slot = self.value.try_borrow_mut().map_err(|_| CellError::ValueBorrowed(self.id))?;
      f(&mut slot)
    };
    self.pulse();
    Ok(out)
  }

  // --------------------------------------------------------------------------
  // Notification
  // --------------------------------------------------------------------------

  /// Run every subscribed observer once.
  ///
  /// Observers returning `true` are unsubscribed. Observers subscribed while
  /// the pulse is running are first run by the next pulse; observers
  /// unsubscribed before their turn are skipped. If an observer kills the
  /// cell, the pulse stops.
  pub fn pulse(&self) {
    if self.is_dead() {
      warn!(cell = %self.id, "pulse on dead property ignored");
      return;
    }

    let pass = Pass::begin(&self.subscribers);
    trace!(cell = %self.id, slots = pass.count, "pulse");

    let mut index = 0;
    while index < pass.count && !self.is_dead() {
      let observer = self.subscribers.borrow().get(index);
      if let Some(observer) = observer {
        if observer.run() && self.subscribers.borrow_mut().remove_at_if(index, &observer) {
          trace!(cell = %self.id, slot = index, "observer unsubscribed itself");
        }
      }
      index += 1;
    }
  }

  // --------------------------------------------------------------------------
  // Subscription
  // --------------------------------------------------------------------------

  /// Append `observer`. The same observer may be subscribed several times; each
  /// subscription is run, and must be removed, separately.
  ///
  /// Ignored, with a warning, on a dead cell.
  pub fn subscribe(&self, observer: SharedObserver) {
    if let Err(err) = self.try_subscribe(observer) {
      warn!(cell = %self.id, %err, "subscribe ignored");
    }
  }

  pub fn try_subscribe(&self, observer: SharedObserver) -> Result<(), CellError> {
    self.ensure_active()?;
    self.subscribers.borrow_mut().add(observer);
    debug!(cell = %self.id, "observer subscribed");
    Ok(())
  }

  /// Remove one subscription of `observer`, compared by identity.
  ///
  /// Returns `false` if it was not subscribed, including when the cell is
  /// dead. Safe to call from inside a pulse: a not yet visited observer is
  /// then skipped by the running pulse.
  pub fn unsubscribe<O>(&self, observer: &Rc<O>) -> bool
  where
    O: Observer + ?Sized,
  {
    let removed = self.subscribers.borrow_mut().remove(observer);
    if removed {
      debug!(cell = %self.id, "observer unsubscribed");
    }
    removed
  }

  // --------------------------------------------------------------------------
  // Lifecycle
  // --------------------------------------------------------------------------

  /// Move to [`CellState::Dead`] and tell every subscriber, once.
  ///
  /// The subscriber list is emptied and its storage released before the
  /// first `property_died` call, so observers reacting to the death see a
  /// dead, empty cell. A second call finds nothing to do.
  pub(crate) fn die(&self) {
    if self.state.replace(CellState::Dead) == CellState::Dead {
      return;
    }
    let observers = self.subscribers.borrow_mut().take_all();
    debug!(cell = %self.id, observers = observers.len(), "property died");
    for observer in &observers {
      observer.property_died(self.id);
    }
  }

  fn ensure_active(&self) -> Result<(), CellError> {
    match self.state.get() {
      CellState::Active => Ok(()),
      CellState::Dead => Err(CellError::Dead(self.id)),
    }
  }
}

impl<T: fmt::Debug> fmt::Debug for SharedCell<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut s = f.debug_struct("SharedCell");
    s.field("id", &self.id);
    match self.value.try_borrow() {
      Ok(value) => s.field("value", &*value),
      Err(_) => s.field("value", &format_args!("<borrowed>")),
    };
    s.field("state", &self.state.get())
      .field("subscribers", &self.subscriber_count())
      .finish()
  }
}

/// Marks the subscriber list as being iterated for the lifetime of a pulse,
/// including when an observer panics.
struct Pass<'a> {
  subscribers: &'a RefCell<Subscribers>,
  count: usize,
}

impl<'a> Pass<'a> {
  fn begin(subscribers: &'a RefCell<Subscribers>) -> Self {
    let count = subscribers.borrow_mut().begin_pass();
    Self { subscribers, count }
  }
}

impl Drop for Pass<'_> {
  fn drop(&mut self) { self.subscribers.borrow_mut().end_pass(); }
}
