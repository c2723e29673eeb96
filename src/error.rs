//! Errors returned by the checked (`try_*`) property operations.

use thiserror::Error;

use crate::observer::CellId;

/// Reasons a property operation was refused.
///
/// A refused operation never partially mutates the cell: the value and the
/// subscriber list are left exactly as they were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CellError {
  /// The cell has already died; it accepts no new values or subscribers.
  #[error("property {0} is dead")]
  Dead(CellId),

  /// The value is borrowed (a `Ref` from `get` is still alive), so it cannot
  /// be written.
  #[error("value of property {0} is currently borrowed")]
  ValueBorrowed(CellId),

  /// The handle was released and no longer owns a cell.
  #[error("property handle has been released")]
  Released,
}
