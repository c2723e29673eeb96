//! Prelude module for convenient imports

pub use crate::{
  error::CellError,
  observer::{CellId, Observer, SharedObserver},
  property::{CellState, Property, SharedCell},
};
