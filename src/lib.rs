//! # reactive-property: observable values with death notification
//!
//! A [`Property`] is a mutable cell that tells a dynamic set of observers
//! about every change, synchronously, and tells them once more when the
//! property itself is destroyed.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//!
//! use reactive_property::prelude::*;
//!
//! let temperature = Property::new(20);
//!
//! // Closures are observers. Returning `true` unsubscribes.
//! let seen = Rc::new(Cell::new(0));
//! let observer: SharedObserver = Rc::new({
//!   let seen = seen.clone();
//!   move || {
//!     seen.set(seen.get() + 1);
//!     false
//!   }
//! });
//! temperature.subscribe(observer.clone());
//!
//! temperature.set(25);
//! assert_eq!(*temperature.get(), 25);
//! assert_eq!(seen.get(), 1);
//!
//! assert!(temperature.unsubscribe(&observer));
//! temperature.set(30);
//! assert_eq!(seen.get(), 1);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Property`] | User-facing handle; dropping the last one kills the cell |
//! | [`SharedCell`] | Shared value plus subscriber list, reachable via [`Property::cell`] |
//! | [`Observer`] | `run` on every change, `property_died` on teardown |
//! | [`CellId`] | Opaque identity handed to `property_died` |
//!
//! Everything is single-threaded (`Rc`, not `Arc`). Observers may re-enter
//! the property they are notified by; see [`SharedCell`] for the exact
//! guarantees.
//!
//! [`Property`]: property::Property
//! [`Property::cell`]: property::Property::cell
//! [`SharedCell`]: property::SharedCell
//! [`Observer`]: observer::Observer
//! [`CellId`]: observer::CellId

pub mod error;
pub mod observer;
pub mod prelude;
pub mod property;

pub use prelude::*;
