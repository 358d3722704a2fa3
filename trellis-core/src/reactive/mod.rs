//! Reactive Model
//!
//! This module turns plain nested data into observable properties and
//! implements the dependency-tracking protocol on top of them.
//!
//! # Concepts
//!
//! ## Properties
//!
//! Wrapping a JSON object replaces each field with a [`PropertyCell`]: the
//! value plus a [`Dependency`] listing who read it. Nested objects are wrapped
//! first, and any object later assigned to a property is wrapped as well.
//!
//! ## Watchers
//!
//! A [`Watcher`] observes one binding [`Path`]. Construction reads the path
//! while holding the collector slot, which subscribes it to every property
//! on the way. A write that changes a property notifies its subscribers
//! synchronously, in subscription order, before the write returns.
//!
//! # Implementation Notes
//!
//! Everything here is single-threaded (`Rc`/`RefCell`). The only thing that
//! stops an update callback from writing into its own property forever is the
//! strict-equality write guard.

mod collector;
mod dep;
mod object;
mod path;
mod subscriber;
mod value;
mod watcher;

pub use collector::Collector;
pub use dep::Dependency;
pub use object::{observe, Object, PropertyCell};
pub use path::Path;
pub use subscriber::{Subscriber, SubscriberId};
pub use value::Value;
pub use watcher::{Callback, Watcher};
