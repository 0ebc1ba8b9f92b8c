//! # lineage-core
//!
//! Core types for the Lineage typed event bus.
//!
//! This crate carries the data model and has minimal dependencies. The
//! standard dispatch engine, deduction rule and discovery live in
//! `lineage-std`; the registry facade lives in `lineage`.
//!
//! # Model
//!
//! - [`Event`] / [`EventType`]: a single-rooted event hierarchy with an
//!   explicit parent lookup, terminated by [`EventRoot`]
//! - [`Listener`] / [`Introspect`]: objects owning subscribers, optionally
//!   exposing their declared [`Member`]s
//! - [`Subscriber`]: a callable bound to exactly one event type
//! - [`SubscriberIndex`]: subscribers grouped by their exact event type
//! - [`ListenerHandle`]: a listener paired with its index
//!
//! # Error Types
//!
//! - [`PublishError`] - A publish call was aborted by a failing subscriber
//! - [`InvocationError`] - An erased call could not be adapted to a member

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod event;
mod filter;
mod handle;
mod index;
mod listener;
mod member;
mod subscriber;

#[cfg(test)]
mod testing_support;

// Re-exports
pub use error::{BoxError, InvocationError, PublishError};
pub use event::{
    Ancestors, CancelFlag, Cancellable, DynEvent, DynEventExt, Event, EventRoot, EventType, Lineage,
};
pub use filter::{MemberFilter, Predicate, SubscriberFilter, passes};
pub use handle::ListenerHandle;
pub use index::{Group, GroupIter, Storage, SubscriberIndex};
pub use listener::{AsAny, Introspect, Listener, ListenerId};
pub use member::{Arg, IntoOutcome, Invoker, Member, MemberInfo, Modifiers, ParamInfo};
pub use subscriber::{
    Comparator, EventCallback, Subscriber, SubscriberId, Then, by_priority, noop,
};

#[doc(hidden)]
pub mod __private {
    pub use crate::member::probe::{EventProbe, OpaqueProbe, Probe};
}
