//! # Dispatch
//!
//! The dispatch engine walks an event's type hierarchy over one listener's
//! subscriber index:
//!
//! - [`Publisher`]: the standard polymorphic (or exact) engine
//! - [`ErrorHandler`]: containment policy for subscriber failures
//! - [`DeliveryReport`]: what a publish call reached

pub mod publisher;

pub use publisher::{DeliveryReport, ErrorHandler, EventPublisher, Publisher, PublisherBuilder};
