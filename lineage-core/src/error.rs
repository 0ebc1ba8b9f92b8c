//! Error types for Lineage.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`PublishError`] - A subscriber failed and no error handler was installed
//! - [`InvocationError`] - An erased invocation could not be carried out

use crate::{event::EventType, subscriber::SubscriberId};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a publish call.
#[derive(Error, Debug)]
pub enum PublishError {
    /// A subscriber raised an error while no error handler was supplied.
    #[error("subscriber {subscriber} failed while handling `{event}`")]
    Subscriber {
        /// The failing subscriber.
        subscriber: SubscriberId,
        /// The runtime type of the published event.
        event: EventType,
        /// The error raised by the subscriber's callback.
        #[source]
        source: BoxError,
    },
}

impl PublishError {
    /// The id of the subscriber whose failure aborted the publish call.
    pub fn subscriber(&self) -> SubscriberId {
        match self {
            PublishError::Subscriber { subscriber, .. } => *subscriber,
        }
    }
}

/// Errors raised while adapting an erased call onto a concrete member.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    /// The handle's listener is not of the member's owning type.
    #[error("listener is not a `{expected}`")]
    ListenerMismatch {
        /// Type name of the owning listener type.
        expected: &'static str,
    },

    /// An argument could not be viewed as the declared parameter type.
    #[error("argument {index} cannot be viewed as `{expected}`")]
    ArgumentMismatch {
        /// Position of the parameter.
        index: usize,
        /// Declared parameter type.
        expected: &'static str,
    },

    /// Fewer arguments were supplied than the member declares.
    #[error("missing argument {index}")]
    MissingArgument {
        /// Position of the first missing parameter.
        index: usize,
    },

    /// The member was enumerated but has no invoker.
    #[error("member `{member}` cannot be invoked")]
    NotInvocable {
        /// Member name.
        member: &'static str,
    },

    /// The event does not carry a value of the requested type in its lineage.
    #[error("event `{actual}` has no `{expected}` in its lineage")]
    EventMismatch {
        /// Requested view type.
        expected: &'static str,
        /// Runtime event type.
        actual: EventType,
    },
}
