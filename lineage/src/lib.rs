//! # lineage - Typed, Polymorphic Event Bus
//!
//! `lineage` delivers events to listeners by the runtime type of the event,
//! walking the event's type hierarchy so a subscriber declared for an
//! ancestor type also sees every descendant.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lineage::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Event)]
//! struct Login { user: String }
//!
//! #[derive(Event)]
//! struct AdminLogin {
//!     #[event(parent)]
//!     login: Login,
//! }
//!
//! #[derive(Default)]
//! struct Audit;
//!
//! #[lineage::listener]
//! impl Audit {
//!     fn on_login(&self, login: &Login) {
//!         println!("{} logged in", login.user);
//!     }
//! }
//!
//! let bus = EventBus::new();
//! bus.register(&Arc::new(Audit));
//! // Reaches `on_login` through the hierarchy walk.
//! bus.publish(&AdminLogin { login: Login { user: "ada".into() } })?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod bus;

pub use bus::{EventBus, EventBusBuilder};

pub use lineage_core::{
    // Events
    Ancestors,
    // Introspection
    Arg,
    AsAny,
    // Errors
    BoxError,
    CancelFlag,
    Cancellable,
    // Subscribers
    Comparator,
    DynEvent,
    DynEventExt,
    Event,
    EventCallback,
    EventRoot,
    EventType,
    // Index
    Group,
    GroupIter,
    IntoOutcome,
    Introspect,
    InvocationError,
    Invoker,
    Lineage,
    // Listeners
    Listener,
    ListenerHandle,
    ListenerId,
    Member,
    // Filters
    MemberFilter,
    MemberInfo,
    Modifiers,
    ParamInfo,
    Predicate,
    PublishError,
    Storage,
    Subscriber,
    SubscriberFilter,
    SubscriberId,
    SubscriberIndex,
    Then,
    by_priority,
    noop,
    param_info,
};

// Dispatch
pub use lineage_std::dispatch::{
    DeliveryReport, ErrorHandler, EventPublisher, Publisher, PublisherBuilder,
};

// Discovery
pub use lineage_std::discovery::{
    ArgumentFactory, DeductionRule, EventOnly, EventWithHandle, MethodCollector,
    MethodCollectorBuilder, ParameterRule, SubscriberCollector,
};

/// Standard error handlers.
pub mod handlers {
    pub use lineage_std::handlers::{IgnoreErrors, LoggingErrorHandler};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use lineage_std::testing::*;
}

/// Prelude module - common imports for Lineage.
///
/// # Usage
///
/// ```rust,ignore
/// use lineage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Events
        DynEvent,
        DynEventExt,
        Event,
        EventBus,
        EventRoot,
        EventType,
        // Listeners
        Introspect,
        Listener,
        ListenerHandle,
        // Dispatch
        Publisher,
        PublishError,
        Subscriber,
        SubscriberIndex,
        handlers::LoggingErrorHandler,
    };

    #[cfg(feature = "macros")]
    pub use crate::listener;
}

#[cfg(feature = "macros")]
pub use lineage_macros::{Event, listener};
