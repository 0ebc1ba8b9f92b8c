//! # Event Bus
//!
//! The registry: maps listener identity to the listener's handle and serves
//! `register`, `unregister`, `publish` and every query under one lock.
//!
//! The lock is not re-entrant. Subscribers must not call back into the bus
//! that is delivering to them.

use lineage_core::{DynEvent, Introspect, ListenerHandle, ListenerId, PublishError};
use lineage_std::{
    discovery::{MethodCollector, SubscriberCollector},
    dispatch::{DeliveryReport, ErrorHandler, EventPublisher, Publisher},
};
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

type Handles = HashMap<ListenerId, ListenerHandle>;

/// A registry of listeners and the entry point for publishing events.
///
/// # Example
///
/// ```rust,ignore
/// let bus = EventBus::new();
/// let audit = Arc::new(Audit::default());
/// bus.register(&audit);
///
/// bus.publish(&Login { user: "ada".into() })?;
/// bus.publish_with(&Logout, &LoggingErrorHandler)?;
/// ```
pub struct EventBus<P = Publisher, C = MethodCollector> {
    publisher: P,
    collector: C,
    handles: Mutex<Handles>,
}

impl EventBus {
    /// A bus with the polymorphic publisher and the default collector.
    pub fn new() -> Self {
        Self::with_parts(Publisher::default(), MethodCollector::default())
    }

    /// Start building a bus.
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::default()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: EventPublisher, C: SubscriberCollector> EventBus<P, C> {
    /// A bus delivering through `publisher` and discovering through `collector`.
    pub fn with_parts(publisher: P, collector: C) -> Self {
        Self {
            publisher,
            collector,
            handles: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Handles> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The publisher.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// The collector.
    pub fn collector(&self) -> &C {
        &self.collector
    }

    /// Discover the subscribers of `listener` without registering it.
    pub fn create_handle<L: Introspect>(&self, listener: &Arc<L>) -> ListenerHandle {
        ListenerHandle::new(Arc::clone(listener), self.collector.collect(listener))
    }

    /// Register `listener`, replacing any earlier registration of the same
    /// instance together with its subscribers.
    ///
    /// Always returns `true`, also when an existing registration was replaced.
    pub fn register<L: Introspect>(&self, listener: &Arc<L>) -> bool {
        let handle = self.create_handle(listener);
        self.put_handle(handle);
        true
    }

    /// Store a prepared handle, returning the handle it replaced.
    pub fn put_handle(&self, handle: ListenerHandle) -> Option<ListenerHandle> {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(
                listener = ?handle.id(),
                subscribers = handle.subscribers().len(),
                "Registering listener"
            );
        }
        self.lock().insert(handle.id(), handle)
    }

    /// Remove the registration of `listener`. Returns whether one existed.
    pub fn unregister<L: ?Sized>(&self, listener: &Arc<L>) -> bool {
        let removed = self.lock().remove(&ListenerId::of(listener)).is_some();
        #[cfg(feature = "tracing")]
        {
            if removed {
                tracing::debug!(listener = ?ListenerId::of(listener), "Unregistered listener");
            }
        }
        removed
    }

    /// Whether `listener` is registered.
    pub fn is_registered<L: ?Sized>(&self, listener: &Arc<L>) -> bool {
        self.lock().contains_key(&ListenerId::of(listener))
    }

    /// Number of registered listeners.
    pub fn handle_count(&self) -> usize {
        self.lock().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Identities of every registered listener.
    pub fn listener_ids(&self) -> Vec<ListenerId> {
        self.lock().keys().copied().collect()
    }

    /// Run `f` on the handle registered under `id`, if any.
    pub fn with_handle<R>(
        &self,
        id: ListenerId,
        f: impl FnOnce(&mut ListenerHandle) -> R,
    ) -> Option<R> {
        self.lock().get_mut(&id).map(f)
    }

    /// Remove every registration.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Deliver `event` to every registered listener.
    ///
    /// The first subscriber failure aborts the call and is returned.
    pub fn publish(&self, event: &dyn DynEvent) -> Result<DeliveryReport, PublishError> {
        self.dispatch(event, None)
    }

    /// Deliver `event` to every registered listener, passing subscriber
    /// failures to `handler` and continuing.
    pub fn publish_with(
        &self,
        event: &dyn DynEvent,
        handler: &dyn ErrorHandler,
    ) -> Result<DeliveryReport, PublishError> {
        self.dispatch(event, Some(handler))
    }

    fn dispatch(
        &self,
        event: &dyn DynEvent,
        handler: Option<&dyn ErrorHandler>,
    ) -> Result<DeliveryReport, PublishError> {
        let handles = self.lock();

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(
                event_type = %event.event_type(),
                listeners = handles.len(),
                "Publishing event"
            );
        }

        let mut report = DeliveryReport::default();
        for handle in handles.values() {
            report += self.publisher.publish(event, handle, handler)?;
        }
        Ok(report)
    }
}

impl<P, C> fmt::Debug for EventBus<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("EventBus")
            .field("listeners", &listeners)
            .finish_non_exhaustive()
    }
}

/// Builder for [`EventBus`].
#[derive(Debug, Clone, Default)]
pub struct EventBusBuilder<P = Publisher, C = MethodCollector> {
    publisher: P,
    collector: C,
}

impl<P, C> EventBusBuilder<P, C> {
    /// Deliver through `publisher`.
    pub fn publisher<Q: EventPublisher>(self, publisher: Q) -> EventBusBuilder<Q, C> {
        EventBusBuilder {
            publisher,
            collector: self.collector,
        }
    }

    /// Discover through `collector`.
    pub fn collector<D: SubscriberCollector>(self, collector: D) -> EventBusBuilder<P, D> {
        EventBusBuilder {
            publisher: self.publisher,
            collector,
        }
    }
}

impl<P: EventPublisher, C: SubscriberCollector> EventBusBuilder<P, C> {
    /// Build the bus.
    pub fn build(self) -> EventBus<P, C> {
        EventBus::with_parts(self.publisher, self.collector)
    }
}
