//! Testing utilities for Lineage.
//!
//! This module provides doubles that make testing dispatch and discovery easier.
//!
//! # Features
//!
//! - [`Recorder`]: hands out callbacks that record a label each time they run
//! - [`CountingCallback`]: a callback that counts its invocations
//! - [`FailingCallback`]: a callback that always fails with a fixed message
//! - [`ErrorLog`]: an error handler that records every failure it receives
//! - [`Detached`]: a listener with no members, for handles built by hand

use crate::dispatch::ErrorHandler;
use lineage_core::{
    BoxError, DynEvent, EventCallback, Introspect, Listener, ListenerHandle, Member, Subscriber,
    SubscriberId, SubscriberIndex,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recorder
// ============================================================================

/// Records the order in which its callbacks run.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = Recorder::new();
/// index.add(Subscriber::new(EventType::of::<Login>(), recorder.callback("login")));
///
/// publisher.publish(&login, &handle, None)?;
/// assert_eq!(recorder.labels(), vec!["login"]);
/// ```
#[derive(Clone, Default)]
pub struct Recorder {
    labels: Arc<Mutex<Vec<&'static str>>>,
}

impl Recorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that records `label` when it runs.
    pub fn callback(&self, label: &'static str) -> impl EventCallback + Clone {
        let labels = Arc::clone(&self.labels);
        move |_: &ListenerHandle, _: &dyn DynEvent| -> Result<(), BoxError> {
            labels.lock().unwrap().push(label);
            Ok(())
        }
    }

    /// The recorded labels, in order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.labels.lock().unwrap().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.labels.lock().unwrap().clear();
    }
}

// ============================================================================
// Counting Callback
// ============================================================================

/// A callback that counts its invocations. Clones share the counter.
#[derive(Clone, Default)]
pub struct CountingCallback {
    count: Arc<AtomicUsize>,
}

impl CountingCallback {
    /// Create a new counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of invocations so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl EventCallback for CountingCallback {
    fn call(&self, _origin: &ListenerHandle, _event: &dyn DynEvent) -> Result<(), BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Failing Callback
// ============================================================================

/// A callback that always fails with the same message.
#[derive(Debug, Clone)]
pub struct FailingCallback {
    message: String,
}

impl FailingCallback {
    /// Create a callback failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl EventCallback for FailingCallback {
    fn call(&self, _origin: &ListenerHandle, _event: &dyn DynEvent) -> Result<(), BoxError> {
        Err(self.message.clone().into())
    }
}

// ============================================================================
// Error Log
// ============================================================================

/// An error handler that records `(subscriber, message)` for every failure.
#[derive(Clone, Default)]
pub struct ErrorLog {
    entries: Arc<Mutex<Vec<(SubscriberId, String)>>>,
}

impl ErrorLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded failures, in order.
    pub fn entries(&self) -> Vec<(SubscriberId, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// The number of recorded failures.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether nothing failed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorHandler for ErrorLog {
    fn handle(&self, error: BoxError, _scope: &ListenerHandle, subscriber: &Subscriber) {
        self.entries
            .lock()
            .unwrap()
            .push((subscriber.id(), error.to_string()));
    }
}

// ============================================================================
// Detached Listener
// ============================================================================

/// A listener that declares no members.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl Listener for Detached {}

impl Introspect for Detached {
    fn members() -> Vec<Member<Self>> {
        Vec::new()
    }
}

/// A handle owning `subscribers` on behalf of a fresh [`Detached`] listener.
pub fn detached_handle(subscribers: SubscriberIndex) -> ListenerHandle {
    ListenerHandle::new(Arc::new(Detached), subscribers)
}

/// A handle for `listener` with no subscribers.
pub fn handle_for<L: Listener>(listener: &Arc<L>) -> ListenerHandle {
    ListenerHandle::new(Arc::clone(listener), SubscriberIndex::new())
}
