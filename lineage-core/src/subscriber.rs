//! # Subscribers
//!
//! A [`Subscriber`] is a callable bound to exactly one event type. The
//! callable receives the handle of the listener it belongs to and the
//! published event. Identity is assigned at construction, so two subscribers
//! built from the same callable are still distinct.

use crate::{
    error::{BoxError, InvocationError},
    event::{DynEvent, DynEventExt, Event, EventType},
    handle::ListenerHandle,
    member::MemberInfo,
};
use std::{
    any::type_name,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering as AtomicOrdering},
    },
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// The raw value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The callable half of a subscriber.
///
/// Implemented for every matching closure.
pub trait EventCallback: Send + Sync + 'static {
    /// Handle `event` on behalf of the listener behind `origin`.
    fn call(&self, origin: &ListenerHandle, event: &dyn DynEvent) -> Result<(), BoxError>;

    /// Run `next` after this callback succeeds.
    fn then<C>(self, next: C) -> Then<Self, C>
    where
        Self: Sized,
        C: EventCallback,
    {
        Then {
            first: self,
            second: next,
        }
    }
}

impl<F> EventCallback for F
where
    F: Fn(&ListenerHandle, &dyn DynEvent) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn call(&self, origin: &ListenerHandle, event: &dyn DynEvent) -> Result<(), BoxError> {
        self(origin, event)
    }
}

/// Two callbacks run in sequence. Created by [`EventCallback::then`].
#[derive(Debug, Clone)]
pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<A: EventCallback, B: EventCallback> EventCallback for Then<A, B> {
    fn call(&self, origin: &ListenerHandle, event: &dyn DynEvent) -> Result<(), BoxError> {
        self.first.call(origin, event)?;
        self.second.call(origin, event)
    }
}

/// A callback that does nothing.
pub fn noop() -> impl EventCallback + Clone {
    |_: &ListenerHandle, _: &dyn DynEvent| -> Result<(), BoxError> { Ok(()) }
}

#[derive(Clone)]
struct Inner {
    id: SubscriberId,
    event_type: EventType,
    callback: Arc<dyn EventCallback>,
    priority: i32,
    member: Option<MemberInfo>,
}

/// A callable bound to one event type.
///
/// Cheap to clone: clones share identity and callback.
#[derive(Clone)]
pub struct Subscriber {
    inner: Arc<Inner>,
}

impl Subscriber {
    /// Bind `callback` to `event_type`.
    pub fn new<C: EventCallback>(event_type: EventType, callback: C) -> Self {
        Self::from_parts(event_type, Arc::new(callback), 0, None)
    }

    /// Bind a closure over the concrete event type `E`.
    ///
    /// The published event is viewed as `E` through its lineage before the
    /// closure runs.
    pub fn typed<E, F>(f: F) -> Self
    where
        E: Event,
        F: Fn(&ListenerHandle, &E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let callback = move |origin: &ListenerHandle, event: &dyn DynEvent| -> Result<(), BoxError> {
            let view = event
                .view::<E>()
                .ok_or_else(|| InvocationError::EventMismatch {
                    expected: type_name::<E>(),
                    actual: event.event_type(),
                })?;
            f(origin, view)
        };
        Self::new(EventType::of::<E>(), callback)
    }

    /// Bind a callback derived from a listener member.
    ///
    /// The subscriber inherits the member's priority.
    pub fn for_member(
        event_type: EventType,
        callback: Arc<dyn EventCallback>,
        member: MemberInfo,
    ) -> Self {
        let priority = member.priority();
        Self::from_parts(event_type, callback, priority, Some(member))
    }

    fn from_parts(
        event_type: EventType,
        callback: Arc<dyn EventCallback>,
        priority: i32,
        member: Option<MemberInfo>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: SubscriberId::next(),
                event_type,
                callback,
                priority,
                member,
            }),
        }
    }

    /// Set the priority hint. Identity is preserved.
    pub fn with_priority(mut self, priority: i32) -> Self {
        Arc::make_mut(&mut self.inner).priority = priority;
        self
    }

    /// Identity of this subscriber.
    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// The event type this subscriber is bound to.
    pub fn event_type(&self) -> EventType {
        self.inner.event_type
    }

    /// Priority hint, used only by sorted storage.
    pub fn priority(&self) -> i32 {
        self.inner.priority
    }

    /// The member this subscriber was derived from, if any.
    pub fn member(&self) -> Option<&MemberInfo> {
        self.inner.member.as_ref()
    }

    /// Whether this subscriber was derived from a listener member.
    pub fn is_member(&self) -> bool {
        self.inner.member.is_some()
    }

    /// Whether `event` carries a value of the bound event type, either itself
    /// or as an embedded ancestor.
    ///
    /// A subtype that does not hand out its ancestor value is not accepted by
    /// subscribers of that ancestor.
    pub fn accepts(&self, event: &dyn DynEvent) -> bool {
        event
            .lineage()
            .any(|level| level.event_type() == self.inner.event_type)
    }

    /// Invoke the callback.
    pub fn call(&self, origin: &ListenerHandle, event: &dyn DynEvent) -> Result<(), BoxError> {
        self.inner.callback.call(origin, event)
    }
}

impl PartialEq for Subscriber {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Subscriber {}

impl Hash for Subscriber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl PartialOrd for Subscriber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Creation order.
impl Ord for Subscriber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.id.cmp(&other.inner.id)
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Subscriber");
        s.field("id", &self.inner.id)
            .field("event_type", &self.inner.event_type)
            .field("priority", &self.inner.priority);
        if let Some(member) = &self.inner.member {
            s.field("member", &member.name());
        }
        s.finish()
    }
}

/// Ordering over subscribers within one group.
pub type Comparator = Arc<dyn Fn(&Subscriber, &Subscriber) -> Ordering + Send + Sync>;

/// Highest priority first, ties broken by creation order.
pub fn by_priority() -> Comparator {
    Arc::new(|a: &Subscriber, b: &Subscriber| {
        b.priority()
            .cmp(&a.priority())
            .then_with(|| a.id().cmp(&b.id()))
    })
}
