//! Listener handles.

use crate::{
    index::SubscriberIndex,
    listener::{AsAny, Listener, ListenerId},
};
use std::{fmt, sync::Arc};

/// A registered listener paired with the subscribers discovered on it.
///
/// Subscribers receive the handle they belong to as their origin, which gives
/// them access to the owning listener instance.
#[derive(Clone)]
pub struct ListenerHandle {
    id: ListenerId,
    listener: Arc<dyn Listener>,
    subscribers: SubscriberIndex,
}

impl ListenerHandle {
    /// Pair `listener` with `subscribers`.
    pub fn new<L: Listener>(listener: Arc<L>, subscribers: SubscriberIndex) -> Self {
        Self {
            id: ListenerId::of(&listener),
            listener,
            subscribers,
        }
    }

    /// Identity of the listener.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// The listener instance, type-erased.
    pub fn listener(&self) -> &Arc<dyn Listener> {
        &self.listener
    }

    /// The listener instance as `L`, if it is one.
    pub fn listener_as<L: Listener>(&self) -> Option<&L> {
        AsAny::as_any(&*self.listener).downcast_ref::<L>()
    }

    /// The subscribers owned by this listener.
    pub fn subscribers(&self) -> &SubscriberIndex {
        &self.subscribers
    }

    /// Mutable access to the owned subscribers.
    pub fn subscribers_mut(&mut self) -> &mut SubscriberIndex {
        &mut self.subscribers
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}
