use crate::{handle::ListenerHandle, index::SubscriberIndex, listener::Listener};
use std::sync::Arc;

pub(crate) struct Nobody;

impl Listener for Nobody {}

pub(crate) fn detached_handle() -> ListenerHandle {
    ListenerHandle::new(Arc::new(Nobody), SubscriberIndex::new())
}
