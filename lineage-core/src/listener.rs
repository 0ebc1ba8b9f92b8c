//! # Listeners
//!
//! A listener is any object that owns subscribers. The [`Listener`] marker has
//! no required members; [`Introspect`] additionally exposes the members
//! declared on the concrete type so a deduction rule can turn them into
//! subscribers.

use crate::member::Member;
use std::{any::Any, fmt, sync::Arc};

/// Upcast helper so `dyn Listener` can be downcast to its concrete type.
pub trait AsAny: Any {
    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A marker for objects that may be registered with an event bus.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Listener",
    label = "missing `Listener` implementation",
    note = "Implement `Listener` (or use `#[lineage::listener]`) to register `{Self}`."
)]
pub trait Listener: AsAny + Send + Sync {}

/// Listeners whose declared members can be enumerated.
///
/// This is the introspection capability discovery scans. Only members declared
/// directly on the implementing type are reported.
pub trait Introspect: Listener + Sized {
    /// Every member declared on this type.
    fn members() -> Vec<Member<Self>>;
}

/// Reference identity of a registered listener instance.
///
/// Derived from the address of the shared allocation, so two `Arc`s pointing
/// at the same instance have the same id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(usize);

impl ListenerId {
    /// The identity of the instance behind `listener`.
    pub fn of<L: ?Sized>(listener: &Arc<L>) -> Self {
        Self(Arc::as_ptr(listener) as *const () as usize)
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({:#x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;
    impl Listener for Probe {}

    #[test]
    fn identity_follows_the_allocation() {
        let a = Arc::new(Probe);
        let b = Arc::clone(&a);
        let c = Arc::new(Probe);
        assert_eq!(ListenerId::of(&a), ListenerId::of(&b));
        assert_ne!(ListenerId::of(&a), ListenerId::of(&c));

        let erased: Arc<dyn Listener> = a.clone();
        assert_eq!(ListenerId::of(&erased), ListenerId::of(&a));
    }

    #[test]
    fn erased_listener_downcasts() {
        let erased: Arc<dyn Listener> = Arc::new(Probe);
        assert!(AsAny::as_any(&*erased).downcast_ref::<Probe>().is_some());
    }
}
