//! Shared predicates used as filter chain entries.
//!
//! A filter chain is a `Vec<Option<Predicate<T>>>`. An absent entry always
//! passes; the chain rejects on the first present predicate returning `false`.

use crate::{member::MemberInfo, subscriber::Subscriber};
use std::{fmt, sync::Arc};

/// A cloneable, thread-safe predicate over `T`.
pub struct Predicate<T: ?Sized + 'static>(Arc<dyn Fn(&T) -> bool + Send + Sync>);

impl<T: ?Sized + 'static> Predicate<T> {
    /// Wrap `f`.
    pub fn new(f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Evaluate the predicate.
    pub fn test(&self, value: &T) -> bool {
        (self.0)(value)
    }
}

impl<T: ?Sized + 'static> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized + 'static> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Member-level filter used during discovery.
pub type MemberFilter = Predicate<MemberInfo>;

/// Subscriber-level filter used during dispatch.
pub type SubscriberFilter = Predicate<Subscriber>;

/// Whether `value` passes every present predicate in `chain`.
pub fn passes<T: ?Sized + 'static>(chain: &[Option<Predicate<T>>], value: &T) -> bool {
    chain.iter().flatten().all(|p| p.test(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_entries_always_pass() {
        let even = Predicate::new(|n: &u32| n % 2 == 0);
        let small = Predicate::new(|n: &u32| *n < 10);
        let chain = vec![None, Some(even), None, Some(small)];
        assert!(passes(&chain, &4));
        assert!(!passes(&chain, &3));
        assert!(!passes(&chain, &12));

        let empty: Vec<Option<Predicate<u32>>> = vec![None, None];
        assert!(passes(&empty, &7));
    }
}
