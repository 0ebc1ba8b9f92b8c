//! # Polymorphic Publisher
//!
//! [`Publisher`] delivers an event to the subscribers of one listener handle.
//! It starts at the event's most-derived type and climbs the hierarchy, one
//! level per ancestor, stopping before the root. Each subscriber is stored
//! under exactly one type, so no subscriber runs twice in one call.
//!
//! # Example
//!
//! ```rust,ignore
//! let publisher = Publisher::builder()
//!     .filter(SubscriberFilter::new(|s| s.priority() >= 0))
//!     .build();
//! let report = publisher.publish(&event, &handle, None)?;
//! ```

use lineage_core::{
    BoxError, DynEvent, ListenerHandle, PublishError, Subscriber, SubscriberFilter, passes,
};
use std::ops::AddAssign;

/// Receives subscriber failures during a publish call.
///
/// When a handler is supplied, failures are contained: the handler is told
/// and delivery continues with the next subscriber.
pub trait ErrorHandler {
    /// Handle `error` raised by `subscriber` on behalf of `scope`.
    fn handle(&self, error: BoxError, scope: &ListenerHandle, subscriber: &Subscriber);
}

impl<F> ErrorHandler for F
where
    F: Fn(BoxError, &ListenerHandle, &Subscriber),
{
    fn handle(&self, error: BoxError, scope: &ListenerHandle, subscriber: &Subscriber) {
        self(error, scope, subscriber)
    }
}

/// Summary of one publish call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Subscribers whose callback returned successfully.
    pub invoked: usize,
    /// Subscribers whose callback failed and were passed to the error handler.
    pub failed: usize,
    /// Subscribers skipped by the filter chain.
    pub filtered: usize,
}

impl DeliveryReport {
    /// Whether no subscriber was reached at all.
    pub fn is_empty(&self) -> bool {
        self.invoked == 0 && self.failed == 0 && self.filtered == 0
    }

    /// Subscribers whose callback ran, successfully or not.
    pub fn attempted(&self) -> usize {
        self.invoked + self.failed
    }
}

impl AddAssign for DeliveryReport {
    fn add_assign(&mut self, rhs: Self) {
        self.invoked += rhs.invoked;
        self.failed += rhs.failed;
        self.filtered += rhs.filtered;
    }
}

/// Delivers an event to the subscribers of one listener handle.
pub trait EventPublisher: Send + Sync {
    /// Deliver `event` to the subscribers indexed in `scope`.
    ///
    /// Without an error handler the first subscriber failure aborts the call.
    fn publish(
        &self,
        event: &dyn DynEvent,
        scope: &ListenerHandle,
        error_handler: Option<&dyn ErrorHandler>,
    ) -> Result<DeliveryReport, PublishError>;
}

/// The standard publisher.
#[derive(Debug, Clone)]
pub struct Publisher {
    polymorphic: bool,
    filters: Vec<Option<SubscriberFilter>>,
}

impl Default for Publisher {
    fn default() -> Self {
        Self::polymorphic()
    }
}

impl Publisher {
    /// A publisher that also reaches subscribers of every ancestor type.
    pub fn polymorphic() -> Self {
        Self {
            polymorphic: true,
            filters: Vec::new(),
        }
    }

    /// A publisher that only reaches subscribers of the exact runtime type.
    pub fn exact() -> Self {
        Self {
            polymorphic: false,
            filters: Vec::new(),
        }
    }

    /// Start building a publisher.
    pub fn builder() -> PublisherBuilder {
        PublisherBuilder::default()
    }

    /// Whether ancestor levels are visited.
    pub fn is_polymorphic(&self) -> bool {
        self.polymorphic
    }

    /// The subscriber filter chain.
    pub fn filters(&self) -> &[Option<SubscriberFilter>] {
        &self.filters
    }
}

impl EventPublisher for Publisher {
    fn publish(
        &self,
        event: &dyn DynEvent,
        scope: &ListenerHandle,
        error_handler: Option<&dyn ErrorHandler>,
    ) -> Result<DeliveryReport, PublishError> {
        let mut report = DeliveryReport::default();
        let levels = event
            .event_type()
            .ancestors()
            .take_while(|ty| !ty.is_root());

        for ty in levels {
            let group = scope.subscribers().group(ty);

            #[cfg(feature = "tracing")]
            {
                if !group.is_empty() {
                    tracing::trace!(level = %ty, subscribers = group.len(), "Visiting dispatch level");
                }
            }

            for subscriber in group {
                if !passes(&self.filters, subscriber) {
                    report.filtered += 1;
                    continue;
                }
                if !subscriber.accepts(event) {
                    continue;
                }
                match subscriber.call(scope, event) {
                    Ok(()) => report.invoked += 1,
                    Err(error) => match error_handler {
                        Some(handler) => {
                            report.failed += 1;
                            handler.handle(error, scope, subscriber);
                        }
                        None => {
                            return Err(PublishError::Subscriber {
                                subscriber: subscriber.id(),
                                event: event.event_type(),
                                source: error,
                            });
                        }
                    },
                }
            }

            if !self.polymorphic {
                break;
            }
        }

        Ok(report)
    }
}

/// Builder for [`Publisher`].
#[derive(Debug, Clone)]
pub struct PublisherBuilder {
    polymorphic: bool,
    filters: Vec<Option<SubscriberFilter>>,
}

impl Default for PublisherBuilder {
    fn default() -> Self {
        Self {
            polymorphic: true,
            filters: Vec::new(),
        }
    }
}

impl PublisherBuilder {
    /// Enable or disable the ancestor walk.
    pub fn polymorphic(mut self, polymorphic: bool) -> Self {
        self.polymorphic = polymorphic;
        self
    }

    /// Append a filter to the chain.
    pub fn filter(mut self, filter: SubscriberFilter) -> Self {
        self.filters.push(Some(filter));
        self
    }

    /// Append a chain of optional filters. Absent entries always pass.
    pub fn filters(mut self, filters: impl IntoIterator<Item = Option<SubscriberFilter>>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Build the publisher.
    pub fn build(self) -> Publisher {
        Publisher {
            polymorphic: self.polymorphic,
            filters: self.filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingCallback, ErrorLog, FailingCallback, Recorder, detached_handle};
    use lineage_core::{Event, EventRoot, EventType, SubscriberIndex};

    struct Base;
    impl Event for Base {
        type Parent = EventRoot;
    }

    struct Mid {
        base: Base,
    }
    impl Event for Mid {
        type Parent = Base;
        fn parent(&self) -> Option<&Base> {
            Some(&self.base)
        }
    }

    struct Leaf {
        mid: Mid,
    }
    impl Event for Leaf {
        type Parent = Mid;
        fn parent(&self) -> Option<&Mid> {
            Some(&self.mid)
        }
    }

    struct Orphan;
    impl Event for Orphan {
        type Parent = Base;
    }

    struct Loop;
    impl Event for Loop {
        type Parent = Loop;
    }

    fn leaf() -> Leaf {
        Leaf {
            mid: Mid { base: Base },
        }
    }

    #[test]
    fn levels_run_most_derived_first() {
        let recorder = Recorder::new();
        let mut index = SubscriberIndex::new();
        index.add(Subscriber::new(EventType::of::<Base>(), recorder.callback("base")));
        index.add(Subscriber::new(EventType::of::<Leaf>(), recorder.callback("leaf")));
        index.add(Subscriber::new(EventType::of::<Mid>(), recorder.callback("mid")));
        let handle = detached_handle(index);

        let report = Publisher::polymorphic().publish(&leaf(), &handle, None).unwrap();
        assert_eq!(recorder.labels(), vec!["leaf", "mid", "base"]);
        assert_eq!(report.invoked, 3);

        recorder.clear();
        Publisher::exact().publish(&leaf(), &handle, None).unwrap();
        assert_eq!(recorder.labels(), vec!["leaf"]);

        recorder.clear();
        Publisher::polymorphic().publish(&Base, &handle, None).unwrap();
        assert_eq!(recorder.labels(), vec!["base"]);
    }

    #[test]
    fn no_subscribers_is_a_silent_no_op() {
        let handle = detached_handle(SubscriberIndex::new());
        let report = Publisher::default().publish(&leaf(), &handle, None).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn handler_contains_failures() {
        let first = CountingCallback::new();
        let third = CountingCallback::new();
        let mut index = SubscriberIndex::with_storage(lineage_core::Storage::List);
        index.add(Subscriber::new(EventType::of::<Mid>(), first.clone()));
        let failing = Subscriber::new(EventType::of::<Mid>(), FailingCallback::new("boom"));
        index.add(failing.clone());
        index.add(Subscriber::new(EventType::of::<Mid>(), third.clone()));
        let handle = detached_handle(index);
        let log = ErrorLog::new();

        let report = Publisher::polymorphic()
            .publish(&leaf(), &handle, Some(&log))
            .unwrap();
        assert_eq!(first.count(), 1);
        assert_eq!(third.count(), 1);
        assert_eq!(log.entries(), vec![(failing.id(), "boom".to_string())]);
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn missing_handler_fails_fast() {
        let first = CountingCallback::new();
        let third = CountingCallback::new();
        let mut index = SubscriberIndex::with_storage(lineage_core::Storage::List);
        index.add(Subscriber::new(EventType::of::<Mid>(), first.clone()));
        let failing = Subscriber::new(EventType::of::<Mid>(), FailingCallback::new("boom"));
        index.add(failing.clone());
        index.add(Subscriber::new(EventType::of::<Mid>(), third.clone()));
        let handle = detached_handle(index);

        let err = Publisher::polymorphic()
            .publish(&leaf(), &handle, None)
            .unwrap_err();
        assert_eq!(err.subscriber(), failing.id());
        assert_eq!(first.count(), 1);
        assert_eq!(third.count(), 0);
    }

    #[test]
    fn filters_skip_without_side_effects() {
        let kept = CountingCallback::new();
        let skipped = CountingCallback::new();
        let mut index = SubscriberIndex::new();
        index.add(Subscriber::new(EventType::of::<Base>(), kept.clone()).with_priority(1));
        index.add(Subscriber::new(EventType::of::<Base>(), skipped.clone()).with_priority(-1));
        let handle = detached_handle(index);

        let publisher = Publisher::builder()
            .filters([None])
            .filter(SubscriberFilter::new(|s: &Subscriber| s.priority() >= 0))
            .filters([None])
            .build();
        let report = publisher.publish(&Base, &handle, None).unwrap();
        assert_eq!(kept.count(), 1);
        assert_eq!(skipped.count(), 0);
        assert_eq!(report.filtered, 1);
    }

    #[test]
    fn ancestors_without_a_value_are_skipped() {
        let on_base = CountingCallback::new();
        let on_orphan = CountingCallback::new();
        let mut index = SubscriberIndex::new();
        index.add(Subscriber::typed::<Base, _>(|_, _| Ok(())));
        index.add(Subscriber::new(EventType::of::<Base>(), on_base.clone()));
        index.add(Subscriber::new(EventType::of::<Orphan>(), on_orphan.clone()));
        let handle = detached_handle(index);

        let report = Publisher::polymorphic().publish(&Orphan, &handle, None).unwrap();
        assert_eq!(report.invoked, 1);
        assert_eq!(on_orphan.count(), 1);
        assert_eq!(on_base.count(), 0);
    }

    #[test]
    fn cyclic_parent_is_visited_once() {
        let calls = CountingCallback::new();
        let mut index = SubscriberIndex::new();
        index.add(Subscriber::new(EventType::of::<Loop>(), calls.clone()));
        let handle = detached_handle(index);

        let report = Publisher::polymorphic().publish(&Loop, &handle, None).unwrap();
        assert_eq!(report.invoked, 1);
        assert_eq!(calls.count(), 1);
    }
}
