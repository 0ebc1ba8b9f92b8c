//! Delivery through the bus: hierarchy walk, filters and error policy.

mod common;

use common::{Flaky, Journal, Unrelated, base, leaf, mid};
use lineage::{
    EventBus, MethodCollector, ParameterRule, PublishError, Publisher, Storage, Subscriber,
    SubscriberFilter, by_priority, testing::ErrorLog,
};
use std::sync::Arc;

fn sorted_bus() -> EventBus {
    EventBus::builder()
        .collector(
            MethodCollector::builder(ParameterRule::first_parameter())
                .storage(Storage::Sorted(by_priority()))
                .build(),
        )
        .build()
}

#[test]
fn leaf_reaches_every_ancestor_level_once() {
    let bus = EventBus::new();
    let journal = Arc::new(Journal::default());
    bus.register(&journal);

    let report = bus.publish(&leaf(1)).unwrap();
    assert_eq!(journal.entries(), vec!["leaf:1", "mid:1", "base:1"]);
    assert_eq!(report.invoked, 3);
}

#[test]
fn ancestor_event_does_not_reach_descendant_subscribers() {
    let bus = EventBus::new();
    let journal = Arc::new(Journal::default());
    bus.register(&journal);

    bus.publish(&base(2)).unwrap();
    assert_eq!(journal.entries(), vec!["base:2"]);

    bus.publish(&mid(3)).unwrap();
    assert_eq!(journal.entries(), vec!["base:2", "mid:3", "base:3"]);
}

#[test]
fn exact_publisher_only_visits_the_runtime_type() {
    let bus = EventBus::builder().publisher(Publisher::exact()).build();
    let journal = Arc::new(Journal::default());
    bus.register(&journal);

    bus.publish(&leaf(4)).unwrap();
    assert_eq!(journal.entries(), vec!["leaf:4"]);
}

#[test]
fn unmatched_event_is_a_silent_no_op() {
    let bus = EventBus::new();
    let journal = Arc::new(Journal::default());
    bus.register(&journal);

    let report = bus.publish(&Unrelated).unwrap();
    assert!(report.is_empty());
    assert!(journal.entries().is_empty());

    let empty = EventBus::new();
    assert!(empty.publish(&leaf(0)).unwrap().is_empty());
}

#[test]
fn handler_contains_failures_and_delivery_continues() {
    let bus = sorted_bus();
    let flaky = Arc::new(Flaky::default());
    bus.register(&flaky);
    let log = ErrorLog::new();

    let report = bus.publish_with(&mid(5), &log).unwrap();
    assert_eq!(flaky.calls(), vec!["first", "second", "third"]);
    assert_eq!(report.invoked, 2);
    assert_eq!(report.failed, 1);

    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1, "second failed");

    let failing = bus
        .with_handle(lineage::ListenerId::of(&flaky), |handle| {
            handle
                .subscribers()
                .iter()
                .find(|s| s.member().map(|m| m.name()) == Some("second"))
                .map(Subscriber::id)
        })
        .flatten();
    assert_eq!(failing, Some(entries[0].0));
}

#[test]
fn failure_without_handler_aborts_the_publish() {
    let bus = sorted_bus();
    let flaky = Arc::new(Flaky::default());
    bus.register(&flaky);

    let err = bus.publish(&leaf(6)).unwrap_err();
    assert_eq!(flaky.calls(), vec!["first", "second"]);

    let PublishError::Subscriber { event, source, .. } = &err;
    assert_eq!(*event, lineage::EventType::of::<common::Leaf>());
    assert_eq!(source.to_string(), "second failed");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn closure_handler_sees_the_failing_subscriber() {
    let bus = sorted_bus();
    let flaky = Arc::new(Flaky::default());
    bus.register(&flaky);

    let seen = std::cell::RefCell::new(Vec::new());
    let handler = |error: lineage::BoxError, _: &lineage::ListenerHandle, subscriber: &Subscriber| {
        seen.borrow_mut()
            .push((subscriber.member().map(|m| m.name()), error.to_string()));
    };
    bus.publish_with(&mid(7), &handler).unwrap();
    assert_eq!(
        seen.into_inner(),
        vec![(Some("second"), "second failed".to_string())]
    );
}

#[test]
fn subscriber_filters_apply_per_publisher() {
    let publisher = Publisher::builder()
        .filters([None])
        .filter(SubscriberFilter::new(|s: &Subscriber| {
            s.member().is_some_and(|m| m.name() != "on_mid")
        }))
        .build();
    let bus = EventBus::builder().publisher(publisher).build();
    let journal = Arc::new(Journal::default());
    bus.register(&journal);

    let report = bus.publish(&leaf(8)).unwrap();
    assert_eq!(journal.entries(), vec!["leaf:8", "base:8"]);
    assert_eq!(report.filtered, 1);
}

#[test]
fn every_listener_receives_the_event() {
    let bus = EventBus::new();
    let first = Arc::new(Journal::default());
    let second = Arc::new(Journal::default());
    bus.register(&first);
    bus.register(&second);

    let report = bus.publish(&base(9)).unwrap();
    assert_eq!(first.entries(), vec!["base:9"]);
    assert_eq!(second.entries(), vec!["base:9"]);
    assert_eq!(report.invoked, 2);
}

#[test]
fn standard_handlers_swallow_failures() {
    use lineage::handlers::{IgnoreErrors, LoggingErrorHandler};

    let bus = sorted_bus();
    let flaky = Arc::new(Flaky::default());
    bus.register(&flaky);

    let logged = bus.publish_with(&mid(10), &LoggingErrorHandler).unwrap();
    let ignored = bus.publish_with(&leaf(11), &IgnoreErrors).unwrap();
    assert_eq!(logged, ignored);
    assert_eq!(logged.failed, 1);
    assert_eq!(flaky.calls().len(), 6);
}
