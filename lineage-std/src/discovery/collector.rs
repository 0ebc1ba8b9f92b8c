//! # Subscriber Collection
//!
//! [`MethodCollector`] scans the members a listener type declares, keeps the
//! ones its [`DeductionRule`] accepts and its member filters let through, and
//! returns them as a fresh [`SubscriberIndex`]. It never calls the members.

use super::deduction::{DeductionRule, ParameterRule};
use lineage_core::{
    Introspect, MemberFilter, Storage, Subscriber, SubscriberIndex, passes,
};
use std::sync::Arc;

/// Turns a listener into the subscribers it owns.
pub trait SubscriberCollector: Send + Sync {
    /// Discover the subscribers of `listener`.
    fn collect<L: Introspect>(&self, listener: &Arc<L>) -> SubscriberIndex;
}

/// Collects subscribers from introspected members.
#[derive(Debug, Clone)]
pub struct MethodCollector<R = ParameterRule> {
    rule: R,
    filters: Vec<Option<MemberFilter>>,
    storage: Storage,
}

impl Default for MethodCollector {
    fn default() -> Self {
        Self::new(ParameterRule::first_parameter())
    }
}

impl<R: DeductionRule> MethodCollector<R> {
    /// A collector applying `rule` with no member filters and set storage.
    pub fn new(rule: R) -> Self {
        Self {
            rule,
            filters: Vec::new(),
            storage: Storage::Set,
        }
    }

    /// Start building a collector around `rule`.
    pub fn builder(rule: R) -> MethodCollectorBuilder<R> {
        MethodCollectorBuilder {
            rule,
            filters: Vec::new(),
            storage: Storage::Set,
        }
    }

    /// The deduction rule.
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// The member filter chain.
    pub fn filters(&self) -> &[Option<MemberFilter>] {
        &self.filters
    }

    /// The storage strategy of produced indexes.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl<R: DeductionRule> SubscriberCollector for MethodCollector<R> {
    fn collect<L: Introspect>(&self, _listener: &Arc<L>) -> SubscriberIndex {
        let mut index = SubscriberIndex::with_storage(self.storage.clone());

        for member in L::members() {
            if !self.rule.is_event_member(&member) {
                continue;
            }
            if !passes(&self.filters, member.info()) {
                continue;
            }
            let Some(event_type) = self.rule.event_type_of(member.info()) else {
                continue;
            };
            let callback = self.rule.callable_for(&member);
            index.add(Subscriber::for_member(
                event_type,
                callback,
                member.info().clone(),
            ));
        }

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(
                listener = std::any::type_name::<L>(),
                subscribers = index.len(),
                "Collected subscribers"
            );
        }

        index
    }
}

/// Builder for [`MethodCollector`].
#[derive(Debug, Clone)]
pub struct MethodCollectorBuilder<R = ParameterRule> {
    rule: R,
    filters: Vec<Option<MemberFilter>>,
    storage: Storage,
}

impl<R: DeductionRule> MethodCollectorBuilder<R> {
    /// Append a member filter.
    pub fn filter(mut self, filter: MemberFilter) -> Self {
        self.filters.push(Some(filter));
        self
    }

    /// Append a chain of optional member filters. Absent entries always pass.
    pub fn filters(mut self, filters: impl IntoIterator<Item = Option<MemberFilter>>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Storage strategy of produced indexes.
    pub fn storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    /// Build the collector.
    pub fn build(self) -> MethodCollector<R> {
        MethodCollector {
            rule: self.rule,
            filters: self.filters,
            storage: self.storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::{
        Arg, Event, EventRoot, EventType, IntoOutcome, Listener, Member, Modifiers, param_info,
    };
    use std::collections::HashMap;

    struct Joined;
    impl Event for Joined {
        type Parent = EventRoot;
    }

    struct Left;
    impl Event for Left {
        type Parent = EventRoot;
    }

    struct Lobby;
    impl Listener for Lobby {}

    impl Lobby {
        fn greet(&self, _: &Joined) {}
        fn wave(&self, _: &Joined) {}
        fn farewell(&self, _: &Left) -> Result<(), String> {
            Ok(())
        }
    }

    impl Introspect for Lobby {
        fn members() -> Vec<Member<Self>> {
            vec![
                Member::new("greet", Modifiers::PUBLIC, vec![param_info!(Joined)])
                    .invoker(|lobby: &Self, args: &[Arg<'_>]| {
                        lobby.greet(Arg::extract::<Joined>(args, 0)?).into_outcome()
                    }),
                Member::new("wave", Modifiers::empty(), vec![param_info!(Joined)])
                    .invoker(|lobby: &Self, args: &[Arg<'_>]| {
                        lobby.wave(Arg::extract::<Joined>(args, 0)?).into_outcome()
                    })
                    .with_priority(4),
                Member::new("farewell", Modifiers::PUBLIC, vec![param_info!(Left)])
                    .invoker(|lobby: &Self, args: &[Arg<'_>]| {
                        lobby.farewell(Arg::extract::<Left>(args, 0)?).into_outcome()
                    }),
                Member::new("open", Modifiers::STATIC, vec![param_info!(Joined)])
                    .invoker(|_: &Self, _: &[Arg<'_>]| Ok(())),
                Member::new("capacity", Modifiers::PUBLIC, vec![]),
            ]
        }
    }

    fn shape(index: &SubscriberIndex) -> HashMap<EventType, usize> {
        index
            .event_types()
            .map(|ty| (ty, index.group(ty).len()))
            .collect()
    }

    #[test]
    fn collects_qualifying_members() {
        let index = MethodCollector::default().collect(&Arc::new(Lobby));
        assert_eq!(index.len(), 3);
        assert_eq!(index.group(EventType::of::<Joined>()).len(), 2);
        assert_eq!(index.group(EventType::of::<Left>()).len(), 1);
        assert!(index.iter().all(|s| s.is_member()));

        let wave = index
            .iter()
            .find(|s| s.member().map(|m| m.name()) == Some("wave"))
            .unwrap();
        assert_eq!(wave.priority(), 4);
    }

    #[test]
    fn discovery_is_deterministic() {
        let collector = MethodCollector::default();
        let lobby = Arc::new(Lobby);
        let first = collector.collect(&lobby);
        let second = collector.collect(&lobby);
        assert_eq!(shape(&first), shape(&second));
        assert!(!first.contains_all(second.iter()));
    }

    #[test]
    fn member_filters_short_circuit() {
        let collector = MethodCollector::builder(ParameterRule::first_parameter())
            .filters([None])
            .filter(MemberFilter::new(|m| m.modifiers().contains(Modifiers::PUBLIC)))
            .storage(Storage::List)
            .build();
        let index = collector.collect(&Arc::new(Lobby));
        assert_eq!(index.len(), 2);
        assert!(matches!(index.storage(), Storage::List));
        assert!(
            index
                .iter()
                .all(|s| s.member().is_some_and(|m| m.name() != "wave"))
        );
    }
}
