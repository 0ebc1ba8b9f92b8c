//! # Subscriber Index
//!
//! A [`SubscriberIndex`] groups subscribers by the event type they are bound
//! to. Every stored subscriber lives in exactly the group of its own event
//! type and groups never stay empty: removing the last member of a group
//! removes the group.
//!
//! The per-group collection is chosen once through [`Storage`]:
//!
//! - [`Storage::Set`] keeps unique subscribers, in no particular order
//! - [`Storage::List`] keeps insertion order and allows duplicates
//! - [`Storage::Sorted`] keeps each group ordered by a comparator

use crate::{
    event::EventType,
    subscriber::{Comparator, Subscriber, SubscriberId},
};
use std::{
    collections::{HashMap, HashSet, hash_map},
    fmt,
};

/// Per-group collection strategy.
#[derive(Clone, Default)]
pub enum Storage {
    /// Unique subscribers, unspecified iteration order.
    #[default]
    Set,
    /// Insertion order, duplicates allowed.
    List,
    /// Ordered by the comparator, duplicates allowed.
    Sorted(Comparator),
}

impl Storage {
    fn empty_group(&self) -> Group {
        match self {
            Storage::Set => Group::Set(HashSet::new()),
            Storage::List | Storage::Sorted(_) => Group::List(Vec::new()),
        }
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Storage::Set => f.write_str("Set"),
            Storage::List => f.write_str("List"),
            Storage::Sorted(_) => f.write_str("Sorted(..)"),
        }
    }
}

/// The subscribers bound to one event type.
#[derive(Debug, Clone)]
pub enum Group {
    /// Set-backed group.
    Set(HashSet<Subscriber>),
    /// Sequence-backed group.
    List(Vec<Subscriber>),
}

static EMPTY_GROUP: Group = Group::List(Vec::new());

impl Group {
    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Group::Set(set) => set.len(),
            Group::List(list) => list.len(),
        }
    }

    /// Whether the group has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `subscriber` is in the group.
    pub fn contains(&self, subscriber: &Subscriber) -> bool {
        match self {
            Group::Set(set) => set.contains(subscriber),
            Group::List(list) => list.contains(subscriber),
        }
    }

    /// Iterates the entries in storage order.
    pub fn iter(&self) -> GroupIter<'_> {
        match self {
            Group::Set(set) => GroupIter::Set(set.iter()),
            Group::List(list) => GroupIter::List(list.iter()),
        }
    }

    fn retain(&mut self, mut keep: impl FnMut(&Subscriber) -> bool) {
        match self {
            Group::Set(set) => set.retain(|s| keep(s)),
            Group::List(list) => list.retain(|s| keep(s)),
        }
    }
}

impl<'a> IntoIterator for &'a Group {
    type Item = &'a Subscriber;
    type IntoIter = GroupIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`Group`].
pub enum GroupIter<'a> {
    /// Over a set-backed group.
    Set(std::collections::hash_set::Iter<'a, Subscriber>),
    /// Over a sequence-backed group.
    List(std::slice::Iter<'a, Subscriber>),
}

impl<'a> Iterator for GroupIter<'a> {
    type Item = &'a Subscriber;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            GroupIter::Set(it) => it.next(),
            GroupIter::List(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            GroupIter::Set(it) => it.size_hint(),
            GroupIter::List(it) => it.size_hint(),
        }
    }
}

/// Subscribers grouped by event type.
#[derive(Debug, Clone, Default)]
pub struct SubscriberIndex {
    groups: HashMap<EventType, Group>,
    storage: Storage,
}

impl SubscriberIndex {
    /// An empty index using set storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty index using `storage`.
    pub fn with_storage(storage: Storage) -> Self {
        Self {
            groups: HashMap::new(),
            storage,
        }
    }

    /// The storage strategy.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Insert `subscriber` into the group of its event type.
    ///
    /// Returns `false` if set storage already held it.
    pub fn add(&mut self, subscriber: Subscriber) -> bool {
        let key = subscriber.event_type();
        let group = match self.groups.entry(key) {
            hash_map::Entry::Occupied(entry) => entry.into_mut(),
            hash_map::Entry::Vacant(entry) => entry.insert(self.storage.empty_group()),
        };
        match (group, &self.storage) {
            (Group::Set(set), _) => set.insert(subscriber),
            (Group::List(list), Storage::Sorted(cmp)) => {
                // After any existing equal entries.
                let at = list.partition_point(|s| cmp(s, &subscriber).is_le());
                list.insert(at, subscriber);
                true
            }
            (Group::List(list), _) => {
                list.push(subscriber);
                true
            }
        }
    }

    /// Remove one occurrence of `subscriber`.
    ///
    /// Returns `false` if it was not stored.
    pub fn remove(&mut self, subscriber: &Subscriber) -> bool {
        let key = subscriber.event_type();
        let Some(group) = self.groups.get_mut(&key) else {
            return false;
        };
        let removed = match group {
            Group::Set(set) => set.remove(subscriber),
            Group::List(list) => match list.iter().position(|s| s == subscriber) {
                Some(at) => {
                    list.remove(at);
                    true
                }
                None => false,
            },
        };
        if group.is_empty() {
            self.groups.remove(&key);
        }
        removed
    }

    /// Drop the whole group of `event_type`.
    pub fn remove_group(&mut self, event_type: EventType) -> bool {
        self.groups.remove(&event_type).is_some()
    }

    /// The group of `event_type`, empty if none is stored.
    pub fn group(&self, event_type: EventType) -> &Group {
        self.groups.get(&event_type).unwrap_or(&EMPTY_GROUP)
    }

    /// Iterates every stored subscriber.
    ///
    /// Group order is unspecified; within a group, storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Subscriber> + '_ {
        self.groups.values().flat_map(Group::iter)
    }

    /// The stored event types.
    pub fn event_types(&self) -> impl Iterator<Item = EventType> + '_ {
        self.groups.keys().copied()
    }

    /// Number of stored entries across all groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(Group::len).sum()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Whether `subscriber` is stored.
    pub fn contains(&self, subscriber: &Subscriber) -> bool {
        self.groups
            .get(&subscriber.event_type())
            .is_some_and(|group| group.contains(subscriber))
    }

    /// Whether any subscriber is bound to `event_type`.
    pub fn contains_type(&self, event_type: EventType) -> bool {
        self.groups.contains_key(&event_type)
    }

    /// Whether every subscriber in `subscribers` is stored.
    ///
    /// Vacuously true for an empty input.
    pub fn contains_all<'s>(&self, subscribers: impl IntoIterator<Item = &'s Subscriber>) -> bool {
        ids_by_type(subscribers).into_iter().all(|(key, ids)| {
            self.groups.get(&key).is_some_and(|group| {
                let present: HashSet<SubscriberId> = group.iter().map(Subscriber::id).collect();
                ids.is_subset(&present)
            })
        })
    }

    /// Insert every subscriber, one batch per group.
    ///
    /// Returns whether anything changed.
    pub fn add_all(&mut self, subscribers: impl IntoIterator<Item = Subscriber>) -> bool {
        let mut by_type: HashMap<EventType, Vec<Subscriber>> = HashMap::new();
        for subscriber in subscribers {
            by_type
                .entry(subscriber.event_type())
                .or_default()
                .push(subscriber);
        }

        let mut changed = false;
        for (key, batch) in by_type {
            let group = match self.groups.entry(key) {
                hash_map::Entry::Occupied(entry) => entry.into_mut(),
                hash_map::Entry::Vacant(entry) => entry.insert(self.storage.empty_group()),
            };
            let before = group.len();
            match (group, &self.storage) {
                (Group::Set(set), _) => set.extend(batch),
                (Group::List(list), Storage::Sorted(cmp)) => {
                    // Stable, so equal entries keep insertion order.
                    list.extend(batch);
                    list.sort_by(|a, b| cmp(a, b));
                }
                (Group::List(list), _) => list.extend(batch),
            }
            changed |= self.groups.get(&key).map_or(0, Group::len) != before;
        }
        changed
    }

    /// Remove every occurrence of every given subscriber.
    ///
    /// Returns whether anything changed.
    pub fn remove_all<'s>(&mut self, subscribers: impl IntoIterator<Item = &'s Subscriber>) -> bool {
        let mut changed = false;
        for (key, ids) in ids_by_type(subscribers) {
            let Some(group) = self.groups.get_mut(&key) else {
                continue;
            };
            let before = group.len();
            group.retain(|s| !ids.contains(&s.id()));
            changed |= group.len() != before;
            if group.is_empty() {
                self.groups.remove(&key);
            }
        }
        changed
    }

    /// Keep only the given subscribers, dropping every other entry.
    ///
    /// Returns whether anything changed.
    pub fn retain_all<'s>(&mut self, subscribers: impl IntoIterator<Item = &'s Subscriber>) -> bool {
        let by_type = ids_by_type(subscribers);
        let before = self.len();
        self.groups.retain(|key, group| match by_type.get(key) {
            Some(ids) => {
                group.retain(|s| ids.contains(&s.id()));
                !group.is_empty()
            }
            None => false,
        });
        self.len() != before
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Reorder every sequence-backed group by `cmp`.
    ///
    /// Set-backed groups have no order and are left alone.
    pub fn sort_by(&mut self, cmp: impl Fn(&Subscriber, &Subscriber) -> std::cmp::Ordering) {
        for group in self.groups.values_mut() {
            if let Group::List(list) = group {
                list.sort_by(&cmp);
            }
        }
    }

    /// A new index holding the subscribers bound to `base` or any of its
    /// descendants that satisfy `capability`.
    ///
    /// The new index uses the same storage strategy.
    pub fn derived_of(&self, base: EventType, capability: impl Fn(&Subscriber) -> bool) -> Self {
        let mut derived = Self::with_storage(self.storage.clone());
        for (key, group) in &self.groups {
            if !key.is_subtype_of(base) {
                continue;
            }
            for subscriber in group.iter().filter(|s| capability(s)) {
                derived.add(subscriber.clone());
            }
        }
        derived
    }
}

fn ids_by_type<'s>(
    subscribers: impl IntoIterator<Item = &'s Subscriber>,
) -> HashMap<EventType, HashSet<SubscriberId>> {
    let mut by_type: HashMap<EventType, HashSet<SubscriberId>> = HashMap::new();
    for subscriber in subscribers {
        by_type
            .entry(subscriber.event_type())
            .or_default()
            .insert(subscriber.id());
    }
    by_type
}

impl Extend<Subscriber> for SubscriberIndex {
    fn extend<I: IntoIterator<Item = Subscriber>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl FromIterator<Subscriber> for SubscriberIndex {
    fn from_iter<I: IntoIterator<Item = Subscriber>>(iter: I) -> Self {
        let mut index = Self::new();
        index.add_all(iter);
        index
    }
}
