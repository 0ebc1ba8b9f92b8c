//! # Event Hierarchy
//!
//! Events form a single-rooted type hierarchy. Every event type names its
//! direct ancestor through [`Event::Parent`]; top-level events name
//! [`EventRoot`], the designated abstract root that can never be instantiated.
//!
//! Subtyping is expressed by composition: a subtype embeds a value of its
//! ancestor and hands it out through [`Event::parent`]. This keeps the
//! hierarchy walk an explicit, finite loop over [`EventType::ancestors`].
//! A cyclic `Parent` declaration ends the walk at the first repeated type.
//!
//! ```rust,ignore
//! struct Login { user: String }
//! impl Event for Login { type Parent = EventRoot; }
//!
//! struct AdminLogin { login: Login, level: u8 }
//! impl Event for AdminLogin {
//!     type Parent = Login;
//!     fn parent(&self) -> Option<&Login> { Some(&self.login) }
//! }
//! ```

use std::{
    any::{Any, TypeId, type_name},
    fmt,
    hash::{Hash, Hasher},
    sync::atomic::{AtomicBool, Ordering},
};

/// A value representing a notification.
///
/// Implementors declare their direct ancestor via `Parent`. A subtype must
/// return its embedded ancestor value from [`parent`](Event::parent), otherwise
/// subscribers declared for the ancestor cannot view the event.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Event",
    label = "missing `Event` implementation",
    note = "Events must name their direct ancestor, use `EventRoot` for top-level events."
)]
pub trait Event: Send + Sync + 'static {
    /// The direct ancestor in the event hierarchy.
    type Parent: Event;

    /// The embedded ancestor value, if this event is a subtype.
    fn parent(&self) -> Option<&Self::Parent> {
        None
    }
}

/// The abstract root of every event hierarchy.
///
/// Uninhabited: no value of this type can exist, so it is never published.
/// It only terminates the hierarchy walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRoot {}

impl Event for EventRoot {
    type Parent = EventRoot;

    fn parent(&self) -> Option<&EventRoot> {
        match *self {}
    }
}

/// Runtime identifier of an event type.
///
/// Carries the parent lookup for its type, so ancestor chains can be walked
/// without a value at hand. Equality and hashing use the underlying `TypeId`.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
    parent: fn() -> Option<EventType>,
}

fn parent_of<T: Event>() -> Option<EventType> {
    if TypeId::of::<T>() == TypeId::of::<EventRoot>() {
        None
    } else {
        Some(EventType::of::<T::Parent>())
    }
}

impl EventType {
    /// The identifier of `T`.
    pub fn of<T: Event>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            parent: parent_of::<T>,
        }
    }

    /// The identifier of [`EventRoot`].
    pub fn root() -> Self {
        Self::of::<EventRoot>()
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The direct ancestor, `None` only for the root.
    pub fn parent(&self) -> Option<EventType> {
        (self.parent)()
    }

    /// Whether this is the root identifier.
    pub fn is_root(&self) -> bool {
        self.id == TypeId::of::<EventRoot>()
    }

    /// Iterates this type and its ancestors, most-derived first, root last.
    ///
    /// Every type is yielded at most once.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(*self),
            seen: Vec::new(),
        }
    }

    /// Number of steps between this type and the root.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// Whether `self` is `other` or one of its descendants.
    pub fn is_subtype_of(&self, other: EventType) -> bool {
        self.ancestors().any(|ty| ty == other)
    }

    /// Whether a value of type `other` may be treated as `self`.
    pub fn is_assignable_from(&self, other: EventType) -> bool {
        other.is_subtype_of(*self)
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over an [`EventType`] and its ancestors.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<EventType>,
    seen: Vec<TypeId>,
}

impl Iterator for Ancestors {
    type Item = EventType;

    fn next(&mut self) -> Option<EventType> {
        let current = self.next.take()?;
        self.seen.push(current.id);
        self.next = current
            .parent()
            .filter(|parent| !self.seen.contains(&parent.id));
        Some(current)
    }
}

/// Dynamic object-safe version of [`Event`].
///
/// Every `Event` implements this trait automatically. Publishing and
/// subscriber invocation work on `&dyn DynEvent`.
pub trait DynEvent: Send + Sync + 'static {
    /// The most-derived runtime type of this value.
    fn event_type(&self) -> EventType;

    /// The embedded ancestor value, type-erased.
    fn parent_dyn(&self) -> Option<&dyn DynEvent>;

    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Upcast to the object type.
    fn as_dyn(&self) -> &dyn DynEvent;
}

// Blanket implementation: Any type implementing Event implements DynEvent automatically.
impl<T: Event> DynEvent for T {
    fn event_type(&self) -> EventType {
        EventType::of::<T>()
    }

    fn parent_dyn(&self) -> Option<&dyn DynEvent> {
        self.parent().map(|parent| parent as &dyn DynEvent)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_dyn(&self) -> &dyn DynEvent {
        self
    }
}

/// Lineage-aware queries over event values.
pub trait DynEventExt {
    /// Views this event as `T`, walking the embedded ancestor chain.
    fn view<T: Any>(&self) -> Option<&T>;

    /// Whether the runtime type is `ty` or one of its descendants.
    fn is_instance_of(&self, ty: EventType) -> bool;

    /// Iterates the value and its embedded ancestors, most-derived first.
    fn lineage(&self) -> Lineage<'_>;
}

impl<E: DynEvent + ?Sized> DynEventExt for E {
    fn view<T: Any>(&self) -> Option<&T> {
        self.lineage()
            .find_map(|level| level.as_any().downcast_ref::<T>())
    }

    fn is_instance_of(&self, ty: EventType) -> bool {
        self.event_type().is_subtype_of(ty)
    }

    fn lineage(&self) -> Lineage<'_> {
        Lineage {
            next: Some(self.as_dyn()),
            seen: Vec::new(),
        }
    }
}

/// Iterator over an event value and its embedded ancestors.
///
/// Stops at the first level whose type was already yielded.
pub struct Lineage<'a> {
    next: Option<&'a dyn DynEvent>,
    seen: Vec<TypeId>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = &'a dyn DynEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.seen.push(current.event_type().id);
        self.next = current
            .parent_dyn()
            .filter(|parent| !self.seen.contains(&parent.event_type().id));
        Some(current)
    }
}

/// A settable cancellation flag that events may carry by convention.
///
/// The dispatch engine never reads it; subscribers check it themselves.
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    /// Create a new flag with the given initial state.
    pub fn new(cancelled: bool) -> Self {
        Self(AtomicBool::new(cancelled))
    }

    /// Check whether the flag is set.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set or clear the flag.
    pub fn set_cancelled(&self, cancelled: bool) {
        self.0.store(cancelled, Ordering::Release);
    }
}

/// Events that carry a [`CancelFlag`].
pub trait Cancellable {
    /// The flag carried by this event.
    fn cancel_flag(&self) -> &CancelFlag;

    /// Whether a subscriber has cancelled this event.
    fn is_cancelled(&self) -> bool {
        self.cancel_flag().is_cancelled()
    }

    /// Mark this event cancelled, or clear the mark.
    fn set_cancelled(&self, cancelled: bool) {
        self.cancel_flag().set_cancelled(cancelled);
    }
}
