//! # Deduction Rules
//!
//! A [`DeductionRule`] decides which members of a listener handle events,
//! which event type each one handles, and how to call it from a subscriber.
//! Rules hold no mutable state and may be shared across listeners.

use lineage_core::{
    Arg, BoxError, DynEvent, Event, EventCallback, EventType, Introspect,
    InvocationError, ListenerHandle, Member, MemberInfo, Modifiers,
};
use std::{any::type_name, fmt, sync::Arc};

/// Classifies listener members and adapts them into callbacks.
pub trait DeductionRule: Send + Sync + 'static {
    /// Whether `member` qualifies as an event handler.
    fn is_event_member<L: Introspect>(&self, member: &Member<L>) -> bool;

    /// The event type `member` handles, if it declares one.
    fn event_type_of(&self, member: &MemberInfo) -> Option<EventType>;

    /// A callback that invokes `member` on the listener behind the origin handle.
    fn callable_for<L: Introspect>(&self, member: &Member<L>) -> Arc<dyn EventCallback>;
}

/// Builds the invocation arguments for a discovered member.
pub trait ArgumentFactory: Send + Sync + 'static {
    /// Arguments for one call, in parameter order.
    fn create<'a>(&self, origin: &'a ListenerHandle, event: &'a dyn DynEvent) -> Vec<Arg<'a>>;
}

impl<F> ArgumentFactory for F
where
    F: for<'a> Fn(&'a ListenerHandle, &'a dyn DynEvent) -> Vec<Arg<'a>> + Send + Sync + 'static,
{
    fn create<'a>(&self, origin: &'a ListenerHandle, event: &'a dyn DynEvent) -> Vec<Arg<'a>> {
        self(origin, event)
    }
}

/// Passes the event as the only argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventOnly;

impl ArgumentFactory for EventOnly {
    fn create<'a>(&self, _origin: &'a ListenerHandle, event: &'a dyn DynEvent) -> Vec<Arg<'a>> {
        vec![Arg::Event(event)]
    }
}

/// Passes the event followed by the origin handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventWithHandle;

impl ArgumentFactory for EventWithHandle {
    fn create<'a>(&self, origin: &'a ListenerHandle, event: &'a dyn DynEvent) -> Vec<Arg<'a>> {
        vec![Arg::Event(event), Arg::Handle(origin)]
    }
}

/// Qualifies members by the declared type of one parameter.
///
/// A member qualifies when it is invocable, declares its event parameter as
/// `base` or a descendant of it, and carries none of the disallowed
/// modifiers. The declared type of that parameter is the handled event type.
#[derive(Clone)]
pub struct ParameterRule {
    base: EventType,
    event_param: usize,
    disallowed: Modifiers,
    args: Arc<dyn ArgumentFactory>,
}

impl ParameterRule {
    /// The default rule: any event as the first parameter, static members
    /// rejected, the event passed as the only argument.
    pub fn first_parameter() -> Self {
        Self {
            base: EventType::root(),
            event_param: 0,
            disallowed: Modifiers::STATIC,
            args: Arc::new(EventOnly),
        }
    }

    /// Only accept events of type `E` or its descendants.
    pub fn base<E: Event>(self) -> Self {
        self.base_type(EventType::of::<E>())
    }

    /// Only accept events of `base` or its descendants.
    pub fn base_type(mut self, base: EventType) -> Self {
        self.base = base;
        self
    }

    /// Position of the event parameter.
    pub fn event_param(mut self, index: usize) -> Self {
        self.event_param = index;
        self
    }

    /// Reject members carrying any of `modifiers`.
    pub fn disallow(mut self, modifiers: Modifiers) -> Self {
        self.disallowed = modifiers;
        self
    }

    /// Use `factory` to build the invocation arguments.
    pub fn arguments(mut self, factory: impl ArgumentFactory) -> Self {
        self.args = Arc::new(factory);
        self
    }

    /// The accepted event base type.
    pub fn base_event_type(&self) -> EventType {
        self.base
    }

    /// The disallowed modifiers.
    pub fn disallowed(&self) -> Modifiers {
        self.disallowed
    }
}

impl Default for ParameterRule {
    fn default() -> Self {
        Self::first_parameter()
    }
}

impl fmt::Debug for ParameterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterRule")
            .field("base", &self.base)
            .field("event_param", &self.event_param)
            .field("disallowed", &self.disallowed)
            .finish_non_exhaustive()
    }
}

impl DeductionRule for ParameterRule {
    fn is_event_member<L: Introspect>(&self, member: &Member<L>) -> bool {
        member.is_invocable()
            && !member.info().modifiers().intersects(self.disallowed)
            && self.event_type_of(member.info()).is_some()
    }

    fn event_type_of(&self, member: &MemberInfo) -> Option<EventType> {
        member
            .param(self.event_param)?
            .event_type()
            .filter(|ty| ty.is_subtype_of(self.base))
    }

    fn callable_for<L: Introspect>(&self, member: &Member<L>) -> Arc<dyn EventCallback> {
        let member = member.clone();
        let args = Arc::clone(&self.args);
        Arc::new(
            move |origin: &ListenerHandle, event: &dyn DynEvent| -> Result<(), BoxError> {
                let listener = origin
                    .listener_as::<L>()
                    .ok_or(InvocationError::ListenerMismatch {
                        expected: type_name::<L>(),
                    })?;
                let arguments = args.create(origin, event);
                member.invoke(listener, &arguments)
            },
        )
    }
}
