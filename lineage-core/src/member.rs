//! # Introspectable Members
//!
//! A [`Member`] describes one function declared on a listener type: its name,
//! [`Modifiers`], declared parameters and, when its shape allows it, an
//! [`Invoker`] that calls it with type-erased [`Arg`]s.
//!
//! Members are normally produced by `#[lineage::listener]`. Hand-written
//! [`Introspect`](crate::Introspect) impls build them the same way:
//!
//! ```rust,ignore
//! impl Introspect for Greeter {
//!     fn members() -> Vec<Member<Self>> {
//!         vec![
//!             Member::new("on_login", Modifiers::PUBLIC, vec![param_info!(Login)])
//!                 .invoker(|greeter: &Self, args: &[Arg<'_>]| {
//!                     let login = Arg::extract::<Login>(args, 0)?;
//!                     greeter.on_login(login).into_outcome()
//!                 }),
//!         ]
//!     }
//! }
//! ```

use crate::{
    error::{BoxError, InvocationError},
    event::{DynEvent, DynEventExt, Event, EventType},
    handle::ListenerHandle,
};
use bitflags::bitflags;
use std::{
    any::{Any, TypeId, type_name},
    fmt,
    sync::Arc,
};

bitflags! {
    /// Declaration modifiers of a member.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Declared `pub`.
        const PUBLIC = 1;
        /// Declared without a `self` receiver.
        const STATIC = 1 << 1;
        /// Declared `async`.
        const ASYNC = 1 << 2;
        /// Declared `const`.
        const CONST = 1 << 3;
        /// Declared `unsafe`.
        const UNSAFE = 1 << 4;
    }
}

/// Declared type of one member parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamInfo {
    type_name: &'static str,
    type_id: Option<TypeId>,
    event_type: Option<EventType>,
}

impl ParamInfo {
    /// A parameter declared as the event type `T`.
    pub fn event<T: Event>() -> Self {
        Self {
            type_name: type_name::<T>(),
            type_id: Some(TypeId::of::<T>()),
            event_type: Some(EventType::of::<T>()),
        }
    }

    /// A parameter of a non-event type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_name: type_name::<T>(),
            type_id: Some(TypeId::of::<T>()),
            event_type: None,
        }
    }

    /// A parameter whose type cannot be resolved, known only by its spelling.
    pub fn opaque(type_name: &'static str) -> Self {
        Self {
            type_name,
            type_id: None,
            event_type: None,
        }
    }

    /// The declared type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The declared `TypeId`, if resolvable.
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// The event type, if the parameter is declared as an event.
    pub fn event_type(&self) -> Option<EventType> {
        self.event_type
    }

    /// Whether the parameter is declared as an event.
    pub fn is_event(&self) -> bool {
        self.event_type.is_some()
    }
}

/// Builds the [`ParamInfo`] of a declared parameter type.
///
/// Event types resolve to [`ParamInfo::event`], everything else to
/// [`ParamInfo::of`]. The type must be concrete at the expansion site.
#[macro_export]
macro_rules! param_info {
    ($ty:ty) => {{
        #[allow(unused_imports)]
        use $crate::__private::{EventProbe as _, OpaqueProbe as _};
        (&$crate::__private::Probe::<$ty>::new()).param_info()
    }};
}

#[doc(hidden)]
#[allow(missing_docs)]
pub mod probe {
    use super::ParamInfo;
    use crate::event::Event;
    use std::marker::PhantomData;

    pub struct Probe<T: ?Sized>(PhantomData<fn() -> *const T>);

    impl<T: ?Sized> Probe<T> {
        #[allow(clippy::new_without_default)]
        pub fn new() -> Self {
            Self(PhantomData)
        }
    }

    pub trait EventProbe {
        fn param_info(&self) -> ParamInfo;
    }

    impl<T: Event> EventProbe for Probe<T> {
        fn param_info(&self) -> ParamInfo {
            ParamInfo::event::<T>()
        }
    }

    pub trait OpaqueProbe {
        fn param_info(&self) -> ParamInfo;
    }

    impl<T: ?Sized + 'static> OpaqueProbe for &Probe<T> {
        fn param_info(&self) -> ParamInfo {
            ParamInfo::of::<T>()
        }
    }
}

/// Static description of a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    name: &'static str,
    owner: &'static str,
    modifiers: Modifiers,
    params: Vec<ParamInfo>,
    priority: i32,
}

impl MemberInfo {
    /// The member name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name of the declaring listener.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Declaration modifiers.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Declared parameters, in order.
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Declared parameter at `index`.
    pub fn param(&self, index: usize) -> Option<&ParamInfo> {
        self.params.get(index)
    }

    /// Priority hint carried to discovered subscribers.
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// One invocation argument.
pub enum Arg<'a> {
    /// The published event, viewable as any type in its lineage.
    Event(&'a dyn DynEvent),
    /// The handle of the listener the call originates from.
    Handle(&'a ListenerHandle),
    /// An arbitrary owned value.
    Value(Box<dyn Any + Send + Sync>),
}

impl<'a> Arg<'a> {
    /// Views this argument as `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        match self {
            Arg::Event(event) => event.view::<T>(),
            Arg::Handle(handle) => {
                let handle: &ListenerHandle = handle;
                (handle as &dyn Any).downcast_ref::<T>()
            }
            Arg::Value(value) => value.downcast_ref::<T>(),
        }
    }

    /// Resolves the argument at `index` as `T`.
    pub fn extract<T: Any>(args: &'a [Arg<'a>], index: usize) -> Result<&'a T, InvocationError> {
        let arg = args
            .get(index)
            .ok_or(InvocationError::MissingArgument { index })?;
        arg.get::<T>().ok_or(InvocationError::ArgumentMismatch {
            index,
            expected: type_name::<T>(),
        })
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Event(event) => f.debug_tuple("Event").field(&event.event_type()).finish(),
            Arg::Handle(handle) => f.debug_tuple("Handle").field(&handle.id()).finish(),
            Arg::Value(_) => f.write_str("Value(..)"),
        }
    }
}

/// Conversion of a member's return value into an invocation outcome.
pub trait IntoOutcome {
    /// Convert into the erased outcome.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map(|_| ()).map_err(Into::into)
    }
}

/// Type-erased call into a member of `L`.
pub struct Invoker<L>(Arc<dyn Fn(&L, &[Arg<'_>]) -> Result<(), BoxError> + Send + Sync>);

impl<L> Invoker<L> {
    /// Call the member on `listener`.
    pub fn invoke(&self, listener: &L, args: &[Arg<'_>]) -> Result<(), BoxError> {
        (self.0)(listener, args)
    }
}

impl<L> Clone for Invoker<L> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// An introspectable member of the listener type `L`.
pub struct Member<L> {
    info: MemberInfo,
    invoker: Option<Invoker<L>>,
}

impl<L: 'static> Member<L> {
    /// Describe a member declared on `L`. Without an invoker it is not invocable.
    pub fn new(name: &'static str, modifiers: Modifiers, params: Vec<ParamInfo>) -> Self {
        Self {
            info: MemberInfo {
                name,
                owner: type_name::<L>(),
                modifiers,
                params,
                priority: 0,
            },
            invoker: None,
        }
    }

    /// Attach the function that calls this member.
    pub fn invoker<F>(mut self, f: F) -> Self
    where
        F: Fn(&L, &[Arg<'_>]) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.invoker = Some(Invoker(Arc::new(f)));
        self
    }

    /// Set the priority hint.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.info.priority = priority;
        self
    }
}

impl<L> Member<L> {
    /// The static description.
    pub fn info(&self) -> &MemberInfo {
        &self.info
    }

    /// The invoker, if the member can be called.
    pub fn invoker_ref(&self) -> Option<&Invoker<L>> {
        self.invoker.as_ref()
    }

    /// Whether the member can be called through the erased protocol.
    pub fn is_invocable(&self) -> bool {
        self.invoker.is_some()
    }

    /// Call the member on `listener`.
    pub fn invoke(&self, listener: &L, args: &[Arg<'_>]) -> Result<(), BoxError> {
        match &self.invoker {
            Some(invoker) => invoker.invoke(listener, args),
            None => Err(InvocationError::NotInvocable {
                member: self.info.name,
            }
            .into()),
        }
    }
}

impl<L> Clone for Member<L> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            invoker: self.invoker.clone(),
        }
    }
}

impl<L> fmt::Debug for Member<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("info", &self.info)
            .field("invocable", &self.is_invocable())
            .finish()
    }
}
