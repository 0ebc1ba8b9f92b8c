#![allow(dead_code)]

use lineage::{
    Arg, Event, EventRoot, Introspect, IntoOutcome, Listener, Member, Modifiers, param_info,
};
use std::sync::Mutex;

// ============================================================================
// Test Event Types
// ============================================================================

/// Top-level event.
#[derive(Debug)]
pub struct Base {
    pub id: u32,
}

impl Event for Base {
    type Parent = EventRoot;
}

/// `Mid extends Base`.
#[derive(Debug)]
pub struct Mid {
    pub base: Base,
}

impl Event for Mid {
    type Parent = Base;

    fn parent(&self) -> Option<&Base> {
        Some(&self.base)
    }
}

/// `Leaf extends Mid`.
#[derive(Debug)]
pub struct Leaf {
    pub mid: Mid,
}

impl Event for Leaf {
    type Parent = Mid;

    fn parent(&self) -> Option<&Mid> {
        Some(&self.mid)
    }
}

/// Unrelated top-level event.
#[derive(Debug)]
pub struct Unrelated;

impl Event for Unrelated {
    type Parent = EventRoot;
}

pub fn base(id: u32) -> Base {
    Base { id }
}

pub fn mid(id: u32) -> Mid {
    Mid { base: base(id) }
}

pub fn leaf(id: u32) -> Leaf {
    Leaf { mid: mid(id) }
}

// ============================================================================
// Test Listeners
// ============================================================================

/// Records which of its members ran, in order.
#[derive(Default)]
pub struct Journal {
    pub entries: Mutex<Vec<String>>,
}

impl Listener for Journal {}

impl Journal {
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    fn on_base(&self, event: &Base) {
        self.entries.lock().unwrap().push(format!("base:{}", event.id));
    }

    fn on_mid(&self, event: &Mid) {
        self.entries
            .lock()
            .unwrap()
            .push(format!("mid:{}", event.base.id));
    }

    fn on_leaf(&self, event: &Leaf) {
        self.entries
            .lock()
            .unwrap()
            .push(format!("leaf:{}", event.mid.base.id));
    }

    fn tally(&self, _count: &u32) {}

    fn describe(_event: &Base) {}
}

impl Introspect for Journal {
    fn members() -> Vec<Member<Self>> {
        vec![
            Member::new("on_base", Modifiers::PUBLIC, vec![param_info!(Base)]).invoker(
                |journal: &Self, args: &[Arg<'_>]| {
                    journal.on_base(Arg::extract::<Base>(args, 0)?).into_outcome()
                },
            ),
            Member::new("on_mid", Modifiers::PUBLIC, vec![param_info!(Mid)]).invoker(
                |journal: &Self, args: &[Arg<'_>]| {
                    journal.on_mid(Arg::extract::<Mid>(args, 0)?).into_outcome()
                },
            ),
            Member::new("on_leaf", Modifiers::empty(), vec![param_info!(Leaf)]).invoker(
                |journal: &Self, args: &[Arg<'_>]| {
                    journal.on_leaf(Arg::extract::<Leaf>(args, 0)?).into_outcome()
                },
            ),
            Member::new("tally", Modifiers::PUBLIC, vec![param_info!(u32)]).invoker(
                |journal: &Self, args: &[Arg<'_>]| {
                    journal.tally(Arg::extract::<u32>(args, 0)?).into_outcome()
                },
            ),
            Member::new("describe", Modifiers::STATIC, vec![param_info!(Base)]).invoker(
                |_: &Self, args: &[Arg<'_>]| {
                    Self::describe(Arg::extract::<Base>(args, 0)?).into_outcome()
                },
            ),
        ]
    }
}

/// Three `Mid` members; the middle one fails.
#[derive(Default)]
pub struct Flaky {
    pub calls: Mutex<Vec<&'static str>>,
}

impl Listener for Flaky {}

impl Flaky {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn first(&self, _: &Mid) {
        self.calls.lock().unwrap().push("first");
    }

    fn second(&self, _: &Mid) -> Result<(), String> {
        self.calls.lock().unwrap().push("second");
        Err("second failed".to_string())
    }

    fn third(&self, _: &Mid) {
        self.calls.lock().unwrap().push("third");
    }
}

impl Introspect for Flaky {
    fn members() -> Vec<Member<Self>> {
        vec![
            Member::new("first", Modifiers::empty(), vec![param_info!(Mid)])
                .invoker(|flaky: &Self, args: &[Arg<'_>]| {
                    flaky.first(Arg::extract::<Mid>(args, 0)?).into_outcome()
                })
                .with_priority(3),
            Member::new("second", Modifiers::empty(), vec![param_info!(Mid)])
                .invoker(|flaky: &Self, args: &[Arg<'_>]| {
                    flaky.second(Arg::extract::<Mid>(args, 0)?).into_outcome()
                })
                .with_priority(2),
            Member::new("third", Modifiers::empty(), vec![param_info!(Mid)])
                .invoker(|flaky: &Self, args: &[Arg<'_>]| {
                    flaky.third(Arg::extract::<Mid>(args, 0)?).into_outcome()
                })
                .with_priority(1),
        ]
    }
}
