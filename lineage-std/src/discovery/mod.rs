//! # Discovery
//!
//! Turning listeners into subscribers:
//!
//! - [`DeductionRule`]: which members handle which events, and how to call them
//! - [`ParameterRule`]: the standard rule, keyed on a declared event parameter
//! - [`MethodCollector`]: applies a rule and member filters to a listener

pub mod collector;
pub mod deduction;

pub use collector::{MethodCollector, MethodCollectorBuilder, SubscriberCollector};
pub use deduction::{ArgumentFactory, DeductionRule, EventOnly, EventWithHandle, ParameterRule};
