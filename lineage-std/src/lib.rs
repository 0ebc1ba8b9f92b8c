//! # lineage-std
//!
//! Standard implementations for the Lineage typed event bus.
//!
//! This crate provides:
//! - **Dispatch**: [`Publisher`](dispatch::Publisher), the polymorphic hierarchy walk
//! - **Discovery**: [`ParameterRule`](discovery::ParameterRule) and
//!   [`MethodCollector`](discovery::MethodCollector)
//! - **Error handlers**: [`LoggingErrorHandler`](handlers::LoggingErrorHandler)
//! - **Testing doubles**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use lineage_core;

// Modules
pub mod discovery;
pub mod dispatch;
pub mod handlers;
pub mod testing;
