//! Procedural macros for Lineage.
//!
//! - `#[derive(Event)]` - implements `Event`, with an optional `#[event(parent)]` field
//! - `#[listener]` - implements `Listener` and `Introspect` for an inherent impl block

use proc_macro::TokenStream;

mod event;
mod listener;

/// Derive macro for implementing the `Event` trait.
///
/// Mark the field holding the direct ancestor with `#[event(parent)]`:
///
/// ```rust,ignore
/// #[derive(Event)]
/// struct Login { user: String }
///
/// #[derive(Event)]
/// struct AdminLogin {
///     #[event(parent)]
///     login: Login,
///     level: u8,
/// }
/// ```
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    event::derive_event_impl(input)
}

/// Makes the functions of an inherent impl block discoverable.
///
/// Every associated fn becomes a `Member`. Use `#[listen(priority = N)]` on a
/// method to set the priority hint of the subscriber discovered from it.
///
/// ```rust,ignore
/// #[lineage::listener]
/// impl Audit {
///     #[listen(priority = 10)]
///     fn on_login(&self, login: &Login) -> Result<(), AuditError> { ... }
/// }
/// ```
#[proc_macro_attribute]
pub fn listener(attr: TokenStream, item: TokenStream) -> TokenStream {
    listener::listener_impl(attr, item)
}
