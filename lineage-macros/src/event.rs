//! `#[derive(Event)]`.
//!
//! Without a `#[event(parent)]` field the event is top-level and its parent
//! is `EventRoot`. With one, the field's type is the direct ancestor and the
//! field value is handed out as the embedded ancestor.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Index, Member, Type, parse_macro_input, spanned::Spanned};

/// Implementation of `#[derive(Event)]`.
pub fn derive_event_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match parent_field(&input.data)? {
        Some((member, ty)) => quote! {
            type Parent = #ty;

            fn parent(&self) -> ::core::option::Option<&Self::Parent> {
                ::core::option::Option::Some(&self.#member)
            }
        },
        None => quote! {
            type Parent = ::lineage::EventRoot;
        },
    };

    Ok(quote! {
        impl #impl_generics ::lineage::Event for #name #ty_generics #where_clause {
            #body
        }
    })
}

fn parent_field(data: &Data) -> syn::Result<Option<(Member, &Type)>> {
    let fields = match data {
        Data::Struct(data) => &data.fields,
        Data::Enum(_) | Data::Union(_) => return Ok(None),
    };
    let fields = match fields {
        Fields::Named(named) => &named.named,
        Fields::Unnamed(unnamed) => &unnamed.unnamed,
        Fields::Unit => return Ok(None),
    };

    let mut found: Option<(Member, &Type)> = None;
    for (position, field) in fields.iter().enumerate() {
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("event")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("parent") {
                    Ok(())
                } else {
                    Err(meta.error("unsupported event attribute, expected `parent`"))
                }
            })?;

            if found.is_some() {
                return Err(syn::Error::new(
                    attr.span(),
                    "an event can have at most one `#[event(parent)]` field",
                ));
            }
            let member = match &field.ident {
                Some(ident) => Member::Named(ident.clone()),
                None => Member::Unnamed(Index::from(position)),
            };
            found = Some((member, &field.ty));
        }
    }
    Ok(found)
}
