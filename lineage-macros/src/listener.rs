//! `#[listener]` on an inherent impl block.
//!
//! Emits the impl unchanged (minus `#[listen(..)]` helpers), a `Listener`
//! impl and an `Introspect` impl listing one `Member` per associated fn.
//! Members whose shape fits the erased calling convention also get an
//! invoker:
//!
//! - receiver is `&self` or absent
//! - no generics, not `async`, not `unsafe`
//! - every parameter is `&T` for a plain path type `T`
//! - returns nothing or a `Result`

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Attribute, Expr, FnArg, ImplItem, ImplItemFn, ItemImpl, ReturnType, Type, Visibility,
    ext::IdentExt, parse_macro_input,
};

/// Implementation of the `#[listener]` attribute macro.
pub fn listener_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[listener] does not take arguments",
        )
        .to_compile_error()
        .into();
    }
    let mut input = parse_macro_input!(item as ItemImpl);
    match expand(&mut input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[listener] must be applied to an inherent impl block",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic listeners are not supported",
        ));
    }

    let mut members = Vec::new();
    for item in &mut input.items {
        if let ImplItem::Fn(method) = item {
            let priority = take_priority(&mut method.attrs)?;
            members.push(member(method, priority));
        }
    }

    let self_ty = &input.self_ty;
    Ok(quote! {
        #input

        impl ::lineage::Listener for #self_ty {}

        impl ::lineage::Introspect for #self_ty {
            fn members() -> ::std::vec::Vec<::lineage::Member<Self>> {
                ::std::vec![#(#members),*]
            }
        }
    })
}

/// Removes `#[listen(..)]` helpers, returning the priority they carry.
fn take_priority(attrs: &mut Vec<Attribute>) -> syn::Result<Option<Expr>> {
    let mut priority = None;
    let mut result = Ok(());
    attrs.retain(|attr| {
        if !attr.path().is_ident("listen") {
            return true;
        }
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("priority") {
                priority = Some(meta.value()?.parse::<Expr>()?);
                Ok(())
            } else {
                Err(meta.error("unknown listen attribute, expected `priority`"))
            }
        });
        if let Err(err) = parsed {
            result = Err(err);
        }
        false
    });
    result.map(|()| priority)
}

fn member(method: &ImplItemFn, priority: Option<Expr>) -> TokenStream2 {
    let sig = &method.sig;
    let name = &sig.ident;
    let name_str = name.unraw().to_string();
    let receiver = sig.receiver();
    let generic = !sig.generics.params.is_empty();

    let mut modifiers = Vec::new();
    if matches!(method.vis, Visibility::Public(_)) {
        modifiers.push(quote!(::lineage::Modifiers::PUBLIC));
    }
    if receiver.is_none() {
        modifiers.push(quote!(::lineage::Modifiers::STATIC));
    }
    if sig.asyncness.is_some() {
        modifiers.push(quote!(::lineage::Modifiers::ASYNC));
    }
    if sig.constness.is_some() {
        modifiers.push(quote!(::lineage::Modifiers::CONST));
    }
    if sig.unsafety.is_some() {
        modifiers.push(quote!(::lineage::Modifiers::UNSAFE));
    }
    let modifiers = if modifiers.is_empty() {
        quote!(::lineage::Modifiers::empty())
    } else {
        quote!(#(#modifiers)|*)
    };

    let params: Vec<&Type> = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(typed) => Some(&*typed.ty),
            FnArg::Receiver(_) => None,
        })
        .collect();
    // Generic parameter types are not nameable from `members()`.
    let extractable: Vec<Option<&Type>> = params
        .iter()
        .map(|ty| if generic { None } else { extractable(ty) })
        .collect();

    let param_infos = params.iter().zip(&extractable).map(|(ty, inner)| match inner {
        Some(inner) => quote!(::lineage::param_info!(#inner)),
        None => quote!(::lineage::ParamInfo::opaque(::core::stringify!(#ty))),
    });

    let receiver_ok = receiver.is_none_or(|r| {
        r.reference.is_some() && r.mutability.is_none() && r.colon_token.is_none()
    });
    let invocable = receiver_ok
        && !generic
        && sig.asyncness.is_none()
        && sig.unsafety.is_none()
        && extractable.iter().all(Option::is_some)
        && returns_outcome(&sig.output);

    let invoker = invocable.then(|| {
        let bindings: Vec<_> = (0..params.len()).map(|i| format_ident!("__arg{}", i)).collect();
        let extracts = extractable
            .iter()
            .flatten()
            .zip(&bindings)
            .enumerate()
            .map(|(index, (ty, binding))| {
                quote! {
                    let #binding = ::lineage::Arg::extract::<#ty>(__args, #index)?;
                }
            });
        let (listener, call) = if receiver.is_some() {
            (
                quote!(__listener),
                quote!(__listener.#name(#(#bindings),*)),
            )
        } else {
            (quote!(_), quote!(Self::#name(#(#bindings),*)))
        };
        quote! {
            .invoker(|#listener: &Self, __args: &[::lineage::Arg<'_>]| {
                let _ = __args;
                #(#extracts)*
                ::lineage::IntoOutcome::into_outcome(#call)
            })
        }
    });

    let priority = priority.map(|p| quote!(.with_priority(#p)));

    quote! {
        ::lineage::Member::new(#name_str, #modifiers, ::std::vec![#(#param_infos),*])
            #invoker
            #priority
    }
}

/// The referent of `&T` when `T` is a plain, lifetime-free path type.
fn extractable(ty: &Type) -> Option<&Type> {
    let Type::Reference(reference) = ty else {
        return None;
    };
    if reference.mutability.is_some() {
        return None;
    }
    let Type::Path(path) = &*reference.elem else {
        return None;
    };
    if path.qself.is_some() || path.path.is_ident("str") {
        return None;
    }
    let spelled = quote!(#path).to_string();
    if spelled.contains('&') || spelled.contains('\'') {
        return None;
    }
    Some(&reference.elem)
}

fn returns_outcome(output: &ReturnType) -> bool {
    match output {
        ReturnType::Default => true,
        ReturnType::Type(_, ty) => match &**ty {
            Type::Tuple(tuple) => tuple.elems.is_empty(),
            Type::Path(path) => path
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Result"),
            _ => false,
        },
    }
}
