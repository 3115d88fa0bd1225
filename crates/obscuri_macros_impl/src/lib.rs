// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

#![doc(hidden)]
#![doc(html_logo_url = "https://media.githubusercontent.com/media/microsoft/oxidizer/refs/heads/main/crates/obscuri_macros_impl/logo.png")]
#![doc(
    html_favicon_url = "https://media.githubusercontent.com/media/microsoft/oxidizer/refs/heads/main/crates/obscuri_macros_impl/favicon.ico"
)]

//! Macros for the [`obscuri`](https://docs.rs/obscuri) crate.

mod enum_template;
pub(crate) mod error;
mod struct_template;
pub(crate) mod template_parser;
mod uri_fragment;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse2};

use crate::enum_template::enum_template;
use crate::struct_template::struct_template;
use crate::uri_fragment::{uri_fragment_impl, uri_unsafe_fragment_impl};

macro_rules! bail {
    ($span:ident, $msg:expr) => {
        crate::bail!($span, $msg, )
    };
    ($span:ident, $msg:expr, $($args:tt),*) => {
        return syn::Error::new_spanned($span, format!($msg, $($args,)*)).to_compile_error()
    };
}

pub(crate) use bail;

#[must_use]
#[expect(clippy::too_many_lines, reason = "Macro code")]
#[cfg_attr(test, mutants::skip)] // not relevant for auto-generated proc macros
pub fn templated_paq_impl(attr: &TokenStream, item: TokenStream) -> TokenStream {
    // Parse the item (struct/enum definition)
    let mut input: DeriveInput = match parse2(item) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    // If attributes were passed via the attribute macro, parse and add them
    if !attr.is_empty() {
        // Create an attribute from the tokens and add it to the input's attributes
        let attr_tokens = quote! { #[templated(#attr)] };
        match syn::parse2::<syn::DeriveInput>(quote! {
            #attr_tokens
            struct Dummy;
        }) {
            Ok(dummy) => {
                if let Some(parsed_attr) = dummy.attrs.into_iter().next() {
                    input.attrs.push(parsed_attr);
                }
            }
            Err(err) => return err.to_compile_error(),
        }
    }

    // Filter out the 'templated' attribute from the output to avoid recursion
    let output_attrs: Vec<_> = input
        .attrs
        .iter()
        .filter(|attr| !attr.path().is_ident("templated"))
        .collect();

    // Generate the original item definition WITHOUT the templated attribute
    let vis = &input.vis;
    let ident = &input.ident;
    let generics = &input.generics;
    let (impl_generics, _, where_clause) = generics.split_for_impl();
    let original = match &input.data {
        syn::Data::Struct(s) => {
            // Filter out templated and unredacted attributes from fields
            let filtered_fields = match &s.fields {
                syn::Fields::Named(fields) => {
                    let fields: Vec<_> = fields
                        .named
                        .iter()
                        .map(|f| {
                            let attrs: Vec<_> = f
                                .attrs
                                .iter()
                                .filter(|attr| {
                                    !attr.path().is_ident("templated")
                                        && !attr.path().is_ident("unredacted")
                                })
                                .collect();
                            let vis = &f.vis;
                            let ident = &f.ident;
                            let ty = &f.ty;
                            quote! { #(#attrs)* #vis #ident: #ty }
                        })
                        .collect();
                    quote! { { #(#fields),* } }
                }
                syn::Fields::Unnamed(fields) => {
                    let fields: Vec<_> = fields
                        .unnamed
                        .iter()
                        .map(|f| {
                            let attrs: Vec<_> = f
                                .attrs
                                .iter()
                                .filter(|attr| {
                                    !attr.path().is_ident("templated")
                                        && !attr.path().is_ident("unredacted")
                                })
                                .collect();
                            let vis = &f.vis;
                            let ty = &f.ty;
                            quote! { #(#attrs)* #vis #ty }
                        })
                        .collect();
                    quote! { ( #(#fields),* ) }
                }
                syn::Fields::Unit => quote! {},
            };
            match &s.fields {
                syn::Fields::Named(_) => {
                    quote! {
                        #(#output_attrs)*
                        #vis struct #ident #impl_generics #filtered_fields #where_clause
                    }
                }
                syn::Fields::Unnamed(_) => {
                    quote! {
                        #(#output_attrs)*
                        #vis struct #ident #impl_generics #filtered_fields #where_clause;
                    }
                }
                syn::Fields::Unit => {
                    quote! {
                        #(#output_attrs)*
                        #vis struct #ident #impl_generics #where_clause;
                    }
                }
            }
        }
        syn::Data::Enum(e) => {
            let variants = &e.variants;
            quote! {
                #(#output_attrs)*
                #vis enum #ident #impl_generics #where_clause {
                    #variants
                }
            }
        }
        syn::Data::Union(u) => {
            let fields = &u.fields;
            quote! {
                #(#output_attrs)*
                #vis union #ident #impl_generics #fields #where_clause
            }
        }
    };

    let implementation = match input.data {
        syn::Data::Struct(ref s) => struct_template(input.ident.clone(), s, &input.attrs),
        syn::Data::Enum(ref e) => enum_template(&input.ident, e),
        syn::Data::Union(_) => {
            return syn::Error::new_spanned(
                input.ident,
                "Unions are not supported for TemplatedUri",
            )
            .to_compile_error();
        }
    };

    quote! {
        #original
        #implementation
    }
}

#[must_use]
#[cfg_attr(test, mutants::skip)] // just emits compile error otherwise
pub fn uri_fragment_derive_impl(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    uri_fragment_impl(input)
}

#[must_use]
pub fn uri_unsafe_fragment_derive_impl(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    uri_unsafe_fragment_impl(input)
}
