// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use proc_macro2::TokenStream;
use syn::spanned::Spanned;
use syn::{Error, Item};

use self::enum_api::core_enum;
use self::struct_api::core_struct;
use crate::syn_helpers::token_stream_and_error;

mod enum_api;
mod options;
mod struct_api;

pub type Result<T> = std::result::Result<T, Error>;

#[must_use]
pub fn entrypoint(attr: TokenStream, input: TokenStream) -> TokenStream {
    let item_ast = syn::parse2::<Item>(input.clone());

    let result = match item_ast {
        Ok(Item::Enum(item)) => core_enum(attr, item),
        Ok(Item::Struct(item)) => core_struct(attr, item),
        Ok(x) => Err(syn::Error::new(
            x.span(),
            "The `oxidizer_api_lifecycle::api` attribute must be applied to a struct or enum.",
        )),
        Err(e) => Err(e),
    };

    match result {
        Ok(r) => r,
        Err(e) => token_stream_and_error(input, e),
    }
}
