// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use proc_macro2::TokenStream;
use syn::parse_quote;

use super::entrypoint_common::common_codegen;

#[must_use]
pub fn impl_runtime_main(args: TokenStream, item: TokenStream) -> TokenStream {
    common_codegen(args, item, false, false, parse_quote!(::oxidizer_rt))
}
#[must_use]
pub fn impl_app_main(args: TokenStream, item: TokenStream) -> TokenStream {
    common_codegen(args, item, false, true, parse_quote!(::oxidizer_app))
}
#[must_use]
pub fn impl_oxidizer_app_main(args: TokenStream, item: TokenStream) -> TokenStream {
    common_codegen(args, item, false, true, parse_quote!(::oxidizer::app))
}
