// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Attribute macro backing `test_with_tracing::test`.

use quote::quote;
use syn::parse_macro_input;
use syn::spanned::Spanned;
use syn::Error;
use syn::ItemFn;

/// Drop-in replacement for `#[test]` that installs a `tracing` subscriber
/// before the test body runs.
///
/// Other attributes on the function (`#[should_panic]`, `#[ignore]`, ...) are
/// forwarded to the generated test.
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let attr = proc_macro2::TokenStream::from(attr);
    if !attr.is_empty() {
        return Error::new(attr.span(), "this attribute takes no arguments")
            .to_compile_error()
            .into();
    }

    let item = parse_macro_input!(item as ItemFn);
    wrap_test(item)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn wrap_test(mut item: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    if let Some(asyncness) = &item.sig.asyncness {
        return Err(Error::new(
            asyncness.span(),
            "async tests are not supported",
        ));
    }
    if !item.sig.inputs.is_empty() {
        return Err(Error::new(
            item.sig.inputs.span(),
            "test functions take no arguments",
        ));
    }

    // The outer function carries the test attributes; the inner copy is the
    // original body.
    let attrs = std::mem::take(&mut item.attrs);
    let vis = &item.vis;
    let name = &item.sig.ident;
    let output = &item.sig.output;

    Ok(quote! {
        #[::core::prelude::v1::test]
        #(#attrs)*
        #vis fn #name() #output {
            #item
            ::test_with_tracing::init();
            #name()
        }
    })
}
