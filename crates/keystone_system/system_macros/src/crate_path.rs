//! Locating `keystone_system` from the crate that invokes the derive.
//!
//! Generated impls name items such as `keystone_system::inject::Field`, so
//! the first segment has to match how the caller actually reaches the crate:
//!
//! | Caller | Emitted root |
//! |--------|--------------|
//! | `keystone_system` itself (tests, doctests) | `keystone_system` (via `extern crate self`) |
//! | depends on `keystone_system`, possibly renamed | the dependency's local name |
//! | depends only on the `keystone` umbrella, possibly renamed | `<name>::keystone_system` |
//! | neither can be found in `Cargo.toml` | `keystone_system` |

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Ident;

const CORE_CRATE: &str = "keystone_system";
const UMBRELLA_CRATE: &str = "keystone";

/// Returns the path prefix for `keystone_system` items in generated code.
pub(crate) fn keystone_system_path() -> TokenStream {
    root_path(crate_name(CORE_CRATE).ok(), crate_name(UMBRELLA_CRATE).ok())
}

fn root_path(core: Option<FoundCrate>, umbrella: Option<FoundCrate>) -> TokenStream {
    let core_ident = Ident::new(CORE_CRATE, Span::call_site());
    match (core, umbrella) {
        (Some(FoundCrate::Name(name)), _) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(#ident)
        }
        (None, Some(FoundCrate::Name(name))) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(#ident::#core_ident)
        }
        _ => quote!(#core_ident),
    }
}
