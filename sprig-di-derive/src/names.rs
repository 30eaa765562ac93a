use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, LitStr};

/// Canonical name of an item defined in the current module.
pub fn canonical_name(ident: &Ident) -> TokenStream {
    quote!(concat!(module_path!(), "::", stringify!(#ident)))
}

/// Module path given by the user. `crate::` and `self::` prefixes are resolved against the
/// current crate and module, everything else is taken as-is.
pub fn module_path(path: &LitStr) -> TokenStream {
    let value = path.value();
    if let Some(rest) = strip_root(&value, "crate") {
        quote!(concat!(env!("CARGO_CRATE_NAME"), #rest))
    } else if let Some(rest) = strip_root(&value, "self") {
        quote!(concat!(module_path!(), #rest))
    } else {
        quote!(#path)
    }
}

/// Canonical name of a type given by the user. Plain type names are relative to the current
/// module.
pub fn type_path(path: &LitStr) -> TokenStream {
    let value = path.value();
    if value.contains("::") {
        module_path(path)
    } else {
        quote!(concat!(module_path!(), "::", #path))
    }
}

// returns the remainder including the leading separator
fn strip_root<'a>(value: &'a str, root: &str) -> Option<&'a str> {
    value
        .strip_prefix(root)
        .filter(|rest| rest.is_empty() || rest.starts_with("::"))
}
