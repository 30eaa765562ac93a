use crate::attributes::ApplicationAttributes;
use crate::names::{canonical_name, module_path};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, DeriveInput, Result};

const APPLICATION: &str = "application";

fn extract_application_attributes(attributes: &[Attribute]) -> Result<ApplicationAttributes> {
    attributes
        .iter()
        .filter(|attribute| attribute.path().is_ident(APPLICATION))
        .map(ApplicationAttributes::try_from)
        .next()
        .transpose()
        .map(Option::unwrap_or_default)
}

pub fn expand_application(input: &DeriveInput) -> Result<TokenStream> {
    let ident = &input.ident;
    let name = canonical_name(ident);
    let attributes = extract_application_attributes(&input.attrs)?;

    let package = attributes
        .package
        .as_ref()
        .map(module_path)
        .unwrap_or_else(|| quote!(module_path!()));
    let include = attributes.include.iter().map(module_path);
    let exclude = attributes.exclude.iter().map(module_path);
    let resources = attributes
        .resources
        .map(|resources| quote!(Some(#resources)))
        .unwrap_or_else(|| quote!(None));

    Ok(quote! {
        const _: () = {
            fn type_id() -> std::any::TypeId {
                std::any::TypeId::of::<#ident>()
            }

            fn scan() -> sprig_di::scanner::ComponentScan {
                sprig_di::scanner::ComponentScan {
                    package: #package.to_string(),
                    include: vec![#(#include.to_string()),*],
                    exclude: vec![#(#exclude.to_string()),*],
                }
            }

            sprig_di::component_registry::internal::submit! {
                sprig_di::component_registry::internal::ApplicationRegisterer {
                    type_id,
                    name: #name,
                    scan,
                    resources: #resources,
                }
            };
        };
    })
}
