use crate::attributes::{BindAttributes, InterfaceAttributes};
use crate::names::{canonical_name, type_path};
use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Error, ItemTrait, Result, TraitItem, TraitItemFn};

const BIND: &str = "bind";

fn check_trait(item: &ItemTrait) -> Result<()> {
    if item.generics.params.is_empty() {
        Ok(())
    } else {
        Err(Error::new(
            item.generics.span(),
            "Injectable traits cannot be generic!",
        ))
    }
}

fn generate_alias(attributes: &InterfaceAttributes) -> TokenStream {
    attributes
        .alias
        .as_ref()
        .map(|alias| quote!(Some(#alias.to_string())))
        .unwrap_or_else(|| quote!(None))
}

fn generate_registration(item: &ItemTrait, alias: TokenStream, kind: TokenStream) -> TokenStream {
    let ident = &item.ident;
    quote! {
        const _: () = {
            fn register() -> sprig_di::component::TypeDescriptor {
                sprig_di::component::TypeDescriptor {
                    name: <dyn #ident + Send + Sync as sprig_di::instance::Injectable>::canonical_name()
                        .to_string(),
                    alias: #alias,
                    kind: #kind,
                }
            }

            sprig_di::component_registry::internal::submit! {
                sprig_di::component_registry::internal::TypeRegisterer {
                    register
                }
            };
        };
    }
}

pub fn expand_injectable(attributes: &InterfaceAttributes, item: &ItemTrait) -> Result<TokenStream> {
    check_trait(item)?;

    let ident = &item.ident;
    let name = canonical_name(ident);
    let registration = generate_registration(
        item,
        generate_alias(attributes),
        quote!(sprig_di::component::TypeKind::Interface),
    );

    Ok(quote! {
        #item

        #[automatically_derived]
        impl sprig_di::instance::Injectable for dyn #ident + Send + Sync {
            fn canonical_name() -> &'static str {
                #name
            }

            fn from_instance(
                instance: sprig_di::instance::ComponentInstanceAnyPtr,
            ) -> Option<sprig_di::instance::ComponentInstancePtr<Self>> {
                sprig_di::instance::from_interface_view(instance)
            }
        }

        #registration
    })
}

struct MapperMethod {
    signature: syn::Signature,
    binding: Option<BindAttributes>,
}

fn extract_method(method: &mut TraitItemFn) -> Result<MapperMethod> {
    let valid_receiver = method
        .sig
        .receiver()
        .map(|receiver| receiver.reference.is_some() && receiver.mutability.is_none())
        .unwrap_or(false);
    if !valid_receiver {
        return Err(Error::new(
            method.sig.span(),
            "Mapper methods must take &self!",
        ));
    }

    let binding = method
        .attrs
        .iter()
        .find(|attribute| attribute.path().is_ident(BIND))
        .map(BindAttributes::try_from)
        .transpose()?;
    method.attrs.retain(|attribute| !attribute.path().is_ident(BIND));

    Ok(MapperMethod {
        signature: method.sig.clone(),
        binding,
    })
}

fn generate_method_metadata(method: &MapperMethod) -> TokenStream {
    let name = method.signature.ident.to_string();
    let binding = method
        .binding
        .as_ref()
        .map(|binding| {
            let class_name = type_path(&binding.class);
            let method_name = binding
                .method
                .as_ref()
                .map(|method_name| method_name.value())
                .unwrap_or_else(|| name.clone());
            let parameter_types = &binding.param_types;
            let parameter_values = &binding.param_values;
            let description = binding
                .description
                .as_ref()
                .map(|description| description.value())
                .unwrap_or_default();

            quote! {
                Some(sprig_di::component::BindingMetadata {
                    class_name: #class_name.to_string(),
                    method_name: #method_name.to_string(),
                    parameter_types: vec![#(#parameter_types.to_string()),*],
                    parameter_values: vec![#(#parameter_values.to_string()),*],
                    description: #description.to_string(),
                })
            }
        })
        .unwrap_or_else(|| quote!(None));

    quote! {
        sprig_di::component::MapperMethod {
            name: #name.to_string(),
            binding: #binding,
        }
    }
}

pub fn expand_mapper(attributes: &InterfaceAttributes, mut item: ItemTrait) -> Result<TokenStream> {
    check_trait(&item)?;

    let methods: Vec<_> = item
        .items
        .iter_mut()
        .map(|trait_item| match trait_item {
            TraitItem::Fn(method) => extract_method(method),
            other => Err(Error::new(
                other.span(),
                "Mappers can only declare methods!",
            )),
        })
        .try_collect()?;

    let ident = &item.ident;
    let name = canonical_name(ident);
    let metadata = methods.iter().map(generate_method_metadata).collect_vec();
    let registration = generate_registration(
        &item,
        generate_alias(attributes),
        quote!(sprig_di::component::TypeKind::Mapper(vec![#(#metadata),*])),
    );

    let implementations = methods.iter().map(|method| {
        let signature = &method.signature;
        let method_name = signature.ident.to_string();
        quote! {
            #[allow(unused_variables)]
            #signature {
                self.invoke_typed(#method_name).map_err(Into::into)
            }
        }
    });

    Ok(quote! {
        #item

        #[automatically_derived]
        impl #ident for sprig_di::proxy::MapperProxy {
            #(#implementations)*
        }

        #[automatically_derived]
        impl sprig_di::instance::Injectable for dyn #ident + Send + Sync {
            fn canonical_name() -> &'static str {
                #name
            }

            fn from_instance(
                instance: sprig_di::instance::ComponentInstanceAnyPtr,
            ) -> Option<sprig_di::instance::ComponentInstancePtr<Self>> {
                instance
                    .downcast::<sprig_di::proxy::MapperProxy>()
                    .ok()
                    .filter(|proxy| proxy.interface() == Self::canonical_name())
                    .map(|proxy| proxy as sprig_di::instance::ComponentInstancePtr<Self>)
            }
        }

        #registration
    })
}
