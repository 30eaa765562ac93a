use crate::attributes::{AutowiredAttributes, ComponentAttributes, ValueAttributes};
use crate::names::canonical_name;
use convert_case::{Case, Casing};
use itertools::Itertools;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DataStruct, DeriveInput, Error, Field, Fields, Index, LitStr, Member, Result,
};

const COMPONENT: &str = "component";
const AUTOWIRED: &str = "autowired";
const VALUE: &str = "value";

const STEREOTYPES: [&str; 4] = ["component", "service", "controller", "repository"];

fn extract_component_attributes(attributes: &[Attribute]) -> Result<ComponentAttributes> {
    attributes
        .iter()
        .filter(|attribute| attribute.path().is_ident(COMPONENT))
        .map(ComponentAttributes::try_from)
        .next()
        .transpose()
        .map(Option::unwrap_or_default)
}

fn generate_stereotype(stereotype: Option<&LitStr>) -> Result<TokenStream> {
    let (name, span) = stereotype
        .map(|stereotype| (stereotype.value(), stereotype.span()))
        .unwrap_or_else(|| (STEREOTYPES[0].to_string(), Span::call_site()));

    if !STEREOTYPES.contains(&name.as_str()) {
        return Err(Error::new(
            span,
            format!("Unknown stereotype! Expected one of: {}", STEREOTYPES.join(", ")),
        ));
    }

    let variant = Ident::new(&name.to_case(Case::Pascal), span);
    Ok(quote!(sprig_di::component::Stereotype::#variant))
}

fn field_member(index: usize, field: &Field) -> (Member, String) {
    match &field.ident {
        Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
        None => (
            Member::Unnamed(Index {
                index: index as u32,
                span: field.span(),
            }),
            index.to_string(),
        ),
    }
}

fn generate_field(target: &Ident, index: usize, field: &Field) -> Result<Option<TokenStream>> {
    let (member, name) = field_member(index, field);
    let ty = &field.ty;
    let downcast = quote! {
        target
            .downcast_ref::<#target>()
            .ok_or(sprig_di::component::FieldAccessError::IncompatibleTarget)?
    };

    for attribute in &field.attrs {
        if attribute.path().is_ident(AUTOWIRED) {
            let attributes = AutowiredAttributes::try_from(attribute)?;
            let type_name = attributes
                .type_name
                .map(|type_name| quote!(#type_name))
                .unwrap_or_else(|| quote!(<#ty>::dependency_name()));

            return Ok(Some(quote! {
                sprig_di::component::FieldDescriptor {
                    name: #name.to_string(),
                    type_name: #type_name.to_string(),
                    injector: sprig_di::component::FieldInjector::Dependency {
                        inject: |target, value| {
                            #downcast.#member.inject(value).map_err(Into::into)
                        },
                        current: |target| Ok(#downcast.#member.instance()),
                    },
                }
            }));
        }

        if attribute.path().is_ident(VALUE) {
            let ValueAttributes { key } = ValueAttributes::try_from(attribute)?;
            return Ok(Some(quote! {
                sprig_di::component::FieldDescriptor {
                    name: #name.to_string(),
                    type_name: std::any::type_name::<#ty>().to_string(),
                    injector: sprig_di::component::FieldInjector::Property {
                        key: #key.to_string(),
                        assign: |target, raw| {
                            #downcast
                                .#member
                                .assign(raw)
                                .map_err(sprig_di::component::FieldAccessError::InvalidProperty)
                        },
                    },
                }
            }));
        }
    }

    Ok(None)
}

fn generate_fields(target: &Ident, fields: &Fields) -> Result<Vec<TokenStream>> {
    let fields: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(index, field)| generate_field(target, index, field))
        .try_collect()?;

    Ok(fields.into_iter().flatten().collect())
}

pub fn expand_component(input: &DeriveInput) -> Result<TokenStream> {
    let fields = if let Data::Struct(DataStruct { fields, .. }) = &input.data {
        fields
    } else {
        return Err(Error::new(
            input.span(),
            "Can only derive Component on structs!",
        ));
    };

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Components cannot be generic!",
        ));
    }

    let ident = &input.ident;
    let name = canonical_name(ident);
    let attributes = extract_component_attributes(&input.attrs)?;
    let stereotype = generate_stereotype(attributes.stereotype.as_ref())?;
    let fields = generate_fields(ident, fields)?;

    let alias = attributes
        .alias
        .map(|alias| quote!(Some(#alias.to_string())))
        .unwrap_or_else(|| quote!(None));

    let interfaces = attributes.interfaces.iter().map(|interface| {
        quote! {
            sprig_di::component::InterfaceDescriptor {
                name: <dyn #interface + Send + Sync as sprig_di::instance::Injectable>::canonical_name()
                    .to_string(),
                upcast: |instance| {
                    instance.downcast::<#ident>().ok().map(|instance| {
                        sprig_di::instance::interface_view(
                            instance as sprig_di::instance::ComponentInstancePtr<dyn #interface + Send + Sync>,
                        )
                    })
                },
            }
        }
    });

    let construction = attributes
        .constructor
        .map(|constructor| quote!(#constructor()?))
        .unwrap_or_else(|| quote!(<#ident as std::default::Default>::default()));

    Ok(quote! {
        #[automatically_derived]
        impl sprig_di::instance::Injectable for #ident {
            fn canonical_name() -> &'static str {
                #name
            }

            fn from_instance(
                instance: sprig_di::instance::ComponentInstanceAnyPtr,
            ) -> Option<sprig_di::instance::ComponentInstancePtr<Self>> {
                instance.downcast().ok()
            }
        }

        const _: () = {
            fn construct() -> Result<sprig_di::instance::ComponentInstanceAnyPtr, sprig_di::error::ErrorPtr> {
                let instance: #ident = #construction;
                Ok(sprig_di::instance::ComponentInstancePtr::new(instance) as sprig_di::instance::ComponentInstanceAnyPtr)
            }

            fn register() -> sprig_di::component::TypeDescriptor {
                sprig_di::component::TypeDescriptor {
                    name: <#ident as sprig_di::instance::Injectable>::canonical_name().to_string(),
                    alias: #alias,
                    kind: sprig_di::component::TypeKind::Component(sprig_di::component::ComponentMetadata {
                        stereotype: #stereotype,
                        interfaces: vec![#(#interfaces),*],
                        fields: vec![#(#fields),*],
                        constructor: Some(construct),
                    }),
                }
            }

            sprig_di::component_registry::internal::submit! {
                sprig_di::component_registry::internal::TypeRegisterer {
                    register
                }
            };
        };
    })
}
