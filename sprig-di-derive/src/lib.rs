use crate::application::expand_application;
use crate::attributes::InterfaceAttributes;
use crate::component::expand_component;
use crate::interface::{expand_injectable, expand_mapper};
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Error, ItemTrait};

mod application;
mod attributes;
mod component;
mod interface;
mod names;

#[proc_macro_derive(Component, attributes(component, autowired, value))]
pub fn generate_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_component(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

#[proc_macro_derive(Application, attributes(application))]
pub fn generate_application(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_application(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

#[proc_macro_attribute]
pub fn injectable(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut attributes = InterfaceAttributes::default();
    let parser = syn::meta::parser(|meta| attributes.parse(meta));
    parse_macro_input!(args with parser);

    let item = parse_macro_input!(input as ItemTrait);
    expand_injectable(&attributes, &item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

#[proc_macro_attribute]
pub fn mapper(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut attributes = InterfaceAttributes::default();
    let parser = syn::meta::parser(|meta| attributes.parse(meta));
    parse_macro_input!(args with parser);

    let item = parse_macro_input!(input as ItemTrait);
    expand_mapper(&attributes, item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
