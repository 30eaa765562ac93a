//! A singleton dependency injection container based on automatic component discovery.
//!
//! Components, injectable traits and mappers are described by static [type
//! descriptors](component::TypeDescriptor), usually generated by the derive macros and discovered
//! at link time. [`Container::init`](container::Container::init) runs the whole bootstrap: it
//! registers the discovered types, synthesizes [mapper proxies](proxy::MapperProxy), wires every
//! component's autowired fields and finally resolves interface fields which could not be
//! satisfied on the first pass.
//!
//! ```
//! use sprig_di::container::Container;
//! use sprig_di::instance::Autowired;
//! use sprig_di::{Application, Component};
//!
//! #[derive(Application)]
//! struct App;
//!
//! #[derive(Component, Default)]
//! struct Repository;
//!
//! #[derive(Component, Default)]
//! struct Service {
//!     #[autowired]
//!     repository: Autowired<Repository>,
//! }
//!
//! fn main() {
//!     let container = Container::init::<App>().unwrap();
//!     let service = container.typed_bean::<Service>().unwrap();
//!     assert!(service.repository.get().is_some());
//! }
//! ```
//!
//! ### Features
//!
//! * `derive` - enable `#[derive(Component)]`, `#[derive(Application)]`, `#[injectable]` and
//! `#[mapper]` (default)

pub mod builder;
pub mod component;
pub mod component_registry;
pub mod container;
pub mod error;
pub mod instance;
pub mod mapping;
pub mod proxy;
pub mod resource;
pub mod scanner;
pub mod store;

#[cfg(feature = "derive")]
pub use sprig_di_derive::{injectable, mapper, Application, Component};
