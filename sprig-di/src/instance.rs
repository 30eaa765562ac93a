//! Component instances and the field wrappers used to inject them.
//!
//! All instances are shared by the container as type-erased [ComponentInstanceAnyPtr]s. A
//! concrete component is stored as-is, while an interface view of a component is stored as a
//! [ComponentInstancePtr] to the `dyn Trait`, wrapped in another pointer. [Injectable] knows how
//! to turn such erased pointers back into typed ones.
//!
//! Components are constructed bare and wired afterwards, possibly several times along different
//! injection paths, so injected fields use interior mutability: [Autowired] for dependencies and
//! [Value] for externally configured properties.

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub type ComponentInstancePtr<T> = Arc<T>;

pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + Send + Sync + 'static>;

/// Types which can be requested from the container: components, injectable traits and mappers.
/// Usually implemented by the derive macros.
pub trait Injectable: Send + Sync + 'static {
    /// Canonical name under which the type is registered.
    fn canonical_name() -> &'static str;

    /// Tries to convert a type-erased instance into a typed one.
    fn from_instance(instance: ComponentInstanceAnyPtr) -> Option<ComponentInstancePtr<Self>>;
}

/// Wraps an interface view of a component, so it can be stored as [ComponentInstanceAnyPtr] and
/// recovered by [Injectable::from_instance].
pub fn interface_view<T: ?Sized + Send + Sync + 'static>(
    instance: ComponentInstancePtr<T>,
) -> ComponentInstanceAnyPtr {
    ComponentInstancePtr::new(instance) as ComponentInstanceAnyPtr
}

/// Recovers an interface view created by [interface_view].
pub fn from_interface_view<T: ?Sized + Send + Sync + 'static>(
    instance: ComponentInstanceAnyPtr,
) -> Option<ComponentInstancePtr<T>> {
    instance
        .downcast::<ComponentInstancePtr<T>>()
        .ok()
        .map(|view| ComponentInstancePtr::clone(&*view))
}

/// Error returned when an erased instance cannot be assigned to a field.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
#[error("Instance is not compatible with {expected}")]
pub struct IncompatibleInstance {
    pub expected: &'static str,
}

/// Error returned when a raw property cannot be assigned to a [Value].
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum ValueError {
    #[error("Cannot parse '{raw}': {reason}")]
    Unparseable { raw: String, reason: String },
    #[error("Value is already assigned")]
    AlreadyAssigned,
}

/// Dependency slot of a component. Filled by the container; empty until wired or when the
/// dependency could not be resolved.
pub struct Autowired<T: ?Sized> {
    slot: RwLock<Option<(ComponentInstancePtr<T>, ComponentInstanceAnyPtr)>>,
}

impl<T: ?Sized> Default for Autowired<T> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<T: ?Sized> Debug for Autowired<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autowired")
            .field("injected", &self.slot.read().is_some())
            .finish()
    }
}

impl<T: Injectable + ?Sized> Autowired<T> {
    /// Canonical name of the dependency type.
    #[inline]
    pub fn dependency_name() -> &'static str {
        T::canonical_name()
    }

    /// Returns the injected dependency, if any.
    pub fn get(&self) -> Option<ComponentInstancePtr<T>> {
        self.slot.read().as_ref().map(|(typed, _)| typed.clone())
    }

    /// Assigns a new dependency or clears the slot on `None`.
    pub fn inject(
        &self,
        instance: Option<ComponentInstanceAnyPtr>,
    ) -> Result<(), IncompatibleInstance> {
        let value = match instance {
            Some(instance) => {
                let typed = T::from_instance(instance.clone()).ok_or(IncompatibleInstance {
                    expected: T::canonical_name(),
                })?;
                Some((typed, instance))
            }
            None => None,
        };

        *self.slot.write() = value;
        Ok(())
    }

    /// Returns the injected dependency in its type-erased form, as stored by the container.
    pub fn instance(&self) -> Option<ComponentInstanceAnyPtr> {
        self.slot.read().as_ref().map(|(_, erased)| erased.clone())
    }
}

/// Property slot of a component, assigned once from the application resources.
pub struct Value<T> {
    value: OnceCell<T>,
}

impl<T> Default for Value<T> {
    fn default() -> Self {
        Self {
            value: OnceCell::new(),
        }
    }
}

impl<T: Debug> Debug for Value<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Value").field(&self.value.get()).finish()
    }
}

impl<T> Value<T> {
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }
}

impl<T: FromStr> Value<T>
where
    T::Err: Display,
{
    /// Parses and stores the raw property. Assigning an already assigned value is an error.
    pub fn assign(&self, raw: &str) -> Result<(), ValueError> {
        let value = raw
            .trim()
            .parse::<T>()
            .map_err(|error| ValueError::Unparseable {
                raw: raw.to_string(),
                reason: error.to_string(),
            })?;

        self.value
            .set(value)
            .map_err(|_| ValueError::AlreadyAssigned)
    }
}

#[cfg(test)]
mod tests {
    use crate::instance::{
        from_interface_view, interface_view, Autowired, ComponentInstanceAnyPtr,
        ComponentInstancePtr, Injectable, Value, ValueError,
    };

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    impl Injectable for English {
        fn canonical_name() -> &'static str {
            "tests::English"
        }

        fn from_instance(instance: ComponentInstanceAnyPtr) -> Option<ComponentInstancePtr<Self>> {
            instance.downcast().ok()
        }
    }

    impl Injectable for dyn Greeter {
        fn canonical_name() -> &'static str {
            "tests::Greeter"
        }

        fn from_instance(instance: ComponentInstanceAnyPtr) -> Option<ComponentInstancePtr<Self>> {
            from_interface_view(instance)
        }
    }

    #[test]
    fn should_inject_concrete_instance() {
        let field = Autowired::<English>::default();
        let instance = ComponentInstancePtr::new(English) as ComponentInstanceAnyPtr;

        field.inject(Some(instance.clone())).unwrap();

        assert!(ComponentInstancePtr::ptr_eq(
            &field.instance().unwrap(),
            &instance
        ));
        assert_eq!(field.get().unwrap().greet(), "hello");
    }

    #[test]
    fn should_recover_interface_view() {
        let concrete = ComponentInstancePtr::new(English);
        let view = interface_view(concrete.clone() as ComponentInstancePtr<dyn Greeter>);

        let recovered: ComponentInstancePtr<dyn Greeter> = from_interface_view(view).unwrap();
        assert_eq!(recovered.greet(), "hello");
        assert_eq!(
            ComponentInstancePtr::as_ptr(&recovered) as *const (),
            ComponentInstancePtr::as_ptr(&concrete) as *const ()
        );
        assert!(from_interface_view::<dyn Greeter>(concrete as ComponentInstanceAnyPtr).is_none());
    }

    #[test]
    fn should_inject_interface_view() {
        let field = Autowired::<dyn Greeter>::default();
        let concrete = ComponentInstancePtr::new(English);
        let view = interface_view(concrete.clone() as ComponentInstancePtr<dyn Greeter>);

        field.inject(Some(view)).unwrap();

        let injected = field.get().unwrap();
        assert_eq!(
            ComponentInstancePtr::as_ptr(&injected) as *const (),
            ComponentInstancePtr::as_ptr(&concrete) as *const ()
        );
    }

    #[test]
    fn should_reject_incompatible_instance() {
        let field = Autowired::<English>::default();
        let error = field
            .inject(Some(ComponentInstancePtr::new(5u8) as ComponentInstanceAnyPtr))
            .unwrap_err();

        assert_eq!(error.expected, "tests::English");
        assert!(field.get().is_none());
    }

    #[test]
    fn should_clear_on_none() {
        let field = Autowired::<English>::default();
        field
            .inject(Some(ComponentInstancePtr::new(English) as ComponentInstanceAnyPtr))
            .unwrap();
        field.inject(None).unwrap();

        assert!(field.get().is_none());
    }

    #[test]
    fn should_parse_value_once() {
        let value = Value::<u16>::default();
        value.assign(" 8080 ").unwrap();

        assert_eq!(value.get(), Some(&8080));
        assert_eq!(value.assign("1"), Err(ValueError::AlreadyAssigned));
    }

    #[test]
    fn should_report_unparseable_value() {
        let value = Value::<u16>::default();
        assert!(matches!(
            value.assign("port"),
            Err(ValueError::Unparseable { raw, .. }) if raw == "port"
        ));
        assert!(value.get().is_none());
    }
}
