//! Reflective property access.
//!
//! Types opt in by implementing [`Mappable`], which declares a [`TypeShape`]:
//! the constructor, accessor methods and fields the type exposes. The
//! [`ReflectorCache`] turns each shape into an immutable [`TypeDescriptor`]
//! once per type, and [`PropertyNavigator`] walks dotted and indexed paths
//! through values using those descriptors.
//!
//! ```ignore
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Author { id: i32, name: String }
//!
//! impl Mappable for Author {
//!     fn type_shape() -> TypeShape {
//!         TypeShape::builder::<Author>()
//!             .default_constructor()
//!             .field("id", ValueType::Int, |a| a.id, |a, v| a.id = v)
//!             .getter("getName", ValueType::String, |a| a.name.clone())
//!             .setter("setName", ValueType::String, |a, v| a.name = v)
//!             .build()
//!     }
//! }
//! ```

pub mod cache;
pub mod descriptor;
pub mod meta_class;
pub mod namer;
pub mod navigator;
pub mod path;
pub mod shape;

use std::any::Any;
use std::fmt;

pub use cache::ReflectorCache;
pub use descriptor::{GetInvoker, Invoker, SetInvoker, Strategy, TypeDescriptor};
pub use meta_class::MetaClass;
pub use navigator::PropertyNavigator;
pub use path::PropertyPath;
pub use shape::{Constructor, GetFn, SetFn, TypeShape, TypeShapeBuilder};

use crate::value::ObjectType;

/// A user type whose properties can be read and written by name.
pub trait Mappable: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Declare the constructor, accessors and fields of this type.
    fn type_shape() -> TypeShape;
}

/// Object-safe view of a [`Mappable`] instance.
pub trait Reflect: Any + Send + Sync + fmt::Debug {
    fn object_type(&self) -> ObjectType;
    fn clone_boxed(&self) -> Box<dyn Reflect>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn reflect_eq(&self, other: &dyn Reflect) -> bool;
}

impl<T: Mappable> Reflect for T {
    fn object_type(&self) -> ObjectType {
        ObjectType::of::<T>()
    }

    fn clone_boxed(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn reflect_eq(&self, other: &dyn Reflect) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

impl Clone for Box<dyn Reflect> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}
