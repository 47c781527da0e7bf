//! Declared shape of a mappable type.
//!
//! A shape lists what a type exposes, without resolving conflicts: several
//! getters may map to one property, and fields may duplicate accessors.
//! [`TypeDescriptor`](super::TypeDescriptor) applies the resolution rules.

use std::sync::Arc;

use crate::error::{BindError, BindResult};
use crate::reflection::{Mappable, Reflect};
use crate::value::{FromValue, ObjectType, Value, ValueType};

/// Type-erased property read.
pub type GetFn = Arc<dyn Fn(&dyn Reflect) -> BindResult<Value> + Send + Sync>;

/// Type-erased property write.
pub type SetFn = Arc<dyn Fn(&mut dyn Reflect, Value) -> BindResult<()> + Send + Sync>;

/// Type-erased zero-argument constructor.
pub type Constructor = Arc<dyn Fn() -> Box<dyn Reflect> + Send + Sync>;

/// A plain field.
#[derive(Clone)]
pub struct FieldShape {
    pub name: String,
    pub ty: ValueType,
    pub get: GetFn,
    /// `None` for read-only fields.
    pub set: Option<SetFn>,
}

/// An accessor method, named the way it is declared (`getName`, `is_active`).
#[derive(Clone)]
pub struct MethodShape<F> {
    pub name: String,
    pub ty: ValueType,
    pub call: F,
}

pub type GetterShape = MethodShape<GetFn>;
pub type SetterShape = MethodShape<SetFn>;

/// Everything a type declares about itself.
#[derive(Clone)]
pub struct TypeShape {
    ty: ObjectType,
    constructor: Option<Constructor>,
    supertypes: Vec<ObjectType>,
    fields: Vec<FieldShape>,
    getters: Vec<GetterShape>,
    setters: Vec<SetterShape>,
}

impl TypeShape {
    pub fn builder<T: Mappable>() -> TypeShapeBuilder<T> {
        TypeShapeBuilder {
            shape: TypeShape {
                ty: ObjectType::of::<T>(),
                constructor: None,
                supertypes: Vec::new(),
                fields: Vec::new(),
                getters: Vec::new(),
                setters: Vec::new(),
            },
            _marker: std::marker::PhantomData,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.ty
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    pub fn supertypes(&self) -> &[ObjectType] {
        &self.supertypes
    }

    pub fn fields(&self) -> &[FieldShape] {
        &self.fields
    }

    pub fn getters(&self) -> &[GetterShape] {
        &self.getters
    }

    pub fn setters(&self) -> &[SetterShape] {
        &self.setters
    }
}

impl std::fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeShape")
            .field("type", &self.ty)
            .field("constructor", &self.constructor.is_some())
            .field("supertypes", &self.supertypes)
            .field(
                "fields",
                &self.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            )
            .field(
                "getters",
                &self.getters.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
            )
            .field(
                "setters",
                &self.setters.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for [`TypeShape`], typed by the described type so accessors can
/// be written as plain closures.
pub struct TypeShapeBuilder<T> {
    shape: TypeShape,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Mappable> TypeShapeBuilder<T> {
    /// Zero-argument constructor.
    pub fn constructor(mut self, ctor: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.shape.constructor = Some(Arc::new(move || Box::new(ctor()) as Box<dyn Reflect>));
        self
    }

    /// Use `T::default()` as the constructor.
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(T::default)
    }

    /// Declare `P` as a supertype, making `T` assignable where `P` is declared.
    pub fn extends<P: Mappable>(mut self) -> Self {
        self.shape.supertypes.push(ObjectType::of::<P>());
        self
    }

    /// A readable and writable field.
    pub fn field<V>(
        mut self,
        name: &str,
        ty: ValueType,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self
    where
        V: Into<Value> + FromValue + 'static,
    {
        self.shape.fields.push(FieldShape {
            name: name.to_string(),
            ty,
            get: erase_get(get),
            set: Some(erase_set(set)),
        });
        self
    }

    /// A field that can be read but never written.
    pub fn readonly_field<V>(
        mut self,
        name: &str,
        ty: ValueType,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
    ) -> Self
    where
        V: Into<Value> + 'static,
    {
        self.shape.fields.push(FieldShape {
            name: name.to_string(),
            ty,
            get: erase_get(get),
            set: None,
        });
        self
    }

    /// A getter method (`getName`, `isActive`, `get_name`).
    pub fn getter<V>(
        mut self,
        method: &str,
        ty: ValueType,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
    ) -> Self
    where
        V: Into<Value> + 'static,
    {
        self.shape.getters.push(MethodShape {
            name: method.to_string(),
            ty,
            call: erase_get(get),
        });
        self
    }

    /// A one-argument setter method (`setName`, `set_name`).
    pub fn setter<V>(
        mut self,
        method: &str,
        ty: ValueType,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self
    where
        V: FromValue + 'static,
    {
        self.shape.setters.push(MethodShape {
            name: method.to_string(),
            ty,
            call: erase_set(set),
        });
        self
    }

    pub fn build(self) -> TypeShape {
        self.shape
    }
}

fn erase_get<T, V>(get: impl Fn(&T) -> V + Send + Sync + 'static) -> GetFn
where
    T: Mappable,
    V: Into<Value> + 'static,
{
    Arc::new(move |target: &dyn Reflect| {
        let target = downcast_ref::<T>(target)?;
        Ok(get(target).into())
    })
}

fn erase_set<T, V>(set: impl Fn(&mut T, V) + Send + Sync + 'static) -> SetFn
where
    T: Mappable,
    V: FromValue + 'static,
{
    Arc::new(move |target: &mut dyn Reflect, value: Value| {
        let value = V::from_value(value)?;
        let target = downcast_mut::<T>(target)?;
        set(target, value);
        Ok(())
    })
}

fn downcast_ref<T: Mappable>(target: &dyn Reflect) -> BindResult<&T> {
    let found = target.object_type();
    target
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| wrong_target::<T>(found))
}

fn downcast_mut<T: Mappable>(target: &mut dyn Reflect) -> BindResult<&mut T> {
    let found = target.object_type();
    target
        .as_any_mut()
        .downcast_mut::<T>()
        .ok_or_else(|| wrong_target::<T>(found))
}

fn wrong_target<T: Mappable>(found: ObjectType) -> BindError {
    BindError::Reflection(format!(
        "accessor of '{}' invoked on an instance of '{}'",
        ObjectType::of::<T>().name(),
        found.name()
    ))
}
