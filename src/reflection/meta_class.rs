//! Path-aware type metadata.

use std::sync::Arc;

use crate::error::{BindError, BindResult};
use crate::reflection::{PropertyPath, ReflectorCache, TypeDescriptor};
use crate::value::{ObjectType, ValueType};

/// Answers type questions about property paths of one object type, without
/// needing an instance.
pub struct MetaClass<'c> {
    cache: &'c ReflectorCache,
    descriptor: Arc<TypeDescriptor>,
}

impl<'c> MetaClass<'c> {
    pub fn for_type(cache: &'c ReflectorCache, ty: &ObjectType) -> BindResult<Self> {
        Ok(Self {
            cache,
            descriptor: cache.describe(ty)?,
        })
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn has_default_constructor(&self) -> bool {
        self.descriptor.has_default_constructor()
    }

    /// Declared type read by `path`; an indexed list segment yields the element type.
    pub fn getter_type(&self, path: &str) -> BindResult<ValueType> {
        let prop = PropertyPath::parse(path);
        match prop.children() {
            Some(children) => self.meta_class_for(&prop)?.getter_type(children),
            None => self.segment_getter_type(&prop),
        }
    }

    /// Declared type written by `path`.
    pub fn setter_type(&self, path: &str) -> BindResult<ValueType> {
        let prop = PropertyPath::parse(path);
        match prop.children() {
            Some(children) => self.meta_class_for(&prop)?.setter_type(children),
            None => self.descriptor.setter_type(prop.name()).cloned(),
        }
    }

    pub fn has_getter(&self, path: &str) -> bool {
        let prop = PropertyPath::parse(path);
        if !self.descriptor.has_getter(prop.name()) {
            return false;
        }
        match prop.children() {
            Some(children) => self
                .meta_class_for(&prop)
                .is_ok_and(|meta| meta.has_getter(children)),
            None => true,
        }
    }

    pub fn has_setter(&self, path: &str) -> bool {
        let prop = PropertyPath::parse(path);
        match prop.children() {
            Some(children) => {
                self.descriptor.has_setter(prop.name())
                    && self
                        .meta_class_for(&prop)
                        .is_ok_and(|meta| meta.has_setter(children))
            }
            None => self.descriptor.has_setter(prop.name()),
        }
    }

    /// Resolve a case-insensitive path to the declared property names.
    ///
    /// With `camel_case`, underscores are ignored so `author_name` finds
    /// `authorName`.
    pub fn find_property(&self, name: &str, camel_case: bool) -> Option<String> {
        let name = if camel_case {
            name.replace('_', "")
        } else {
            name.to_string()
        };
        let mut resolved = String::new();
        self.build_property(&name, &mut resolved)?;
        (!resolved.is_empty()).then_some(resolved)
    }

    fn build_property(&self, name: &str, out: &mut String) -> Option<()> {
        let prop = PropertyPath::parse(name);
        let property = self.descriptor.find_property_name(prop.name())?;
        out.push_str(property);
        if let Some(children) = prop.children() {
            out.push('.');
            let ty = self.descriptor.getter_type(property).ok()?;
            let meta = MetaClass::for_type(self.cache, ty.as_object()?).ok()?;
            meta.build_property(children, out)?;
        }
        Some(())
    }

    fn segment_getter_type(&self, prop: &PropertyPath<'_>) -> BindResult<ValueType> {
        let ty = self.descriptor.getter_type(prop.name())?;
        if prop.index().is_some() {
            Ok(ty.element_type().clone())
        } else {
            Ok(ty.clone())
        }
    }

    fn meta_class_for(&self, prop: &PropertyPath<'_>) -> BindResult<MetaClass<'c>> {
        let ty = self.segment_getter_type(prop)?;
        match ty.as_object() {
            Some(object) => MetaClass::for_type(self.cache, object),
            None => Err(BindError::Reflection(format!(
                "Property '{}' of '{}' has type {}, which has no properties",
                prop.indexed_name(),
                self.descriptor.type_name(),
                ty
            ))),
        }
    }
}
