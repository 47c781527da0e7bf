//! Reading and writing values along property paths.
//!
//! Objects are accessed through their descriptors, maps and parameter bags by
//! key, lists by numeric index. `Value::Null` is never navigated into.

use std::collections::BTreeMap;

use crate::binding::ParamMap;
use crate::error::{BindError, BindResult};
use crate::reflection::{PropertyPath, ReflectorCache, Reflect};
use crate::value::{Value, ValueType};

/// Gets and sets values by path, using a shared [`ReflectorCache`].
#[derive(Clone, Copy)]
pub struct PropertyNavigator<'c> {
    cache: &'c ReflectorCache,
}

impl<'c> PropertyNavigator<'c> {
    pub fn new(cache: &'c ReflectorCache) -> Self {
        Self { cache }
    }

    /// Value addressed by `path`; `Null` when an intermediate is `Null`.
    pub fn get(&self, root: &Value, path: &str) -> BindResult<Value> {
        let prop = PropertyPath::parse(path);
        let head = self.get_segment(root, &prop)?;
        match prop.children() {
            Some(children) if !head.is_null() => self.get(&head, children),
            _ => Ok(head),
        }
    }

    /// Write `value` at `path`.
    ///
    /// Missing intermediates are created from the declared setter type,
    /// unless `value` is `Null`, in which case nothing is written.
    pub fn set(&self, root: &mut Value, path: &str, value: Value) -> BindResult<()> {
        let prop = PropertyPath::parse(path);
        let Some(children) = prop.children() else {
            return self.set_segment(root, &prop, value);
        };

        let mut head = self.get_segment(root, &prop)?;
        if head.is_null() {
            if value.is_null() {
                return Ok(());
            }
            head = self.instantiate_segment(root, &prop)?;
        }
        self.set(&mut head, children, value)?;
        self.set_segment(root, &prop, head)
    }

    fn get_segment(&self, target: &Value, prop: &PropertyPath<'_>) -> BindResult<Value> {
        if target.is_null() {
            return Ok(Value::Null);
        }
        match prop.index() {
            Some(index) if prop.name().is_empty() => read_index(target, index),
            Some(index) => {
                let collection = self.read_property(target, prop.name())?;
                read_index(&collection, index)
            }
            None => self.read_property(target, prop.name()),
        }
    }

    fn set_segment(&self, target: &mut Value, prop: &PropertyPath<'_>, value: Value) -> BindResult<()> {
        match prop.index() {
            Some(index) if prop.name().is_empty() => write_index(target, index, value),
            Some(index) => {
                let mut collection = self.read_property(target, prop.name())?;
                write_index(&mut collection, index, value)?;
                self.write_property(target, prop.name(), collection)
            }
            None => self.write_property(target, prop.name(), value),
        }
    }

    fn read_property(&self, target: &Value, name: &str) -> BindResult<Value> {
        match target {
            Value::Null => Ok(Value::Null),
            Value::Object(obj) => self.read_object(&**obj, name),
            Value::Map(map) => Ok(map.get(name).cloned().unwrap_or_default()),
            Value::Params(params) => params.get(name).cloned(),
            other => Err(BindError::no_getter(name, other.type_label())),
        }
    }

    fn read_object(&self, obj: &dyn Reflect, name: &str) -> BindResult<Value> {
        let descriptor = self.cache.describe(&obj.object_type())?;
        descriptor.get_invoker(name)?.invoke(obj)
    }

    fn write_property(&self, target: &mut Value, name: &str, value: Value) -> BindResult<()> {
        match target {
            Value::Object(obj) => {
                let descriptor = self.cache.describe(&(**obj).object_type())?;
                descriptor.set_invoker(name)?.invoke(&mut **obj, value)
            }
            Value::Map(map) => {
                map.insert(name.to_string(), value);
                Ok(())
            }
            Value::Params(params) => {
                params.insert(name, value);
                Ok(())
            }
            other => Err(BindError::no_setter(name, other.type_label())),
        }
    }

    /// Fresh value for a missing intermediate segment.
    fn instantiate_segment(&self, parent: &Value, prop: &PropertyPath<'_>) -> BindResult<Value> {
        let ty = match parent {
            Value::Object(obj) => {
                let descriptor = self.cache.describe(&(**obj).object_type())?;
                let declared = descriptor.setter_type(prop.name())?;
                if prop.index().is_some() {
                    declared.element_type().clone()
                } else {
                    declared.clone()
                }
            }
            _ => ValueType::Map,
        };
        self.new_value(&ty, prop)
    }

    fn new_value(&self, ty: &ValueType, prop: &PropertyPath<'_>) -> BindResult<Value> {
        match ty {
            ValueType::Object(object) => {
                let instance = self.cache.describe(object)?.instantiate()?;
                Ok(Value::Object(instance))
            }
            ValueType::Map | ValueType::Any => Ok(Value::Map(BTreeMap::new())),
            ValueType::Params => Ok(Value::Params(ParamMap::new())),
            ValueType::List(_) => Ok(Value::List(Vec::new())),
            other => Err(BindError::Reflection(format!(
                "Cannot create an intermediate value of type {} for property '{}'",
                other,
                prop.indexed_name()
            ))),
        }
    }
}

fn list_index(index: &str, len: usize) -> BindResult<usize> {
    let i: usize = index
        .trim()
        .parse()
        .map_err(|_| BindError::Reflection(format!("'{}' is not a valid list index", index)))?;
    if i >= len {
        return Err(BindError::Reflection(format!(
            "Index {} out of bounds for length {}",
            i, len
        )));
    }
    Ok(i)
}

fn read_index(collection: &Value, index: &str) -> BindResult<Value> {
    match collection {
        Value::Null => Ok(Value::Null),
        Value::List(items) => Ok(items[list_index(index, items.len())?].clone()),
        Value::Map(map) => Ok(map.get(index).cloned().unwrap_or_default()),
        Value::Params(params) => params.get(index).cloned(),
        other => Err(BindError::Reflection(format!(
            "Cannot get the value '{}' because a {} is not a List or Map",
            index,
            other.type_label()
        ))),
    }
}

fn write_index(collection: &mut Value, index: &str, value: Value) -> BindResult<()> {
    match collection {
        Value::List(items) => {
            let i = list_index(index, items.len())?;
            items[i] = value;
            Ok(())
        }
        Value::Map(map) => {
            map.insert(index.to_string(), value);
            Ok(())
        }
        Value::Params(params) => {
            params.insert(index, value);
            Ok(())
        }
        other => Err(BindError::Reflection(format!(
            "Cannot set the value '{}' because a {} is not a List or Map",
            index,
            other.type_label()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::{Mappable, TypeShape};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Address {
        city: String,
    }

    impl Mappable for Address {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<Address>()
                .default_constructor()
                .field(
                    "city",
                    ValueType::String,
                    |a: &Address| a.city.clone(),
                    |a: &mut Address, v: String| a.city = v,
                )
                .build()
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Person {
        name: String,
        address: Option<Address>,
        tags: Vec<String>,
    }

    impl Mappable for Person {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<Person>()
                .default_constructor()
                .getter("getName", ValueType::String, |p: &Person| p.name.clone())
                .setter("setName", ValueType::String, |p: &mut Person, v: String| p.name = v)
                .field(
                    "address",
                    ValueType::object::<Address>(),
                    |p: &Person| p.address.clone(),
                    |p: &mut Person, v: Option<Address>| p.address = v,
                )
                .field(
                    "tags",
                    ValueType::list(ValueType::String),
                    |p: &Person| p.tags.clone(),
                    |p: &mut Person, v: Vec<String>| p.tags = v,
                )
                .build()
        }
    }

    #[test]
    fn test_nested_set_creates_intermediate() {
        let cache = ReflectorCache::new();
        let nav = PropertyNavigator::new(&cache);
        let mut root = Value::object(Person::default());

        nav.set(&mut root, "address.city", Value::from("Oslo")).unwrap();
        assert_eq!(nav.get(&root, "address.city").unwrap(), Value::from("Oslo"));

        let person = root.into_object::<Person>().unwrap();
        assert_eq!(person.address.unwrap().city, "Oslo");
    }

    #[test]
    fn test_null_write_is_dropped() {
        let cache = ReflectorCache::new();
        let nav = PropertyNavigator::new(&cache);
        let mut root = Value::object(Person::default());

        nav.set(&mut root, "address.city", Value::Null).unwrap();
        assert_eq!(nav.get(&root, "address").unwrap(), Value::Null);
        assert_eq!(nav.get(&root, "address.city").unwrap(), Value::Null);
    }

    #[test]
    fn test_indexed_list_access() {
        let cache = ReflectorCache::new();
        let nav = PropertyNavigator::new(&cache);
        let mut root = Value::object(Person {
            tags: vec!["a".into(), "b".into()],
            ..Person::default()
        });

        assert_eq!(nav.get(&root, "tags[1]").unwrap(), Value::from("b"));
        nav.set(&mut root, "tags[0]", Value::from("z")).unwrap();
        assert_eq!(nav.get(&root, "tags[0]").unwrap(), Value::from("z"));
        assert!(nav.get(&root, "tags[5]").is_err());
    }

    #[test]
    fn test_map_roots() {
        let cache = ReflectorCache::new();
        let nav = PropertyNavigator::new(&cache);
        let mut root = Value::Map(BTreeMap::new());

        nav.set(&mut root, "filter.name", Value::from("x")).unwrap();
        assert_eq!(nav.get(&root, "filter.name").unwrap(), Value::from("x"));
        assert_eq!(nav.get(&root, "missing").unwrap(), Value::Null);
    }

    #[test]
    fn test_unknown_property() {
        let cache = ReflectorCache::new();
        let nav = PropertyNavigator::new(&cache);
        let root = Value::object(Person::default());
        let err = nav.get(&root, "age").unwrap_err();
        assert_eq!(
            err.to_string(),
            "There is no getter for property named 'age' in 'Person'"
        );
    }
}
