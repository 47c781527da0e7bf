//! Resolved per-type property metadata.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{BindError, BindResult};
use crate::reflection::namer;
use crate::reflection::shape::{Constructor, GetFn, MethodShape, SetFn, TypeShape};
use crate::reflection::Reflect;
use crate::value::{ObjectType, Value, ValueType};

/// How a property is accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Direct field access.
    Field,
    /// Accessor method.
    Method,
}

/// One resolved accessor: the member it came from, its declared type and the
/// stored call.
#[derive(Clone)]
pub struct Invoker<F> {
    strategy: Strategy,
    member: String,
    ty: ValueType,
    call: F,
}

pub type GetInvoker = Invoker<GetFn>;
pub type SetInvoker = Invoker<SetFn>;

impl<F> Invoker<F> {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Field or method name this invoker was built from.
    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn value_type(&self) -> &ValueType {
        &self.ty
    }
}

impl Invoker<GetFn> {
    pub fn invoke(&self, target: &dyn Reflect) -> BindResult<Value> {
        (self.call)(target)
    }
}

impl Invoker<SetFn> {
    pub fn invoke(&self, target: &mut dyn Reflect, value: Value) -> BindResult<()> {
        (self.call)(target, value)
    }
}

impl<F> std::fmt::Debug for Invoker<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("strategy", &self.strategy)
            .field("member", &self.member)
            .field("type", &self.ty)
            .finish()
    }
}

/// Readable and writable properties of one type.
///
/// Built once from the type's [`TypeShape`] and never mutated afterwards.
pub struct TypeDescriptor {
    ty: ObjectType,
    constructor: Option<Constructor>,
    getters: IndexMap<String, GetInvoker>,
    setters: IndexMap<String, SetInvoker>,
    case_insensitive: HashMap<String, String>,
}

impl TypeDescriptor {
    /// Resolve the shape of `ty` into a descriptor.
    pub fn build(ty: &ObjectType) -> BindResult<Self> {
        Self::from_shape(ty.shape())
    }

    pub fn from_shape(shape: TypeShape) -> BindResult<Self> {
        let ty = shape.object_type();
        let mut getters = resolve_getters(&ty, &shape)?;
        let mut setters = resolve_setters(&ty, &shape, &getters)?;

        for field in shape.fields() {
            if !is_valid_property_name(&field.name) {
                continue;
            }
            if let Some(set) = &field.set
                && !setters.contains_key(&field.name)
            {
                setters.insert(
                    field.name.clone(),
                    Invoker {
                        strategy: Strategy::Field,
                        member: field.name.clone(),
                        ty: field.ty.clone(),
                        call: set.clone(),
                    },
                );
            }
            if !getters.contains_key(&field.name) {
                getters.insert(
                    field.name.clone(),
                    Invoker {
                        strategy: Strategy::Field,
                        member: field.name.clone(),
                        ty: field.ty.clone(),
                        call: field.get.clone(),
                    },
                );
            }
        }

        let mut case_insensitive = HashMap::new();
        for name in getters.keys().chain(setters.keys()) {
            let upper = name.to_uppercase();
            let stripped = upper.replace('_', "");
            if stripped != upper {
                case_insensitive.entry(stripped).or_insert_with(|| name.clone());
            }
            case_insensitive.insert(upper, name.clone());
        }

        Ok(Self {
            ty,
            constructor: shape.constructor().cloned(),
            getters,
            setters,
            case_insensitive,
        })
    }

    pub fn object_type(&self) -> ObjectType {
        self.ty
    }

    pub fn type_name(&self) -> &'static str {
        self.ty.name()
    }

    pub fn has_default_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// Create a new instance through the default constructor.
    pub fn instantiate(&self) -> BindResult<Box<dyn Reflect>> {
        self.constructor
            .as_ref()
            .map(|ctor| ctor())
            .ok_or_else(|| BindError::NoDefaultConstructor(self.type_name().to_string()))
    }

    pub fn get_invoker(&self, property: &str) -> BindResult<&GetInvoker> {
        self.getters
            .get(property)
            .ok_or_else(|| BindError::no_getter(property, self.type_name()))
    }

    pub fn set_invoker(&self, property: &str) -> BindResult<&SetInvoker> {
        self.setters
            .get(property)
            .ok_or_else(|| BindError::no_setter(property, self.type_name()))
    }

    pub fn getter_type(&self, property: &str) -> BindResult<&ValueType> {
        self.get_invoker(property).map(Invoker::value_type)
    }

    pub fn setter_type(&self, property: &str) -> BindResult<&ValueType> {
        self.set_invoker(property).map(Invoker::value_type)
    }

    pub fn has_getter(&self, property: &str) -> bool {
        self.getters.contains_key(property)
    }

    pub fn has_setter(&self, property: &str) -> bool {
        self.setters.contains_key(property)
    }

    /// Readable property names, in declaration order.
    pub fn readable_names(&self) -> impl Iterator<Item = &str> {
        self.getters.keys().map(String::as_str)
    }

    /// Writable property names, in declaration order.
    pub fn writable_names(&self) -> impl Iterator<Item = &str> {
        self.setters.keys().map(String::as_str)
    }

    /// Case-insensitive property lookup.
    pub fn find_property_name(&self, name: &str) -> Option<&str> {
        self.case_insensitive
            .get(&name.to_uppercase())
            .map(String::as_str)
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.ty)
            .field("getters", &self.getters)
            .field("setters", &self.setters)
            .finish()
    }
}

fn is_valid_property_name(name: &str) -> bool {
    !(name.starts_with('$') || name == "class")
}

/// Group accessor methods by the property they address.
fn group_by_property<'a, F>(
    methods: &'a [MethodShape<F>],
) -> BindResult<IndexMap<String, Vec<&'a MethodShape<F>>>> {
    let mut grouped: IndexMap<String, Vec<&MethodShape<F>>> = IndexMap::new();
    for method in methods {
        let property = namer::method_to_property(&method.name)?;
        if is_valid_property_name(&property) {
            grouped.entry(property).or_default().push(method);
        }
    }
    Ok(grouped)
}

fn resolve_getters(
    ty: &ObjectType,
    shape: &TypeShape,
) -> BindResult<IndexMap<String, GetInvoker>> {
    let mut resolved = IndexMap::new();
    for (property, candidates) in group_by_property(shape.getters())? {
        let mut winner: Option<&MethodShape<GetFn>> = None;
        for candidate in candidates {
            let Some(current) = winner else {
                winner = Some(candidate);
                continue;
            };
            if current.ty == candidate.ty {
                if candidate.ty != ValueType::Bool {
                    return Err(ambiguous(
                        "getter",
                        &property,
                        ty,
                        format!(
                            "'{}' and '{}' both return {}",
                            current.name, candidate.name, candidate.ty
                        ),
                    ));
                }
                if candidate.name.starts_with("is") {
                    winner = Some(candidate);
                }
            } else if current.ty.is_assignable_from(&candidate.ty) {
                winner = Some(candidate);
            } else if !candidate.ty.is_assignable_from(&current.ty) {
                return Err(ambiguous(
                    "getter",
                    &property,
                    ty,
                    format!(
                        "return types {} of '{}' and {} of '{}' are unrelated",
                        current.ty, current.name, candidate.ty, candidate.name
                    ),
                ));
            }
        }
        if let Some(method) = winner {
            resolved.insert(property, method_invoker(method));
        }
    }
    Ok(resolved)
}

fn resolve_setters(
    ty: &ObjectType,
    shape: &TypeShape,
    getters: &IndexMap<String, GetInvoker>,
) -> BindResult<IndexMap<String, SetInvoker>> {
    let mut resolved = IndexMap::new();
    for (property, candidates) in group_by_property(shape.setters())? {
        let getter_type = getters.get(&property).map(Invoker::value_type);
        let exact = getter_type.and_then(|expected| candidates.iter().find(|c| &c.ty == expected));

        let chosen = match exact {
            Some(method) => *method,
            None => {
                let mut best = candidates[0];
                for &candidate in &candidates[1..] {
                    if best.ty.is_assignable_from(&candidate.ty) {
                        best = candidate;
                    } else if !candidate.ty.is_assignable_from(&best.ty) {
                        return Err(ambiguous(
                            "setter",
                            &property,
                            ty,
                            format!(
                                "parameter types {} of '{}' and {} of '{}' are unrelated",
                                best.ty, best.name, candidate.ty, candidate.name
                            ),
                        ));
                    }
                }
                best
            }
        };
        resolved.insert(property, method_invoker(chosen));
    }
    Ok(resolved)
}

fn method_invoker<F: Clone>(method: &MethodShape<F>) -> Invoker<F> {
    Invoker {
        strategy: Strategy::Method,
        member: method.name.clone(),
        ty: method.ty.clone(),
        call: method.call.clone(),
    }
}

fn ambiguous(access: &'static str, property: &str, ty: &ObjectType, detail: String) -> BindError {
    BindError::AmbiguousAccessor {
        access,
        property: property.to_string(),
        type_name: ty.name().to_string(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::Mappable;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Switch {
        on: bool,
        label: String,
        serial: i64,
    }

    impl Mappable for Switch {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<Switch>()
                .default_constructor()
                .getter("getOn", ValueType::Bool, |s: &Switch| s.on)
                .getter("isOn", ValueType::Bool, |s: &Switch| s.on)
                .setter("setOn", ValueType::Bool, |s: &mut Switch, v: bool| s.on = v)
                .field(
                    "label",
                    ValueType::String,
                    |s: &Switch| s.label.clone(),
                    |s: &mut Switch, v: String| s.label = v,
                )
                .readonly_field("serial", ValueType::Long, |s: &Switch| s.serial)
                .readonly_field("$version", ValueType::Int, |_: &Switch| 1)
                .build()
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Clash {
        id: i32,
    }

    impl Mappable for Clash {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<Clash>()
                .getter("getId", ValueType::Int, |c: &Clash| c.id)
                .getter("get_id", ValueType::Int, |c: &Clash| c.id)
                .build()
        }
    }

    #[test]
    fn test_boolean_getter_prefers_is() {
        let desc = TypeDescriptor::build(&ObjectType::of::<Switch>()).unwrap();
        assert_eq!(desc.get_invoker("on").unwrap().member(), "isOn");
        assert_eq!(desc.get_invoker("on").unwrap().strategy(), Strategy::Method);
    }

    #[test]
    fn test_fields_fill_missing_accessors() {
        let desc = TypeDescriptor::build(&ObjectType::of::<Switch>()).unwrap();
        assert_eq!(desc.get_invoker("label").unwrap().strategy(), Strategy::Field);
        assert!(desc.has_setter("label"));
        assert!(desc.has_getter("serial"));
        assert!(!desc.has_setter("serial"));
        assert!(!desc.has_getter("$version"));
    }

    #[test]
    fn test_same_type_getters_are_ambiguous() {
        let err = TypeDescriptor::build(&ObjectType::of::<Clash>()).unwrap_err();
        assert!(matches!(err, BindError::AmbiguousAccessor { access: "getter", .. }));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let desc = TypeDescriptor::build(&ObjectType::of::<Switch>()).unwrap();
        assert_eq!(desc.find_property_name("LABEL"), Some("label"));
        assert_eq!(desc.find_property_name("nope"), None);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Handle {
        fd: i32,
    }

    impl Mappable for Handle {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<Handle>()
                .readonly_field("fd", ValueType::Int, |h: &Handle| h.fd)
                .build()
        }
    }

    #[test]
    fn test_missing_constructor() {
        let desc = TypeDescriptor::build(&ObjectType::of::<Handle>()).unwrap();
        assert!(!desc.has_default_constructor());
        let err = desc.instantiate().unwrap_err();
        assert_eq!(err.to_string(), "There is no default constructor for 'Handle'");

        let desc = TypeDescriptor::build(&ObjectType::of::<Switch>()).unwrap();
        assert!(desc.instantiate().is_ok());
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Base {
        name: String,
    }

    impl Mappable for Base {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<Base>()
                .default_constructor()
                .field(
                    "name",
                    ValueType::String,
                    |b: &Base| b.name.clone(),
                    |b: &mut Base, v: String| b.name = v,
                )
                .build()
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Derived {
        name: String,
    }

    impl Mappable for Derived {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<Derived>()
                .default_constructor()
                .extends::<Base>()
                .field(
                    "name",
                    ValueType::String,
                    |d: &Derived| d.name.clone(),
                    |d: &mut Derived, v: String| d.name = v,
                )
                .build()
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Kennel {
        pet: String,
        owner: String,
    }

    impl Mappable for Kennel {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<Kennel>()
                .default_constructor()
                .getter("getPet", ValueType::object::<Base>(), |k: &Kennel| Base {
                    name: k.pet.clone(),
                })
                .getter("get_pet", ValueType::object::<Derived>(), |k: &Kennel| Derived {
                    name: k.pet.clone(),
                })
                .setter("setPet", ValueType::object::<Base>(), |k: &mut Kennel, v: Base| {
                    k.pet = v.name
                })
                .setter("set_pet", ValueType::object::<Derived>(), |k: &mut Kennel, v: Derived| {
                    k.pet = v.name
                })
                .setter("setOwner", ValueType::Any, |k: &mut Kennel, v: Value| {
                    k.owner = v.to_string()
                })
                .setter("set_owner", ValueType::String, |k: &mut Kennel, v: String| k.owner = v)
                .build()
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Mixed {
        code: i32,
    }

    impl Mappable for Mixed {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<Mixed>()
                .getter("getCode", ValueType::Int, |m: &Mixed| m.code)
                .getter("get_code", ValueType::String, |m: &Mixed| m.code.to_string())
                .build()
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct MixedSetters {
        code: i32,
    }

    impl Mappable for MixedSetters {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<MixedSetters>()
                .setter("setCode", ValueType::Int, |m: &mut MixedSetters, v: i32| m.code = v)
                .setter("set_code", ValueType::String, |m: &mut MixedSetters, v: String| {
                    m.code = v.len() as i32
                })
                .build()
        }
    }

    #[test]
    fn test_subtype_getter_wins() {
        let desc = TypeDescriptor::build(&ObjectType::of::<Kennel>()).unwrap();
        let getter = desc.get_invoker("pet").unwrap();
        assert_eq!(getter.member(), "get_pet");
        assert_eq!(getter.value_type(), &ValueType::object::<Derived>());
    }

    #[test]
    fn test_setter_matching_getter_type_wins() {
        let desc = TypeDescriptor::build(&ObjectType::of::<Kennel>()).unwrap();
        assert_eq!(desc.set_invoker("pet").unwrap().member(), "set_pet");
    }

    #[test]
    fn test_most_specific_setter_wins() {
        let desc = TypeDescriptor::build(&ObjectType::of::<Kennel>()).unwrap();
        assert_eq!(desc.set_invoker("owner").unwrap().member(), "set_owner");
        assert_eq!(desc.setter_type("owner").unwrap(), &ValueType::String);
    }

    #[test]
    fn test_unrelated_getter_types_are_fatal() {
        let err = TypeDescriptor::build(&ObjectType::of::<Mixed>()).unwrap_err();
        assert!(matches!(err, BindError::AmbiguousAccessor { access: "getter", .. }));
        assert!(err.to_string().contains("unrelated"));
    }

    #[test]
    fn test_unrelated_setter_types_are_fatal() {
        let err = TypeDescriptor::build(&ObjectType::of::<MixedSetters>()).unwrap_err();
        assert!(matches!(err, BindError::AmbiguousAccessor { access: "setter", .. }));
        assert!(err.to_string().contains("unrelated"));
    }
}
