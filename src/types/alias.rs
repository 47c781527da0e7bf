//! Case-insensitive names for value types.

use std::collections::HashMap;

use crate::error::{BindError, BindResult};
use crate::reflection::Mappable;
use crate::value::{ObjectType, ValueType};

/// Resolves type names used in `javaType=` options and mapper files.
#[derive(Debug, Clone)]
pub struct TypeAliasRegistry {
    aliases: HashMap<String, ValueType>,
}

impl Default for TypeAliasRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeAliasRegistry {
    pub fn new() -> Self {
        let builtins = [
            ("boolean", ValueType::Bool),
            ("bool", ValueType::Bool),
            ("int", ValueType::Int),
            ("integer", ValueType::Int),
            ("long", ValueType::Long),
            ("double", ValueType::Double),
            ("float", ValueType::Double),
            ("string", ValueType::String),
            ("bytes", ValueType::Bytes),
            ("byte[]", ValueType::Bytes),
            ("map", ValueType::Map),
            ("hashmap", ValueType::Map),
            ("list", ValueType::list(ValueType::Any)),
            ("object", ValueType::Any),
            ("parammap", ValueType::Params),
        ];
        Self {
            aliases: builtins
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        }
    }

    /// Register `alias` for `ty`. Re-registering an alias for a different type fails.
    pub fn register(&mut self, alias: &str, ty: ValueType) -> BindResult<()> {
        let key = alias.trim().to_lowercase();
        if let Some(existing) = self.aliases.get(&key)
            && *existing != ty
        {
            return Err(BindError::builder(format!(
                "The alias '{}' is already mapped to the value '{}'.",
                alias, existing
            )));
        }
        self.aliases.insert(key, ty);
        Ok(())
    }

    /// Register `T` under its short type name.
    pub fn register_type<T: Mappable>(&mut self) -> BindResult<()> {
        let ty = ObjectType::of::<T>();
        self.register(ty.name(), ValueType::Object(ty))
    }

    /// Resolve a name; `List<X>` resolves to a list of `X`.
    pub fn resolve(&self, name: &str) -> BindResult<ValueType> {
        let name = name.trim();
        if let Some(inner) = list_element(name) {
            return Ok(ValueType::list(self.resolve(inner)?));
        }
        self.aliases
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| BindError::builder(format!("Could not resolve type alias '{}'.", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }
}

fn list_element(name: &str) -> Option<&str> {
    let open = name.find('<')?;
    if !name[..open].trim().eq_ignore_ascii_case("list") {
        return None;
    }
    name[open + 1..].strip_suffix('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_aliases() {
        let aliases = TypeAliasRegistry::new();
        assert_eq!(aliases.resolve("INT").unwrap(), ValueType::Int);
        assert_eq!(
            aliases.resolve("List<String>").unwrap(),
            ValueType::list(ValueType::String)
        );
        assert!(aliases.resolve("Widget").is_err());
    }

    #[test]
    fn test_conflicting_alias() {
        let mut aliases = TypeAliasRegistry::new();
        aliases.register("id", ValueType::Long).unwrap();
        aliases.register("ID", ValueType::Long).unwrap();
        let err = aliases.register("id", ValueType::String).unwrap_err();
        assert!(err.to_string().contains("already mapped"));
    }
}
