//! The configuration: settings, registries and every registered statement.
//!
//! A `Configuration` is populated through `&mut` methods, then frozen in an
//! `Arc` and shared by all sessions.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::binding::{Mapper, MapperProxyFactory, MapperRegistry};
use crate::builder::{MapperAnnotationBuilder, MapperFileBuilder};
use crate::error::{BindError, BindResult};
use crate::mapping::{MappedStatement, ResultMap};
use crate::reflection::{PropertyNavigator, ReflectorCache};
use crate::session::settings::{ConfigFile, Settings};
use crate::types::{TypeAliasRegistry, TypeHandlerRegistry};

#[derive(Debug, Clone)]
enum Slot<V> {
    Value(V),
    /// Short name claimed by several fully qualified ids.
    Ambiguous,
}

/// Id-keyed collection that rejects duplicates.
///
/// Every id containing a `.` is also reachable by its short name (the part
/// after the last `.`), unless two namespaces register the same short name.
#[derive(Debug, Clone)]
pub struct StrictMap<V> {
    name: &'static str,
    entries: HashMap<String, Slot<V>>,
    ids: Vec<String>,
}

impl<V: Clone> StrictMap<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: HashMap::new(),
            ids: Vec::new(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, value: V) -> BindResult<()> {
        let id = id.into();
        if self.entries.contains_key(&id) {
            return Err(BindError::DuplicateId {
                collection: self.name,
                id,
            });
        }
        if let Some((_, short)) = id.rsplit_once('.') {
            match self.entries.get_mut(short) {
                None => {
                    self.entries.insert(short.to_string(), Slot::Value(value.clone()));
                }
                Some(slot) => *slot = Slot::Ambiguous,
            }
        }
        self.entries.insert(id.clone(), Slot::Value(value));
        self.ids.push(id);
        Ok(())
    }

    pub fn get(&self, id: &str) -> BindResult<&V> {
        match self.entries.get(id) {
            Some(Slot::Value(value)) => Ok(value),
            Some(Slot::Ambiguous) => Err(BindError::AmbiguousId {
                collection: self.name,
                id: id.to_string(),
            }),
            None => Err(BindError::UnknownId {
                collection: self.name,
                id: id.to_string(),
            }),
        }
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Registered values, in registration order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.ids.iter().filter_map(|id| match self.entries.get(id) {
            Some(Slot::Value(value)) => Some(value),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Settings, registries and statements shared by all sessions.
#[derive(Debug)]
pub struct Configuration {
    settings: Settings,
    reflector: ReflectorCache,
    type_handlers: TypeHandlerRegistry,
    type_aliases: TypeAliasRegistry,
    mapped_statements: StrictMap<Arc<MappedStatement>>,
    result_maps: StrictMap<Arc<ResultMap>>,
    loaded_resources: HashSet<String>,
    mappers: MapperRegistry,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Configuration {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            reflector: ReflectorCache::new(),
            type_handlers: TypeHandlerRegistry::new(),
            type_aliases: TypeAliasRegistry::new(),
            mapped_statements: StrictMap::new("Mapped Statements collection"),
            result_maps: StrictMap::new("Result Maps collection"),
            loaded_resources: HashSet::new(),
            mappers: MapperRegistry::default(),
        }
    }

    /// Build a configuration from a config file, loading its mapper files
    /// relative to `base_dir`.
    pub fn from_config_file(file: &ConfigFile, base_dir: impl AsRef<Path>) -> BindResult<Self> {
        let mut config = Self::new(file.settings.clone());
        for mapper in &file.mappers {
            let path = base_dir.as_ref().join(mapper);
            config.load_mapper_file(&path)?;
        }
        info!(
            "Configuration ready: {} statements, {} result maps",
            config.mapped_statements.len(),
            config.result_maps.len()
        );
        Ok(config)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn reflector(&self) -> &ReflectorCache {
        &self.reflector
    }

    pub fn navigator(&self) -> PropertyNavigator<'_> {
        PropertyNavigator::new(&self.reflector)
    }

    pub fn type_handlers(&self) -> &TypeHandlerRegistry {
        &self.type_handlers
    }

    pub fn type_handlers_mut(&mut self) -> &mut TypeHandlerRegistry {
        &mut self.type_handlers
    }

    pub fn type_aliases(&self) -> &TypeAliasRegistry {
        &self.type_aliases
    }

    pub fn type_aliases_mut(&mut self) -> &mut TypeAliasRegistry {
        &mut self.type_aliases
    }

    pub fn add_mapped_statement(&mut self, statement: Arc<MappedStatement>) -> BindResult<()> {
        let id = statement.id().to_string();
        self.mapped_statements.insert(id, statement)
    }

    pub fn mapped_statement(&self, id: &str) -> BindResult<Arc<MappedStatement>> {
        self.mapped_statements.get(id).cloned()
    }

    pub fn has_statement(&self, id: &str) -> bool {
        self.mapped_statements.contains_key(id)
    }

    pub fn mapped_statements(&self) -> impl Iterator<Item = &Arc<MappedStatement>> {
        self.mapped_statements.values()
    }

    pub fn add_result_map(&mut self, result_map: Arc<ResultMap>) -> BindResult<()> {
        let id = result_map.id().to_string();
        self.result_maps.insert(id.clone(), result_map)?;
        debug!("Registered result map {}", id);
        Ok(())
    }

    pub fn result_map(&self, id: &str) -> BindResult<Arc<ResultMap>> {
        self.result_maps.get(id).cloned()
    }

    pub fn has_result_map(&self, id: &str) -> bool {
        self.result_maps.contains_key(id)
    }

    pub fn is_resource_loaded(&self, resource: &str) -> bool {
        self.loaded_resources.contains(resource)
    }

    pub fn add_loaded_resource(&mut self, resource: impl Into<String>) {
        self.loaded_resources.insert(resource.into());
    }

    /// Register mapper `M` and every statement it declares.
    ///
    /// The mapper only becomes available once all its statements were built.
    pub fn add_mapper<M: Mapper>(&mut self) -> BindResult<()> {
        if self.mappers.has_mapper::<M>() {
            return Err(BindError::binding(format!(
                "Type {} is already known to the MapperRegistry.",
                std::any::type_name::<M>()
            )));
        }
        let decl = M::declare();
        MapperAnnotationBuilder::new(self, &decl).parse()?;
        self.mappers
            .insert::<M>(Arc::new(MapperProxyFactory::new(decl)))
    }

    pub fn has_mapper<M: Mapper>(&self) -> bool {
        self.mappers.has_mapper::<M>()
    }

    pub fn mapper_registry(&self) -> &MapperRegistry {
        &self.mappers
    }

    /// Load a TOML mapper file.
    pub fn load_mapper_file(&mut self, path: impl AsRef<Path>) -> BindResult<()> {
        MapperFileBuilder::from_path(self, path.as_ref())?.parse()
    }

    /// Load TOML mapper content under the given resource name.
    pub fn load_mapper_str(&mut self, content: &str, resource: &str) -> BindResult<()> {
        MapperFileBuilder::from_content(self, content, resource)?.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_map_short_names() {
        let mut map = StrictMap::new("Test collection");
        map.insert("a.find", 1).unwrap();
        assert_eq!(*map.get("a.find").unwrap(), 1);
        assert_eq!(*map.get("find").unwrap(), 1);

        map.insert("b.find", 2).unwrap();
        assert_eq!(*map.get("b.find").unwrap(), 2);
        assert!(matches!(map.get("find"), Err(BindError::AmbiguousId { .. })));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_strict_map_duplicates() {
        let mut map = StrictMap::new("Test collection");
        map.insert("a.find", 1).unwrap();
        let err = map.insert("a.find", 2).unwrap_err();
        assert_eq!(err.to_string(), "Test collection already contains value for a.find");
        assert_eq!(*map.get("a.find").unwrap(), 1);
        assert!(matches!(map.get("a.other"), Err(BindError::UnknownId { .. })));
    }
}
