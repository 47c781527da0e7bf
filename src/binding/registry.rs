//! Registered mapper types.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::binding::{Mapper, MapperProxyFactory};
use crate::error::{BindError, BindResult};

/// Mapper factories keyed by mapper type.
#[derive(Debug, Default)]
pub struct MapperRegistry {
    known: HashMap<TypeId, Arc<MapperProxyFactory>>,
}

impl MapperRegistry {
    pub fn has_mapper<M: Mapper>(&self) -> bool {
        self.known.contains_key(&TypeId::of::<M>())
    }

    pub fn insert<M: Mapper>(&mut self, factory: Arc<MapperProxyFactory>) -> BindResult<()> {
        if self.has_mapper::<M>() {
            return Err(BindError::binding(format!(
                "Type {} is already known to the MapperRegistry.",
                std::any::type_name::<M>()
            )));
        }
        self.known.insert(TypeId::of::<M>(), factory);
        Ok(())
    }

    pub fn get<M: Mapper>(&self) -> BindResult<Arc<MapperProxyFactory>> {
        self.known.get(&TypeId::of::<M>()).cloned().ok_or_else(|| {
            BindError::binding(format!(
                "Type {} is not known to the MapperRegistry.",
                std::any::type_name::<M>()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
