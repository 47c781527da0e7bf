//! Process-wide descriptor cache.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::error::BindResult;
use crate::reflection::{Mappable, TypeDescriptor};
use crate::value::ObjectType;

/// Memoizes one [`TypeDescriptor`] per type.
///
/// Descriptors are built outside the map lock; when two threads race on the
/// same type, the first inserted descriptor is kept and returned to both.
#[derive(Debug, Default)]
pub struct ReflectorCache {
    descriptors: DashMap<TypeId, Arc<TypeDescriptor>>,
}

impl ReflectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for `ty`, built on first use.
    pub fn describe(&self, ty: &ObjectType) -> BindResult<Arc<TypeDescriptor>> {
        if let Some(found) = self.descriptors.get(&ty.id()) {
            return Ok(found.value().clone());
        }

        let built = Arc::new(TypeDescriptor::build(ty)?);
        debug!(
            "Described {}: {} readable, {} writable properties",
            ty.name(),
            built.readable_names().count(),
            built.writable_names().count()
        );
        let entry = self.descriptors.entry(ty.id()).or_insert(built);
        Ok(entry.value().clone())
    }

    pub fn describe_type<T: Mappable>(&self) -> BindResult<Arc<TypeDescriptor>> {
        self.describe(&ObjectType::of::<T>())
    }

    /// Number of cached descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::TypeShape;
    use crate::value::ValueType;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Point {
        x: i32,
    }

    impl Mappable for Point {
        fn type_shape() -> TypeShape {
            TypeShape::builder::<Point>()
                .default_constructor()
                .field("x", ValueType::Int, |p: &Point| p.x, |p: &mut Point, v: i32| p.x = v)
                .build()
        }
    }

    #[test]
    fn test_describe_is_memoized() {
        let cache = ReflectorCache::new();
        let first = cache.describe_type::<Point>().unwrap();
        let second = cache.describe_type::<Point>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_describe_converges() {
        let cache = ReflectorCache::new();
        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.describe_type::<Point>().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let first = cache.describe_type::<Point>().unwrap();
        assert!(results.iter().all(|d| Arc::ptr_eq(d, &first)));
    }
}
