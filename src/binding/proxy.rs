//! Dispatch of mapper calls to their statements.

use std::marker::PhantomData;
use std::sync::Arc;

use dashmap::DashMap;

use crate::binding::{Mapper, MapperDecl, MapperMethod};
use crate::error::{BindError, BindResult};
use crate::session::{Configuration, Session};
use crate::value::{FromValue, Value};

/// Holds a mapper declaration and the methods bound so far.
///
/// Methods are bound on first call. Concurrent first calls may each build a
/// [`MapperMethod`], but only the first one inserted is kept and returned.
#[derive(Debug)]
pub struct MapperProxyFactory {
    decl: MapperDecl,
    method_cache: DashMap<String, Arc<MapperMethod>>,
}

impl MapperProxyFactory {
    pub fn new(decl: MapperDecl) -> Self {
        Self {
            decl,
            method_cache: DashMap::new(),
        }
    }

    pub fn decl(&self) -> &MapperDecl {
        &self.decl
    }

    /// Number of methods bound so far.
    pub fn cached_methods(&self) -> usize {
        self.method_cache.len()
    }

    pub fn new_instance<'s, M: Mapper>(self: &Arc<Self>, session: &'s Session) -> MapperProxy<'s, M> {
        MapperProxy {
            session,
            factory: Arc::clone(self),
            _mapper: PhantomData,
        }
    }

    pub fn cached_method(&self, config: &Configuration, name: &str) -> BindResult<Arc<MapperMethod>> {
        if let Some(method) = self.method_cache.get(name) {
            return Ok(method.value().clone());
        }
        let decl = self.decl.get(name).ok_or_else(|| {
            BindError::binding(format!(
                "Method '{}' is not declared by mapper {}",
                name,
                self.decl.type_name()
            ))
        })?;
        let built = Arc::new(MapperMethod::new(config, &self.decl, decl)?);
        Ok(self
            .method_cache
            .entry(name.to_string())
            .or_insert(built)
            .value()
            .clone())
    }
}

/// A mapper bound to a session.
///
/// Typed call sites are written on top of [`MapperProxy::call`]:
///
/// ```ignore
/// let blog: Option<Blog> = mapper.call("findById", vec![Value::Int(1)])?;
/// ```
pub struct MapperProxy<'s, M> {
    session: &'s Session,
    factory: Arc<MapperProxyFactory>,
    _mapper: PhantomData<fn() -> M>,
}

impl<'s, M: Mapper> MapperProxy<'s, M> {
    pub fn session(&self) -> &'s Session {
        self.session
    }

    pub fn factory(&self) -> &Arc<MapperProxyFactory> {
        &self.factory
    }

    /// Execute `method` with positional `args`.
    pub fn invoke(&self, method: &str, args: Vec<Value>) -> BindResult<Value> {
        let bound = self
            .factory
            .cached_method(self.session.configuration(), method)?;
        bound.execute(self.session, args)
    }

    /// Execute `method` and convert the result.
    pub fn call<R: FromValue>(&self, method: &str, args: Vec<Value>) -> BindResult<R> {
        R::from_value(self.invoke(method, args)?)
    }
}

impl<M> Clone for MapperProxy<'_, M> {
    fn clone(&self) -> Self {
        Self {
            session: self.session,
            factory: Arc::clone(&self.factory),
            _mapper: PhantomData,
        }
    }
}
