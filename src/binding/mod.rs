//! Mapper declarations and dispatch of mapper calls.
//!
//! A [`Mapper`] declares its methods once. [`Configuration::add_mapper`]
//! registers one statement per method and a [`MapperProxyFactory`]; a
//! [`MapperProxy`] obtained from a session turns `(method, args)` calls into
//! statement executions.
//!
//! [`Configuration::add_mapper`]: crate::session::Configuration::add_mapper

pub mod decl;
pub mod method;
pub mod param;
pub mod proxy;
pub mod registry;

pub use decl::{Mapper, MapperDecl, MethodDecl, ParamDecl, SqlAnnotation};
pub use method::{MapperMethod, MethodSignature, SqlCommand};
pub use param::{GENERIC_NAME_PREFIX, ParamMap, ParamNameResolver};
pub use proxy::{MapperProxy, MapperProxyFactory};
pub use registry::MapperRegistry;
